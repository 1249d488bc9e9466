//! # Events
//!
//! Every successful mutation publishes exactly one event. The topic tuple is
//! `(symbol, actor)` and the data is one of the payload structs below. The
//! off-chain indexer keys on the leading symbol.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::types::CampaignStatus;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignInitialized {
    pub owner: Address,
    pub goal: u128,
    pub minimum_contribution: u128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GoalUpdated {
    pub owner: Address,
    pub goal: u128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MinimumUpdated {
    pub owner: Address,
    pub minimum_contribution: u128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusChanged {
    pub owner: Address,
    pub status: CampaignStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContributionReceived {
    pub contributor: Address,
    pub amount: u128,
    /// Contributor balance after the contribution.
    pub balance: u128,
    pub total_contributed: u128,
}

/// Shared payload for refund, reset and withdrawal.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContributionReleased {
    pub contributor: Address,
    pub amount: u128,
    pub total_contributed: u128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExcessWithdrawn {
    pub owner: Address,
    pub amount: u128,
    pub total_contributed: u128,
}

/// How a contributor's balance was released.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReleaseKind {
    Refund,
    Reset,
    Withdrawal,
}

impl ReleaseKind {
    fn topic(self) -> Symbol {
        match self {
            ReleaseKind::Refund => symbol_short!("refunded"),
            ReleaseKind::Reset => symbol_short!("reset"),
            ReleaseKind::Withdrawal => symbol_short!("withdrawn"),
        }
    }
}

pub fn emit_initialized(env: &Env, event: CampaignInitialized) {
    env.events()
        .publish((symbol_short!("init"), event.owner.clone()), event);
}

pub fn emit_goal_updated(env: &Env, event: GoalUpdated) {
    env.events()
        .publish((symbol_short!("goal_set"), event.owner.clone()), event);
}

pub fn emit_minimum_updated(env: &Env, event: MinimumUpdated) {
    env.events()
        .publish((symbol_short!("min_set"), event.owner.clone()), event);
}

pub fn emit_status_changed(env: &Env, event: StatusChanged) {
    let topic = match event.status {
        CampaignStatus::Open => symbol_short!("opened"),
        CampaignStatus::Closed => symbol_short!("closed"),
    };
    env.events().publish((topic, event.owner.clone()), event);
}

pub fn emit_contribution_received(env: &Env, event: ContributionReceived) {
    env.events()
        .publish((symbol_short!("contrib"), event.contributor.clone()), event);
}

pub fn emit_contribution_released(env: &Env, kind: ReleaseKind, event: ContributionReleased) {
    env.events()
        .publish((kind.topic(), event.contributor.clone()), event);
}

pub fn emit_excess_withdrawn(env: &Env, event: ExcessWithdrawn) {
    env.events()
        .publish((symbol_short!("excess"), event.owner.clone()), event);
}
