//! # Storage
//!
//! Typed helpers over the two Soroban storage tiers used by the ledger.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key      | Type             | Description                          |
//! |----------|------------------|--------------------------------------|
//! | `Config` | `CampaignConfig` | Owner, fixed at `init`               |
//! | `State`  | `CampaignState`  | Goal, total, status, minimum         |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                  | Type   | Description                     |
//! |----------------------|--------|---------------------------------|
//! | `Contribution(addr)` | `u128` | Current balance of `addr`       |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.
//!
//! Balances are zeroed rather than removed, so a contributor who walked back
//! a pledge still has an entry reading `0`.

use soroban_sdk::{contracttype, Address, Env};

use crate::types::{Campaign, CampaignConfig, CampaignState};

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Immutable campaign configuration (Instance).
    Config,
    /// Mutable campaign state (Instance).
    State,
    /// Balance of one contributor (Persistent).
    Contribution(Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

/// Write config and initial state for a new campaign.
pub fn save_campaign(env: &Env, config: &CampaignConfig, state: &CampaignState) {
    env.storage().instance().set(&DataKey::Config, config);
    env.storage().instance().set(&DataKey::State, state);
    bump_instance(env);
}

pub fn load_config(env: &Env) -> Option<CampaignConfig> {
    let config = env.storage().instance().get(&DataKey::Config);
    if config.is_some() {
        bump_instance(env);
    }
    config
}

pub fn load_state(env: &Env) -> Option<CampaignState> {
    let state = env.storage().instance().get(&DataKey::State);
    if state.is_some() {
        bump_instance(env);
    }
    state
}

/// State for read-only queries; an uninitialised contract reads as empty.
pub fn state_or_empty(env: &Env) -> CampaignState {
    load_state(env).unwrap_or_else(CampaignState::empty)
}

pub fn save_state(env: &Env, state: &CampaignState) {
    env.storage().instance().set(&DataKey::State, state);
    bump_instance(env);
}

pub fn load_campaign(env: &Env) -> Option<Campaign> {
    let config = load_config(env)?;
    let state = load_state(env)?;
    Some(Campaign {
        owner: config.owner,
        goal: state.goal,
        total_contributed: state.total_contributed,
        status: state.status,
        minimum_contribution: state.minimum_contribution,
    })
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Balance of `contributor`; absent entries read as zero.
pub fn load_contribution(env: &Env, contributor: &Address) -> u128 {
    let key = DataKey::Contribution(contributor.clone());
    match env.storage().persistent().get::<DataKey, u128>(&key) {
        Some(balance) => {
            bump_persistent(env, &key);
            balance
        }
        None => 0,
    }
}

pub fn save_contribution(env: &Env, contributor: &Address, balance: u128) {
    let key = DataKey::Contribution(contributor.clone());
    env.storage().persistent().set(&key, &balance);
    bump_persistent(env, &key);
}
