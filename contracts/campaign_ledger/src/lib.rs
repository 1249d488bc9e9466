//! # Campaign Ledger Contract
//!
//! Bookkeeping for exactly one crowdfunding campaign: a goal, a running
//! total, a per-contributor balance map and an open/closed status.
//!
//! | Phase          | Entry Point(s)                                                        |
//! |----------------|-----------------------------------------------------------------------|
//! | Bootstrap      | [`CampaignLedger::init`]                                              |
//! | Administration | `set_goal`, `set_minimum_contribution`, `open_campaign`, `close_campaign`, `close_early`, `withdraw_excess` |
//! | Contributing   | `contribute`, `refund`, `reset_contribution`, `withdraw_contribution` |
//! | Queries        | everything else                                                       |
//!
//! ## Architecture
//!
//! Transitions are pure functions in [`ledger`]; storage access lives in
//! [`storage`]. Entry points here authenticate the caller, load state, run the
//! transition and only write + emit when it succeeds. The ledger records
//! amounts; moving the underlying value is the host's job.
//!
//! Contributions are accepted only while the campaign is `Open`.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, Address, Env, String};

mod events;
pub mod ledger;
mod storage;
mod types;

#[cfg(test)]
mod fuzz_test;
#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;
#[cfg(test)]
mod test_queries;

use events::ReleaseKind;
use ledger::Transition;
pub use events::{
    CampaignInitialized, ContributionReceived, ContributionReleased, ExcessWithdrawn,
    GoalUpdated, MinimumUpdated, StatusChanged,
};
pub use types::{Campaign, CampaignConfig, CampaignState, CampaignStatus, CampaignSummary};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    NotAuthorized       = 1,
    InvalidAmount       = 2,
    InvalidContribution = 3,
    FundingClosed       = 4,
    FundingNotOpen      = 5,
    RefundFailure       = 6,
    NoExcessFunds       = 7,
    ArithmeticUnderflow = 8,
    ArithmeticOverflow  = 9,
    AlreadyInitialized  = 10,
    NotInitialized      = 11,
}

#[contract]
pub struct CampaignLedger;

// ─────────────────────────────────────────────────────────
// Internal helpers
// ─────────────────────────────────────────────────────────

/// Authenticate `caller` and reject anyone but the owner.
///
/// Runs before any other validation of an owner-gated call.
fn require_owner(env: &Env, caller: &Address) -> Result<CampaignState, Error> {
    caller.require_auth();
    let config = storage::load_config(env).ok_or(Error::NotInitialized)?;
    if *caller != config.owner {
        return Err(Error::NotAuthorized);
    }
    storage::load_state(env).ok_or(Error::NotInitialized)
}

fn require_state(env: &Env) -> Result<CampaignState, Error> {
    storage::load_state(env).ok_or(Error::NotInitialized)
}

fn commit(env: &Env, contributor: &Address, transition: &Transition) {
    storage::save_state(env, &transition.state);
    storage::save_contribution(env, contributor, transition.balance);
}

fn release(env: &Env, caller: Address, kind: ReleaseKind) -> Result<u128, Error> {
    caller.require_auth();
    let state = require_state(env)?;
    let balance = storage::load_contribution(env, &caller);

    let transition = match kind {
        ReleaseKind::Refund => ledger::refund(&state, balance)?,
        ReleaseKind::Reset | ReleaseKind::Withdrawal => {
            ledger::release_open_pledge(&state, balance)?
        }
    };
    commit(env, &caller, &transition);

    events::emit_contribution_released(
        env,
        kind,
        ContributionReleased {
            contributor: caller,
            amount: transition.amount,
            total_contributed: transition.state.total_contributed,
        },
    );
    Ok(transition.amount)
}

fn set_status(env: &Env, owner: Address, state: CampaignState) {
    storage::save_state(env, &state);
    events::emit_status_changed(
        env,
        StatusChanged {
            owner,
            status: state.status,
        },
    );
}

#[contractimpl]
impl CampaignLedger {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Create the campaign. Must be called exactly once after deployment.
    ///
    /// The campaign starts `Closed`; the owner opens it explicitly.
    pub fn init(
        env: Env,
        owner: Address,
        goal: u128,
        minimum_contribution: u128,
    ) -> Result<(), Error> {
        owner.require_auth();
        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        if goal == 0 || minimum_contribution == 0 {
            return Err(Error::InvalidAmount);
        }

        let state = CampaignState {
            goal,
            total_contributed: 0,
            status: CampaignStatus::Closed,
            minimum_contribution,
        };
        storage::save_campaign(&env, &CampaignConfig { owner: owner.clone() }, &state);

        events::emit_initialized(
            &env,
            CampaignInitialized {
                owner,
                goal,
                minimum_contribution,
            },
        );
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Owner-gated mutations
    // ─────────────────────────────────────────────────────────

    /// Set a new goal. May be lowered below the current total, which makes
    /// the difference withdrawable through [`Self::withdraw_excess`].
    pub fn set_goal(env: Env, caller: Address, goal: u128) -> Result<(), Error> {
        let state = require_owner(&env, &caller)?;
        let next = ledger::set_goal(&state, goal)?;
        storage::save_state(&env, &next);
        events::emit_goal_updated(&env, GoalUpdated { owner: caller, goal });
        Ok(())
    }

    pub fn set_minimum_contribution(
        env: Env,
        caller: Address,
        minimum_contribution: u128,
    ) -> Result<(), Error> {
        let state = require_owner(&env, &caller)?;
        let next = ledger::set_minimum_contribution(&state, minimum_contribution)?;
        storage::save_state(&env, &next);
        events::emit_minimum_updated(
            &env,
            MinimumUpdated {
                owner: caller,
                minimum_contribution,
            },
        );
        Ok(())
    }

    pub fn open_campaign(env: Env, caller: Address) -> Result<(), Error> {
        let state = require_owner(&env, &caller)?;
        set_status(&env, caller, ledger::set_status(&state, CampaignStatus::Open));
        Ok(())
    }

    /// Close the campaign regardless of its current status.
    pub fn close_campaign(env: Env, caller: Address) -> Result<(), Error> {
        let state = require_owner(&env, &caller)?;
        set_status(&env, caller, ledger::set_status(&state, CampaignStatus::Closed));
        Ok(())
    }

    /// Close a campaign that is currently open; fails with
    /// `FundingNotOpen` if it is already closed.
    pub fn close_early(env: Env, caller: Address) -> Result<(), Error> {
        let state = require_owner(&env, &caller)?;
        set_status(&env, caller, ledger::close_early(&state)?);
        Ok(())
    }

    /// Clamp the total down to the goal and report the excess.
    ///
    /// The returned amount is what the host should pay out to the owner.
    pub fn withdraw_excess(env: Env, caller: Address) -> Result<u128, Error> {
        let state = require_owner(&env, &caller)?;
        let (next, excess) = ledger::withdraw_excess(&state)?;
        storage::save_state(&env, &next);

        events::emit_excess_withdrawn(
            &env,
            ExcessWithdrawn {
                owner: caller,
                amount: excess,
                total_contributed: next.total_contributed,
            },
        );
        Ok(excess)
    }

    // ─────────────────────────────────────────────────────────
    // Contributor mutations
    // ─────────────────────────────────────────────────────────

    /// Record a pledge of `amount` from `caller`. Returns the caller's new
    /// balance.
    pub fn contribute(env: Env, caller: Address, amount: u128) -> Result<u128, Error> {
        caller.require_auth();
        let state = require_state(&env)?;
        let balance = storage::load_contribution(&env, &caller);

        let transition = ledger::contribute(&state, balance, amount)?;
        commit(&env, &caller, &transition);

        events::emit_contribution_received(
            &env,
            ContributionReceived {
                contributor: caller,
                amount,
                balance: transition.balance,
                total_contributed: transition.state.total_contributed,
            },
        );
        Ok(transition.balance)
    }

    /// Return the caller's whole balance while the goal has not been passed.
    pub fn refund(env: Env, caller: Address) -> Result<u128, Error> {
        release(&env, caller, ReleaseKind::Refund)
    }

    /// Walk back the caller's pledge while the campaign is open.
    pub fn reset_contribution(env: Env, caller: Address) -> Result<u128, Error> {
        release(&env, caller, ReleaseKind::Reset)
    }

    /// Same transition as [`Self::reset_contribution`].
    pub fn withdraw_contribution(env: Env, caller: Address) -> Result<u128, Error> {
        release(&env, caller, ReleaseKind::Withdrawal)
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn get_campaign(env: Env) -> Option<Campaign> {
        storage::load_campaign(&env)
    }

    pub fn get_owner(env: Env) -> Option<Address> {
        storage::load_config(&env).map(|config| config.owner)
    }

    pub fn is_owner(env: Env, id: Address) -> bool {
        storage::load_config(&env).is_some_and(|config| config.owner == id)
    }

    pub fn get_campaign_summary(env: Env) -> CampaignSummary {
        storage::state_or_empty(&env).summary()
    }

    pub fn get_goal(env: Env) -> u128 {
        storage::state_or_empty(&env).goal
    }

    pub fn get_total_contributed(env: Env) -> u128 {
        storage::state_or_empty(&env).total_contributed
    }

    pub fn get_status(env: Env) -> CampaignStatus {
        storage::state_or_empty(&env).status
    }

    pub fn get_minimum_contribution(env: Env) -> u128 {
        storage::state_or_empty(&env).minimum_contribution
    }

    /// `"open"` or `"closed"`.
    pub fn get_status_string(env: Env) -> String {
        let label = match storage::state_or_empty(&env).status {
            CampaignStatus::Open => "open",
            CampaignStatus::Closed => "closed",
        };
        String::from_str(&env, label)
    }

    /// `"fully-funded"` once the goal is met, otherwise `"accepting"` while
    /// open and `"inactive"` while closed.
    pub fn get_funding_status(env: Env) -> String {
        let state = storage::state_or_empty(&env);
        let label = if ledger::is_goal_met(&state) {
            "fully-funded"
        } else if state.is_open() {
            "accepting"
        } else {
            "inactive"
        };
        String::from_str(&env, label)
    }

    pub fn is_funding_active(env: Env) -> bool {
        storage::state_or_empty(&env).is_open()
    }

    pub fn is_goal_met(env: Env) -> bool {
        ledger::is_goal_met(&storage::state_or_empty(&env))
    }

    /// `1` when the goal is met, `0` otherwise.
    pub fn is_campaign_fully_funded(env: Env) -> u32 {
        u32::from(Self::is_goal_met(env))
    }

    pub fn get_remaining_goal(env: Env) -> u128 {
        ledger::remaining_goal(&storage::state_or_empty(&env))
    }

    pub fn remaining_contribution_capacity(env: Env) -> u128 {
        Self::get_remaining_goal(env)
    }

    /// Signed `goal - total`. Negative when the total exceeds the goal.
    pub fn get_remaining_funding_goal(env: Env) -> i128 {
        ledger::funding_deficit(&storage::state_or_empty(&env))
    }

    /// `total * 100 / goal`, or `0` when there is no goal.
    pub fn get_contribution_percentage(env: Env) -> u128 {
        let state = storage::state_or_empty(&env);
        ledger::percent_of(state.total_contributed, state.goal)
    }

    pub fn get_campaign_progress(env: Env) -> u128 {
        Self::get_contribution_percentage(env)
    }

    pub fn get_funding_goal_progress(env: Env) -> u128 {
        Self::get_contribution_percentage(env)
    }

    // ── Per-contributor queries ──────────────────────────────

    pub fn get_user_contribution(env: Env, id: Address) -> u128 {
        storage::load_contribution(&env, &id)
    }

    pub fn get_user_contribution_balance(env: Env, id: Address) -> u128 {
        storage::load_contribution(&env, &id)
    }

    /// `1` if `id` has a non-zero balance, `0` otherwise.
    pub fn get_user_status(env: Env, id: Address) -> u32 {
        u32::from(storage::load_contribution(&env, &id) > 0)
    }

    /// Whether `refund` would succeed for `id` right now.
    pub fn is_refund_eligible(env: Env, id: Address) -> bool {
        let state = storage::state_or_empty(&env);
        ledger::refund_window_open(&state) && storage::load_contribution(&env, &id) > 0
    }

    /// Refund eligibility restricted to a closed campaign.
    pub fn can_withdraw_refund(env: Env, id: Address) -> bool {
        let state = storage::state_or_empty(&env);
        !state.is_open()
            && ledger::refund_window_open(&state)
            && storage::load_contribution(&env, &id) > 0
    }

    /// Whether `contribute(id, amount)` would be accepted right now.
    pub fn is_contribution_eligible(env: Env, _id: Address, amount: u128) -> bool {
        ledger::accepts_contribution(&storage::state_or_empty(&env), amount)
    }

    /// Share of the current total held by `id`, in percent.
    pub fn get_contribution_ranking(env: Env, id: Address) -> u128 {
        let state = storage::state_or_empty(&env);
        ledger::percent_of(storage::load_contribution(&env, &id), state.total_contributed)
    }

    /// Balance of `id` as a percentage of the goal.
    pub fn get_user_contribution_percentage(env: Env, id: Address) -> u128 {
        let state = storage::state_or_empty(&env);
        ledger::percent_of(storage::load_contribution(&env, &id), state.goal)
    }

    /// Remaining goal minus the balance of `id`, clamped at zero.
    pub fn get_contribution_capacity(env: Env, id: Address) -> u128 {
        let state = storage::state_or_empty(&env);
        ledger::contribution_capacity(&state, storage::load_contribution(&env, &id))
    }

    pub fn is_user_above_minimum(env: Env, id: Address) -> bool {
        let state = storage::state_or_empty(&env);
        storage::load_contribution(&env, &id) > state.minimum_contribution
    }

    /// `id` has contributed and has no capacity left.
    pub fn is_user_fully_contributed(env: Env, id: Address) -> bool {
        let state = storage::state_or_empty(&env);
        let balance = storage::load_contribution(&env, &id);
        balance > 0 && ledger::contribution_capacity(&state, balance) == 0
    }

    /// `id` holds more than the whole goal, possible after the goal was lowered.
    pub fn exceeds_contribution_limit(env: Env, id: Address) -> bool {
        let state = storage::state_or_empty(&env);
        storage::load_contribution(&env, &id) > state.goal
    }

    /// `"none"`, `"refundable"` or `"committed"`.
    pub fn get_user_contribution_status(env: Env, id: Address) -> String {
        let state = storage::state_or_empty(&env);
        let label = if storage::load_contribution(&env, &id) == 0 {
            "none"
        } else if ledger::refund_window_open(&state) {
            "refundable"
        } else {
            "committed"
        };
        String::from_str(&env, label)
    }
}
