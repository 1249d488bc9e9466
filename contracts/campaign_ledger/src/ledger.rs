//! # Ledger transitions
//!
//! Pure transition functions over [`CampaignState`] and a single contributor
//! balance. Nothing here touches storage: each function either returns the
//! complete post-state or an [`Error`], and the entry points in `lib.rs` only
//! write when they get `Ok`.
//!
//! Authorization is not checked here; owner-gated entry points reject
//! non-owners before calling into this module.

use crate::types::{CampaignState, CampaignStatus};
use crate::Error;

/// Result of a transition that moves value in or out of one balance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transition {
    pub state: CampaignState,
    /// Contributor balance after the transition.
    pub balance: u128,
    /// Amount credited or released by the transition.
    pub amount: u128,
}

fn checked_sub(a: u128, b: u128) -> Result<u128, Error> {
    a.checked_sub(b).ok_or(Error::ArithmeticUnderflow)
}

fn checked_add(a: u128, b: u128) -> Result<u128, Error> {
    a.checked_add(b).ok_or(Error::ArithmeticOverflow)
}

// ── Owner transitions ────────────────────────────────────────────────

pub fn set_goal(state: &CampaignState, goal: u128) -> Result<CampaignState, Error> {
    if goal == 0 {
        return Err(Error::InvalidAmount);
    }
    Ok(CampaignState {
        goal,
        ..state.clone()
    })
}

pub fn set_minimum_contribution(
    state: &CampaignState,
    minimum: u128,
) -> Result<CampaignState, Error> {
    if minimum == 0 {
        return Err(Error::InvalidAmount);
    }
    Ok(CampaignState {
        minimum_contribution: minimum,
        ..state.clone()
    })
}

pub fn set_status(state: &CampaignState, status: CampaignStatus) -> CampaignState {
    CampaignState {
        status,
        ..state.clone()
    }
}

/// Close a campaign that is currently open.
pub fn close_early(state: &CampaignState) -> Result<CampaignState, Error> {
    if !state.is_open() {
        return Err(Error::FundingNotOpen);
    }
    Ok(set_status(state, CampaignStatus::Closed))
}

/// Amount by which `total_contributed` exceeds the goal, or zero.
pub fn excess(state: &CampaignState) -> u128 {
    state.total_contributed.saturating_sub(state.goal)
}

/// Clamp the total down to the goal. Returns the new state and the excess.
pub fn withdraw_excess(state: &CampaignState) -> Result<(CampaignState, u128), Error> {
    let excess = excess(state);
    if excess == 0 {
        return Err(Error::NoExcessFunds);
    }
    let next = CampaignState {
        total_contributed: checked_sub(state.total_contributed, excess)?,
        ..state.clone()
    };
    Ok((next, excess))
}

// ── Contributor transitions ──────────────────────────────────────────

/// Whether `amount` would be accepted by [`contribute`] right now.
pub fn accepts_contribution(state: &CampaignState, amount: u128) -> bool {
    if amount <= state.minimum_contribution || !state.is_open() {
        return false;
    }
    match state.total_contributed.checked_add(amount) {
        Some(total) => total <= state.goal,
        None => false,
    }
}

pub fn contribute(state: &CampaignState, balance: u128, amount: u128) -> Result<Transition, Error> {
    if !accepts_contribution(state, amount) {
        return Err(Error::InvalidContribution);
    }
    let total_contributed = checked_add(state.total_contributed, amount)?;
    let balance = checked_add(balance, amount)?;
    Ok(Transition {
        state: CampaignState {
            total_contributed,
            ..state.clone()
        },
        balance,
        amount,
    })
}

/// Refunds stay available while the total has not gone past the goal.
pub fn refund_window_open(state: &CampaignState) -> bool {
    state.total_contributed <= state.goal
}

pub fn refund(state: &CampaignState, balance: u128) -> Result<Transition, Error> {
    if !refund_window_open(state) || balance == 0 {
        return Err(Error::RefundFailure);
    }
    release(state, balance)
}

/// Shared by `reset_contribution` and `withdraw_contribution`.
pub fn release_open_pledge(state: &CampaignState, balance: u128) -> Result<Transition, Error> {
    if !state.is_open() {
        return Err(Error::FundingClosed);
    }
    if balance == 0 {
        return Err(Error::RefundFailure);
    }
    release(state, balance)
}

fn release(state: &CampaignState, balance: u128) -> Result<Transition, Error> {
    let total_contributed = checked_sub(state.total_contributed, balance)?;
    Ok(Transition {
        state: CampaignState {
            total_contributed,
            ..state.clone()
        },
        balance: 0,
        amount: balance,
    })
}

// ── Derived figures ──────────────────────────────────────────────────

/// `goal - total`, clamped at zero.
pub fn remaining_goal(state: &CampaignState) -> u128 {
    state.goal.saturating_sub(state.total_contributed)
}

/// Signed `goal - total`; negative once the campaign is over-funded.
pub fn funding_deficit(state: &CampaignState) -> i128 {
    let goal = i128::try_from(state.goal).unwrap_or(i128::MAX);
    let total = i128::try_from(state.total_contributed).unwrap_or(i128::MAX);
    goal.saturating_sub(total)
}

pub fn is_goal_met(state: &CampaignState) -> bool {
    state.goal > 0 && state.total_contributed >= state.goal
}

/// `part * 100 / whole`, or zero when `whole` is zero.
pub fn percent_of(part: u128, whole: u128) -> u128 {
    if whole == 0 {
        return 0;
    }
    if let Some(scaled) = part.checked_mul(100) {
        return scaled / whole;
    }
    // Whole multiples plus the exact percent of the remainder.
    let quotient = part / whole;
    let fraction = mul_div_below(part % whole, 100, whole);
    quotient.saturating_mul(100).saturating_add(fraction)
}

/// `floor(part * factor / whole)` for `part < whole`, without a wider integer.
///
/// Shift-and-add over the bits of `factor`, keeping `quotient * whole + rem`
/// equal to `part * (bits seen so far)` with `rem < whole`.
fn mul_div_below(part: u128, factor: u32, whole: u128) -> u128 {
    let mut quotient: u128 = 0;
    let mut rem: u128 = 0;
    for bit in (0..u32::BITS - factor.leading_zeros()).rev() {
        quotient <<= 1;
        rem = add_mod(rem, rem, whole, &mut quotient);
        if factor & (1 << bit) != 0 {
            rem = add_mod(rem, part, whole, &mut quotient);
        }
    }
    quotient
}

/// `(a + b) mod whole` for `a, b < whole`, carrying into `quotient`.
fn add_mod(a: u128, b: u128, whole: u128, quotient: &mut u128) -> u128 {
    if a >= whole - b {
        *quotient += 1;
        a - (whole - b)
    } else {
        a + b
    }
}

pub fn contribution_capacity(state: &CampaignState, balance: u128) -> u128 {
    remaining_goal(state).saturating_sub(balance)
}
