//! # Types
//!
//! Shared data structures used across all modules of the campaign ledger.
//!
//! ## Config / State split
//!
//! A [`Campaign`] is internally stored as two separate ledger entries:
//!
//! - [`CampaignConfig`]: written once by `init`; never mutated.
//! - [`CampaignState`]: rewritten by every successful transition.
//!
//! Contributor balances live in their own persistent entries, one per
//! contributor, so the state record stays a fixed size.
//!
//! ## Status
//!
//! [`CampaignStatus`] is a two-phase gate:
//!
//! ```text
//! Closed ──open_campaign──► Open
//!   ▲                        │
//!   └──close_campaign────────┤
//!   └──close_early───────────┘
//! ```
//!
//! A freshly initialised campaign starts `Closed`.

use soroban_sdk::{contracttype, Address};

/// Phase gate controlling which mutations are legal.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CampaignStatus {
    /// Not accepting contributions.
    Closed = 0,
    /// Accepting contributions; pledges may be reset or withdrawn.
    Open = 1,
}

/// Immutable campaign configuration, written once by `init`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignConfig {
    pub owner: Address,
}

/// Mutable campaign state.
///
/// Every transition in [`crate::ledger`] takes one of these by reference and
/// hands back a complete replacement, so a rejected call never produces a
/// half-updated record.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignState {
    pub goal: u128,
    pub total_contributed: u128,
    pub status: CampaignStatus,
    pub minimum_contribution: u128,
}

impl CampaignState {
    /// State used to answer queries against a contract that was never
    /// initialised. All ratios resolve to zero.
    pub fn empty() -> Self {
        Self {
            goal: 0,
            total_contributed: 0,
            status: CampaignStatus::Closed,
            minimum_contribution: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == CampaignStatus::Open
    }

    pub fn summary(&self) -> CampaignSummary {
        CampaignSummary {
            goal: self.goal,
            total_contributed: self.total_contributed,
            status: self.status,
            minimum_contribution: self.minimum_contribution,
        }
    }
}

/// Full view of the campaign, reconstructed from config and state.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Campaign {
    /// Identity allowed to run administrative mutations.
    pub owner: Address,
    /// Target contribution total. Always positive after `init`.
    pub goal: u128,
    /// Sum of all currently recorded contributions.
    pub total_contributed: u128,
    /// Current phase.
    pub status: CampaignStatus,
    /// Contributions must be strictly greater than this value.
    pub minimum_contribution: u128,
}

/// The four core campaign fields, without the owner.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignSummary {
    pub goal: u128,
    pub total_contributed: u128,
    pub status: CampaignStatus,
    pub minimum_contribution: u128,
}
