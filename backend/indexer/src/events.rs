//! Canonical event types emitted by the campaign ledger contract.
//!
//! These mirror the events published from
//! `contracts/campaign_ledger/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the campaign ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The campaign was created (`init` topic).
    CampaignInitialized,
    /// The owner changed the goal (`goal_set` topic).
    GoalUpdated,
    /// The owner changed the minimum contribution (`min_set` topic).
    MinimumUpdated,
    /// The campaign was opened (`opened` topic).
    CampaignOpened,
    /// The campaign was closed, normally or early (`closed` topic).
    CampaignClosed,
    /// A contributor pledged funds (`contrib` topic).
    ContributionReceived,
    /// A contributor was refunded (`refunded` topic).
    ContributionRefunded,
    /// A contributor reset their pledge (`reset` topic).
    ContributionReset,
    /// A contributor withdrew their pledge (`withdrawn` topic).
    ContributionWithdrawn,
    /// The owner withdrew funds above the goal (`excess` topic).
    ExcessWithdrawn,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    pub const ALL: [EventKind; 11] = [
        Self::CampaignInitialized,
        Self::GoalUpdated,
        Self::MinimumUpdated,
        Self::CampaignOpened,
        Self::CampaignClosed,
        Self::ContributionReceived,
        Self::ContributionRefunded,
        Self::ContributionReset,
        Self::ContributionWithdrawn,
        Self::ExcessWithdrawn,
        Self::Unknown,
    ];

    /// Parse the leading topic symbol produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "init" => Self::CampaignInitialized,
            "goal_set" => Self::GoalUpdated,
            "min_set" => Self::MinimumUpdated,
            "opened" => Self::CampaignOpened,
            "closed" => Self::CampaignClosed,
            "contrib" => Self::ContributionReceived,
            "refunded" => Self::ContributionRefunded,
            "reset" => Self::ContributionReset,
            "withdrawn" => Self::ContributionWithdrawn,
            "excess" => Self::ExcessWithdrawn,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CampaignInitialized => "campaign_initialized",
            Self::GoalUpdated => "goal_updated",
            Self::MinimumUpdated => "minimum_updated",
            Self::CampaignOpened => "campaign_opened",
            Self::CampaignClosed => "campaign_closed",
            Self::ContributionReceived => "contribution_received",
            Self::ContributionRefunded => "contribution_refunded",
            Self::ContributionReset => "contribution_reset",
            Self::ContributionWithdrawn => "contribution_withdrawn",
            Self::ExcessWithdrawn => "excess_withdrawn",
            Self::Unknown => "unknown",
        }
    }

    /// Inverse of [`EventKind::as_str`].
    pub fn from_stored(s: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .unwrap_or(Self::Unknown)
    }

    /// Sign of this event's effect on the contributed total, if it has one.
    pub fn total_delta_sign(&self) -> Option<i8> {
        match self {
            Self::ContributionReceived => Some(1),
            Self::ContributionRefunded
            | Self::ContributionReset
            | Self::ContributionWithdrawn
            | Self::ExcessWithdrawn => Some(-1),
            _ => None,
        }
    }
}

/// A fully decoded campaign event, ready to be stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignEvent {
    /// RPC event id; unique per event and used for idempotent inserts.
    pub event_id: String,
    pub event_type: String,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}
