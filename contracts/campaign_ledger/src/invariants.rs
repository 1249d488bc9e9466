#![allow(dead_code)]

extern crate std;

use std::vec::Vec;

use soroban_sdk::Address;

use crate::types::Campaign;
use crate::CampaignLedgerClient;

/// INV-1: goal and minimum stay positive once initialised.
pub fn assert_positive_parameters(campaign: &Campaign) {
    assert!(
        campaign.goal > 0,
        "INV-1 violated: non-positive goal ({})",
        campaign.goal
    );
    assert!(
        campaign.minimum_contribution > 0,
        "INV-1 violated: non-positive minimum ({})",
        campaign.minimum_contribution
    );
}

/// INV-3: recorded balances account for the total plus whatever excess the
/// owner has clamped away.
pub fn assert_conservation(
    client: &CampaignLedgerClient,
    contributors: &[Address],
    excess_withdrawn: u128,
) {
    let balances: u128 = contributors
        .iter()
        .map(|c| client.get_user_contribution(c))
        .sum();
    let total = client.get_total_contributed();
    assert_eq!(
        balances,
        total + excess_withdrawn,
        "INV-3 violated: balances {} != total {} + withdrawn excess {}",
        balances,
        total,
        excess_withdrawn
    );
}

/// A rejected call must leave the campaign and every listed balance as it was.
pub fn assert_unchanged(
    client: &CampaignLedgerClient,
    before: &Campaign,
    balances_before: &[(Address, u128)],
) {
    let after = client.get_campaign().expect("campaign missing");
    assert_eq!(before, &after, "rejected call mutated campaign state");
    for (contributor, balance) in balances_before {
        assert_eq!(
            client.get_user_contribution(contributor),
            *balance,
            "rejected call mutated a contributor balance"
        );
    }
}

pub fn snapshot_balances(
    client: &CampaignLedgerClient,
    contributors: &[Address],
) -> Vec<(Address, u128)> {
    contributors
        .iter()
        .map(|c| (c.clone(), client.get_user_contribution(c)))
        .collect()
}

/// Run all stateless campaign invariants.
pub fn assert_all_campaign_invariants(campaign: &Campaign) {
    assert_positive_parameters(campaign);
}
