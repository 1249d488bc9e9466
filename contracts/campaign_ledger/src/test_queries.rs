extern crate std;

use soroban_sdk::{testutils::Address as _, Address, Env, String};

use crate::{CampaignLedger, CampaignLedgerClient, CampaignStatus, CampaignSummary};

fn setup_open(goal: u128, minimum: u128) -> (Env, CampaignLedgerClient<'static>, Address) {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(CampaignLedger, ());
    let client = CampaignLedgerClient::new(&env, &contract_id);
    let owner = Address::generate(&env);
    client.init(&owner, &goal, &minimum);
    client.open_campaign(&owner);
    (env, client, owner)
}

#[test]
fn test_queries_on_uninitialised_contract_return_defaults() {
    let env = Env::default();
    let contract_id = env.register(CampaignLedger, ());
    let client = CampaignLedgerClient::new(&env, &contract_id);
    let someone = Address::generate(&env);

    assert!(client.get_campaign().is_none());
    assert!(client.get_owner().is_none());
    assert!(!client.is_owner(&someone));
    assert_eq!(client.get_goal(), 0);
    assert_eq!(client.get_contribution_percentage(), 0);
    assert_eq!(client.get_contribution_ranking(&someone), 0);
    assert_eq!(client.get_user_contribution_percentage(&someone), 0);
    assert!(!client.is_goal_met());
    assert_eq!(client.is_campaign_fully_funded(), 0);
    assert_eq!(client.get_status(), CampaignStatus::Closed);
}

#[test]
fn test_summary_and_progress() {
    let (env, client, _owner) = setup_open(1_000, 100);
    let a = Address::generate(&env);
    client.contribute(&a, &250);

    assert_eq!(
        client.get_campaign_summary(),
        CampaignSummary {
            goal: 1_000,
            total_contributed: 250,
            status: CampaignStatus::Open,
            minimum_contribution: 100,
        }
    );
    assert_eq!(client.get_contribution_percentage(), 25);
    assert_eq!(client.get_campaign_progress(), 25);
    assert_eq!(client.get_funding_goal_progress(), 25);
    assert_eq!(client.get_remaining_goal(), 750);
    assert_eq!(client.remaining_contribution_capacity(), 750);
    assert!(client.is_funding_active());
}

#[test]
fn test_remaining_funding_goal_is_signed() {
    let (env, client, owner) = setup_open(1_000, 100);
    let a = Address::generate(&env);
    client.contribute(&a, &400);
    assert_eq!(client.get_remaining_funding_goal(), 600);

    client.set_goal(&owner, &300);
    assert_eq!(client.get_remaining_funding_goal(), -100);
    assert_eq!(client.get_remaining_goal(), 0);
}

#[test]
fn test_per_contributor_figures() {
    let (env, client, _owner) = setup_open(1_000, 100);
    let a = Address::generate(&env);
    let b = Address::generate(&env);
    let nobody = Address::generate(&env);
    client.contribute(&a, &300);
    client.contribute(&b, &200);

    assert_eq!(client.get_user_contribution_balance(&a), 300);
    assert_eq!(client.get_contribution_ranking(&a), 60);
    assert_eq!(client.get_contribution_ranking(&b), 40);
    assert_eq!(client.get_user_contribution_percentage(&a), 30);
    // remaining 500 minus own 300
    assert_eq!(client.get_contribution_capacity(&a), 200);
    assert_eq!(client.get_contribution_capacity(&nobody), 500);

    assert_eq!(client.get_user_status(&a), 1);
    assert_eq!(client.get_user_status(&nobody), 0);
    assert!(client.is_user_above_minimum(&a));
    assert!(!client.is_user_above_minimum(&nobody));
    assert!(!client.is_user_fully_contributed(&a));
}

#[test]
fn test_contribution_eligibility_matches_contribute() {
    let (env, client, owner) = setup_open(1_000, 100);
    let a = Address::generate(&env);

    assert!(!client.is_contribution_eligible(&a, &100));
    assert!(client.is_contribution_eligible(&a, &101));
    assert!(client.is_contribution_eligible(&a, &1_000));
    assert!(!client.is_contribution_eligible(&a, &1_001));

    client.close_campaign(&owner);
    assert!(!client.is_contribution_eligible(&a, &500));
}

#[test]
fn test_fully_funded_flags() {
    let (env, client, _owner) = setup_open(1_000, 100);
    let a = Address::generate(&env);
    client.contribute(&a, &1_000);

    assert!(client.is_goal_met());
    assert_eq!(client.is_campaign_fully_funded(), 1);
    assert!(client.is_user_fully_contributed(&a));
    assert_eq!(client.get_contribution_capacity(&a), 0);
    assert_eq!(client.get_funding_status(), String::from_str(&env, "fully-funded"));
}

#[test]
fn test_contribution_limit_after_goal_lowered() {
    let (env, client, owner) = setup_open(1_000, 100);
    let a = Address::generate(&env);
    client.contribute(&a, &600);
    assert!(!client.exceeds_contribution_limit(&a));

    client.set_goal(&owner, &500);
    assert!(client.exceeds_contribution_limit(&a));
}

#[test]
fn test_refund_eligibility_queries() {
    let (env, client, owner) = setup_open(1_000, 100);
    let a = Address::generate(&env);
    let nobody = Address::generate(&env);
    client.contribute(&a, &300);

    assert!(client.is_refund_eligible(&a));
    assert!(!client.is_refund_eligible(&nobody));
    // Still open, so no closed-campaign refund yet.
    assert!(!client.can_withdraw_refund(&a));

    client.close_campaign(&owner);
    assert!(client.can_withdraw_refund(&a));
    assert!(!client.can_withdraw_refund(&nobody));

    client.set_goal(&owner, &200);
    assert!(!client.is_refund_eligible(&a));
    assert!(!client.can_withdraw_refund(&a));
}

#[test]
fn test_status_strings() {
    let (env, client, owner) = setup_open(1_000, 100);
    let a = Address::generate(&env);
    let nobody = Address::generate(&env);

    assert_eq!(client.get_status_string(), String::from_str(&env, "open"));
    assert_eq!(client.get_funding_status(), String::from_str(&env, "accepting"));

    client.contribute(&a, &300);
    assert_eq!(
        client.get_user_contribution_status(&a),
        String::from_str(&env, "refundable")
    );
    assert_eq!(
        client.get_user_contribution_status(&nobody),
        String::from_str(&env, "none")
    );

    client.close_campaign(&owner);
    assert_eq!(client.get_status_string(), String::from_str(&env, "closed"));
    assert_eq!(client.get_funding_status(), String::from_str(&env, "inactive"));

    client.set_goal(&owner, &200);
    assert_eq!(
        client.get_user_contribution_status(&a),
        String::from_str(&env, "committed")
    );
}

#[test]
fn test_owner_queries() {
    let (env, client, owner) = setup_open(1_000, 100);
    let other = Address::generate(&env);
    assert_eq!(client.get_owner(), Some(owner.clone()));
    assert!(client.is_owner(&owner));
    assert!(!client.is_owner(&other));
}
