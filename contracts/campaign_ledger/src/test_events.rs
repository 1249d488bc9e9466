extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events},
    vec, Address, Env, IntoVal, Symbol, TryIntoVal, Val, Vec,
};

use crate::{
    CampaignInitialized, CampaignLedger, CampaignLedgerClient, CampaignStatus,
    ContributionReceived, ContributionReleased, Error, ExcessWithdrawn, GoalUpdated,
    MinimumUpdated, StatusChanged,
};

fn setup_with_init() -> (Env, CampaignLedgerClient<'static>, Address) {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(CampaignLedger, ());
    let client = CampaignLedgerClient::new(&env, &contract_id);
    let owner = Address::generate(&env);
    client.init(&owner, &1_000, &100);
    (env, client, owner)
}

fn last_event(env: &Env) -> (Address, Vec<Val>, Val) {
    env.events().all().last().expect("No events found")
}

fn expected_topics(env: &Env, topic: Symbol, actor: &Address) -> Vec<Val> {
    vec![env, topic.into_val(env), actor.into_val(env)]
}

#[test]
fn test_initialized_event() {
    let (env, client, owner) = setup_with_init();

    let event = last_event(&env);
    assert_eq!(event.0, client.address);
    assert_eq!(event.1, expected_topics(&env, symbol_short!("init"), &owner));

    let data: CampaignInitialized = event.2.try_into_val(&env).unwrap();
    assert_eq!(
        data,
        CampaignInitialized {
            owner,
            goal: 1_000,
            minimum_contribution: 100,
        }
    );
}

#[test]
fn test_owner_setting_events() {
    let (env, client, owner) = setup_with_init();

    client.set_goal(&owner, &2_000);
    let event = last_event(&env);
    assert_eq!(event.1, expected_topics(&env, symbol_short!("goal_set"), &owner));
    let data: GoalUpdated = event.2.try_into_val(&env).unwrap();
    assert_eq!(data, GoalUpdated { owner: owner.clone(), goal: 2_000 });

    client.set_minimum_contribution(&owner, &50);
    let event = last_event(&env);
    assert_eq!(event.1, expected_topics(&env, symbol_short!("min_set"), &owner));
    let data: MinimumUpdated = event.2.try_into_val(&env).unwrap();
    assert_eq!(
        data,
        MinimumUpdated {
            owner,
            minimum_contribution: 50,
        }
    );
}

#[test]
fn test_status_events() {
    let (env, client, owner) = setup_with_init();

    client.open_campaign(&owner);
    let event = last_event(&env);
    assert_eq!(event.1, expected_topics(&env, symbol_short!("opened"), &owner));
    let data: StatusChanged = event.2.try_into_val(&env).unwrap();
    assert_eq!(data.status, CampaignStatus::Open);

    client.close_early(&owner);
    let event = last_event(&env);
    assert_eq!(event.1, expected_topics(&env, symbol_short!("closed"), &owner));
    let data: StatusChanged = event.2.try_into_val(&env).unwrap();
    assert_eq!(data.status, CampaignStatus::Closed);
}

#[test]
fn test_contribution_and_release_events() {
    let (env, client, owner) = setup_with_init();
    let backer = Address::generate(&env);
    client.open_campaign(&owner);

    client.contribute(&backer, &400);
    let event = last_event(&env);
    assert_eq!(event.1, expected_topics(&env, symbol_short!("contrib"), &backer));
    let data: ContributionReceived = event.2.try_into_val(&env).unwrap();
    assert_eq!(
        data,
        ContributionReceived {
            contributor: backer.clone(),
            amount: 400,
            balance: 400,
            total_contributed: 400,
        }
    );

    client.reset_contribution(&backer);
    let event = last_event(&env);
    assert_eq!(event.1, expected_topics(&env, symbol_short!("reset"), &backer));

    client.contribute(&backer, &300);
    client.withdraw_contribution(&backer);
    let event = last_event(&env);
    assert_eq!(event.1, expected_topics(&env, symbol_short!("withdrawn"), &backer));

    client.contribute(&backer, &200);
    client.refund(&backer);
    let event = last_event(&env);
    assert_eq!(event.1, expected_topics(&env, symbol_short!("refunded"), &backer));
    let data: ContributionReleased = event.2.try_into_val(&env).unwrap();
    assert_eq!(
        data,
        ContributionReleased {
            contributor: backer,
            amount: 200,
            total_contributed: 0,
        }
    );
}

#[test]
fn test_excess_withdrawn_event() {
    let (env, client, owner) = setup_with_init();
    let backer = Address::generate(&env);
    client.open_campaign(&owner);
    client.contribute(&backer, &800);
    client.set_goal(&owner, &500);
    client.withdraw_excess(&owner);

    let event = last_event(&env);
    assert_eq!(event.1, expected_topics(&env, symbol_short!("excess"), &owner));
    let data: ExcessWithdrawn = event.2.try_into_val(&env).unwrap();
    assert_eq!(
        data,
        ExcessWithdrawn {
            owner,
            amount: 300,
            total_contributed: 500,
        }
    );
}

#[test]
fn test_rejected_call_emits_nothing() {
    let (env, client, owner) = setup_with_init();
    client.open_campaign(&owner);
    let backer = Address::generate(&env);

    assert_eq!(client.try_contribute(&backer, &50), Err(Ok(Error::InvalidContribution)));
    let contrib_topics = expected_topics(&env, symbol_short!("contrib"), &backer);
    let recorded = env
        .events()
        .all()
        .iter()
        .filter(|e| e.1 == contrib_topics)
        .count();
    assert_eq!(recorded, 0);
}
