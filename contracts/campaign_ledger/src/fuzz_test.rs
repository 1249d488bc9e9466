extern crate std;

use std::vec::Vec;

use proptest::prelude::*;
use soroban_sdk::{testutils::Address as _, Address, Env};

use crate::invariants::{
    assert_all_campaign_invariants, assert_conservation, assert_unchanged, snapshot_balances,
};
use crate::{CampaignLedger, CampaignLedgerClient};

const CONTRIBUTORS: usize = 3;

#[derive(Clone, Debug)]
enum Op {
    Contribute(usize, u128),
    Refund(usize),
    Reset(usize),
    Withdraw(usize),
    WithdrawExcess,
    SetGoal(u128),
    Open,
    Close,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let who = 0..CONTRIBUTORS;
    prop_oneof![
        4 => (who.clone(), 1u128..600).prop_map(|(w, a)| Op::Contribute(w, a)),
        1 => who.clone().prop_map(Op::Refund),
        1 => who.clone().prop_map(Op::Reset),
        1 => who.prop_map(Op::Withdraw),
        1 => Just(Op::WithdrawExcess),
        1 => (1u128..2_000).prop_map(Op::SetGoal),
        1 => Just(Op::Open),
        1 => Just(Op::Close),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn fuzz_conservation_goal_ceiling_and_rejections(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let env = Env::default();
        env.mock_all_auths();
        let contract_id = env.register(CampaignLedger, ());
        let client = CampaignLedgerClient::new(&env, &contract_id);
        let owner = Address::generate(&env);
        client.init(&owner, &1_000, &10);
        client.open_campaign(&owner);

        let contributors: Vec<Address> =
            (0..CONTRIBUTORS).map(|_| Address::generate(&env)).collect();
        let mut excess_withdrawn: u128 = 0;

        for op in ops {
            let before = client.get_campaign().unwrap();
            let balances_before = snapshot_balances(&client, &contributors);
            let rejected = match op {
                Op::Contribute(who, amount) => {
                    let ok = client.try_contribute(&contributors[who], &amount).is_ok();
                    if ok {
                        let after = client.get_campaign().unwrap();
                        prop_assert!(after.total_contributed <= after.goal);
                    }
                    !ok
                }
                Op::Refund(who) => client.try_refund(&contributors[who]).is_err(),
                Op::Reset(who) => client.try_reset_contribution(&contributors[who]).is_err(),
                Op::Withdraw(who) => client.try_withdraw_contribution(&contributors[who]).is_err(),
                Op::WithdrawExcess => match client.try_withdraw_excess(&owner) {
                    Ok(Ok(amount)) => {
                        excess_withdrawn += amount;
                        false
                    }
                    _ => true,
                },
                Op::SetGoal(goal) => client.try_set_goal(&owner, &goal).is_err(),
                Op::Open => client.try_open_campaign(&owner).is_err(),
                Op::Close => client.try_close_campaign(&owner).is_err(),
            };

            if rejected {
                assert_unchanged(&client, &before, &balances_before);
            }
            assert_all_campaign_invariants(&client.get_campaign().unwrap());
            assert_conservation(&client, &contributors, excess_withdrawn);
        }
    }
}
