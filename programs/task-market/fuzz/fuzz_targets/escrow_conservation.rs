//! Fuzz target for escrow conservation on milestone tasks
//!
//! Tests invariants:
//! - Milestone rewards never allocate more than the escrowed budget
//! - Registry token balances always equal the escrow books
//! - Token balances always sum to the minted supply
//! - A closed task holds no escrow
//! - Each milestone is paid at most once, and only after approval
//!
//! Run with: cargo test --release -p task-market-fuzz escrow_conservation

use crate::*;
use proptest::prelude::*;
use task_market::{TaskKind, TaskStatus};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Fuzz arbitrary call sequences against a milestone task
    #[test]
    fn fuzz_milestone_escrow(input in any::<MilestoneInput>()) {
        let result = simulate_milestone_task(&input);
        prop_assert!(!result.is_invariant_violation(),
            "Invariant violation: {:?}", result);
    }

    /// Walking every milestone to payment drains the escrow exactly
    #[test]
    fn fuzz_milestone_full_payout(
        budget in arb_reward_amount(),
        reward_bps in prop::collection::vec(1u16..=3000u16, 1..4),
        fee_bps in arb_platform_fee_bps(),
    ) {
        let kind = TaskKind::Milestone;
        let mut market = funded_market(fee_bps, 100, 0);
        let task_id = market.create_task(creator(), kind, "Phased", "", START + 86_400).unwrap();
        market.add_worker(creator(), kind, task_id, worker(), budget).unwrap();

        let mut rewards = Vec::new();
        for bps in &reward_bps {
            let reward = share_of(budget, *bps);
            if market.add_milestone(creator(), kind, task_id, "step", reward).is_ok() {
                rewards.push(reward);
            }
        }
        prop_assume!(!rewards.is_empty());

        for index in 0..rewards.len() as u32 {
            market.submit_milestone_proof_of_work(worker(), kind, task_id, index, "proof").unwrap();
            market.approve_milestone(creator(), kind, task_id, index).unwrap();
            market.pay_milestone(worker(), kind, task_id, index).unwrap();
        }
        market.complete_task(creator(), kind, task_id).unwrap();

        let allocated: u64 = rewards.iter().sum();
        let fees: u64 = rewards.iter().map(|r| share_of(*r, fee_bps)).sum();
        prop_assert_eq!(market.balance_of(&treasury()), fees);
        prop_assert_eq!(market.balance_of(&worker()), ACTOR_FUNDING + allocated - fees);
        prop_assert_eq!(market.balance_of(&creator()), ACTOR_FUNDING - allocated);
        prop_assert_eq!(
            market.registry(kind).tasks(task_id).unwrap().status,
            TaskStatus::Paid
        );
        prop_assert_eq!(check_escrow_balanced(&market), EscrowInvariantResult::Valid);
        prop_assert_eq!(check_supply_conserved(&market), EscrowInvariantResult::Valid);
    }

    /// Cancelling at any point refunds everything not yet paid
    #[test]
    fn fuzz_terminate_refunds_remaining(
        reward in arb_reward_amount(),
        submit_first in any::<bool>(),
    ) {
        let kind = TaskKind::FixedPayment;
        let mut market = funded_market(250, 100, 0);
        let task_id = market.create_task(creator(), kind, "Cancel me", "", START + 86_400).unwrap();
        market.add_worker(creator(), kind, task_id, worker(), reward).unwrap();
        if submit_first {
            market.submit_proof_of_work(worker(), kind, task_id, "proof").unwrap();
        }
        market.terminate_task(creator(), kind, task_id).unwrap();

        prop_assert_eq!(market.balance_of(&creator()), ACTOR_FUNDING);
        prop_assert_eq!(market.registry(kind).escrow(task_id).remaining(), 0);
        prop_assert!(market.approve_proof_of_work(creator(), kind, task_id, worker()).is_err());
        prop_assert!(market.escrow_balanced());
    }
}
