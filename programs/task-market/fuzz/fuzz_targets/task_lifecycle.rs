//! Fuzz target for the whole-task lifecycle
//!
//! Tests invariants:
//! - Status only moves along Open -> InProgress -> Completed -> Paid, or to Cancelled
//! - Paid and Cancelled tasks never change again
//! - A successful pay hands the worker the escrow less the platform fee
//! - A rejected call leaves no events behind
//!
//! Run with: cargo test --release -p task-market-fuzz task_lifecycle

use crate::*;
use anchor_lang::error::Error;
use proptest::prelude::*;
use task_market::{MarketError, TaskKind, TaskStatus};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Fuzz arbitrary call sequences against a bound task
    #[test]
    fn fuzz_task_lifecycle(input in any::<TaskLifecycleInput>()) {
        let result = simulate_task_lifecycle(&input);
        prop_assert!(!result.is_invariant_violation(),
            "Invariant violation: {:?}", result);
    }

    /// The happy path always ends Paid with the exact fee split
    #[test]
    fn fuzz_fixed_payment_payout(
        reward in arb_reward_amount(),
        fee_bps in arb_platform_fee_bps(),
    ) {
        let kind = TaskKind::FixedPayment;
        let mut market = funded_market(fee_bps, 100, 0);
        let task_id = market.create_task(creator(), kind, "Pay me", "", START + 86_400).unwrap();
        market.add_worker(creator(), kind, task_id, worker(), reward).unwrap();
        market.submit_proof_of_work(worker(), kind, task_id, "proof").unwrap();
        market.approve_proof_of_work(creator(), kind, task_id, worker()).unwrap();
        market.pay_task(worker(), kind, task_id).unwrap();

        let fee = share_of(reward, fee_bps);
        prop_assert_eq!(market.balance_of(&treasury()), fee);
        prop_assert_eq!(market.balance_of(&worker()), ACTOR_FUNDING + reward - fee);
        prop_assert_eq!(
            market.registry(kind).tasks(task_id).unwrap().status,
            TaskStatus::Paid
        );

        // Paying again is always refused
        let again = market.pay_task(worker(), kind, task_id).unwrap_err();
        prop_assert_eq!(again, Error::from(MarketError::TaskFinalized));
    }

    /// Proof after the deadline is refused, proof before it accepted
    #[test]
    fn fuzz_deadline_enforcement(
        deadline_offset in 1i64..(30 * 86_400i64),
        elapsed in 0i64..(60 * 86_400i64),
    ) {
        let kind = TaskKind::FixedPayment;
        let mut market = funded_market(250, 100, 0);
        let task_id = market
            .create_task(creator(), kind, "Timed", "", START + deadline_offset)
            .unwrap();
        market.add_worker(creator(), kind, task_id, worker(), 1_000).unwrap();
        market.advance_clock(elapsed).unwrap();

        let result = market.submit_proof_of_work(worker(), kind, task_id, "proof");
        if elapsed > deadline_offset {
            prop_assert_eq!(result.unwrap_err(), Error::from(MarketError::DeadlineExceeded));
        } else {
            prop_assert!(result.is_ok());
        }
    }
}
