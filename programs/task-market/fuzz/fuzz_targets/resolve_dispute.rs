//! Fuzz target for proposal approval, rejection and distribution
//!
//! Tests invariants:
//! - Funds move only after both parties approve, and only once
//! - The worker gets the proposed share and the creator the rest of the reward
//! - Rejection charges the processing fee and reopens voting
//! - Escrow added after filing goes back to the creator
//!
//! Run with: cargo test --release -p task-market-fuzz resolve_dispute

use crate::*;
use proptest::prelude::*;
use task_market::{DisputeStatus, TaskKind};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Fuzz the full settlement path with arbitrary votes and rejections
    #[test]
    fn fuzz_resolve_dispute(input in any::<ResolveDisputeInput>()) {
        let result = simulate_resolve_dispute(&input);
        prop_assert!(!result.is_invariant_violation(),
            "Invariant violation: {:?}", result);
    }

    /// Rejection fee is split among the round's voters with dust to the treasury
    #[test]
    fn fuzz_rejection_fee_split(
        reward in arb_reward_amount(),
        processing_bps in arb_processing_bps(),
        by_worker in any::<bool>(),
    ) {
        let kind = TaskKind::FixedPayment;
        let mut market = funded_market(250, processing_bps, 3);
        let task_id = market.create_task(creator(), kind, "Reject", "", START + 86_400).unwrap();
        market.add_worker(creator(), kind, task_id, worker(), reward).unwrap();
        market.submit_proof_of_work(worker(), kind, task_id, "proof").unwrap();
        let dispute_id = market.file_dispute_by_worker(worker(), kind, task_id).unwrap();
        for i in 0..3 {
            market.vote_on_dispute(admin(i), dispute_id, reward / 2).unwrap();
        }
        market.process_votes(admin(0), dispute_id).unwrap();

        let rejecter = if by_worker { worker() } else { creator() };
        let admin_before = market.balance_of(&admin(0));
        market.reject_proposal(rejecter, dispute_id).unwrap();

        let fee = share_of(reward, processing_bps);
        prop_assert_eq!(market.balance_of(&admin(0)) - admin_before, fee / 3);
        prop_assert_eq!(market.balance_of(&treasury()), fee % 3);

        let dispute = market.resolver().get_dispute(dispute_id).unwrap();
        prop_assert_eq!(dispute.status, DisputeStatus::Filed);
        prop_assert_eq!(dispute.round, 1);
        prop_assert!(dispute.votes.is_empty());
        prop_assert!(market.resolver().distribution_proposals(dispute_id).is_none());
        prop_assert!(market.escrow_balanced());
    }
}
