//! Fuzz target for admin voting on disputes
//!
//! Tests invariants:
//! - One vote per admin per round
//! - Parties never vote on their own dispute
//! - Votes above the disputed reward are refused
//! - Processing needs a quorum and yields the floor of the mean vote
//!
//! Run with: cargo test --release -p task-market-fuzz vote_dispute

use crate::*;
use proptest::prelude::*;
use task_market::{AdminStatus, DisputeStatus, TaskKind, DISPUTE_QUORUM};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Fuzz vote_on_dispute / process_votes with arbitrary ballots
    #[test]
    fn fuzz_vote_dispute(input in any::<VoteDisputeInput>()) {
        let result = simulate_vote_dispute(&input);
        prop_assert!(!result.is_invariant_violation(),
            "Invariant violation: {:?}", result);
    }

    /// The proposal always lies between the lowest and highest vote
    #[test]
    fn fuzz_floor_mean_bounds(
        reward in arb_reward_amount(),
        bps in prop::collection::vec(0u16..=10000u16, DISPUTE_QUORUM..7),
    ) {
        let kind = TaskKind::FixedPayment;
        let mut market = funded_market(250, 100, bps.len());
        let task_id = market.create_task(creator(), kind, "Vote", "", START + 86_400).unwrap();
        market.add_worker(creator(), kind, task_id, worker(), reward).unwrap();
        market.submit_proof_of_work(worker(), kind, task_id, "proof").unwrap();
        let dispute_id = market.file_dispute_by_worker(worker(), kind, task_id).unwrap();

        let shares: Vec<u64> = bps.iter().map(|b| share_of(reward, *b)).collect();
        for (i, share) in shares.iter().enumerate() {
            market.vote_on_dispute(admin(i), dispute_id, *share).unwrap();
        }
        let proposed = market.process_votes(admin(0), dispute_id).unwrap();

        prop_assert!(proposed >= *shares.iter().min().unwrap());
        prop_assert!(proposed <= *shares.iter().max().unwrap());
        prop_assert!(proposed <= reward);
        prop_assert_eq!(check_floor_mean(&shares, proposed), DisputeInvariantResult::Valid);
        prop_assert_eq!(
            market.resolver().get_dispute(dispute_id).unwrap().status,
            DisputeStatus::Resolved
        );

        // Processing closes the round: every voter may withdraw again
        for i in 0..shares.len() {
            market.withdraw_stake(admin(i)).unwrap();
            prop_assert_eq!(market.resolver().admin_status(&admin(i)), AdminStatus::Withdrawn);
        }
        prop_assert!(market.escrow_balanced());
    }

    /// An admin who has voted cannot withdraw until the round is processed
    #[test]
    fn fuzz_stake_locked_while_voting(share_bps in 0u16..=10000u16) {
        let kind = TaskKind::FixedPayment;
        let mut market = funded_market(250, 100, 1);
        let task_id = market.create_task(creator(), kind, "Lock", "", START + 86_400).unwrap();
        market.add_worker(creator(), kind, task_id, worker(), 10_000).unwrap();
        market.submit_proof_of_work(worker(), kind, task_id, "proof").unwrap();
        let dispute_id = market.file_dispute_by_worker(worker(), kind, task_id).unwrap();

        market.vote_on_dispute(admin(0), dispute_id, share_of(10_000, share_bps)).unwrap();
        prop_assert!(market.withdraw_stake(admin(0)).is_err());
        prop_assert_eq!(market.resolver().admin_stakes(&admin(0)), ADMIN_STAKE);
    }
}
