//! Dispute filing, admin voting and proposal settlement.

mod common;

use anchor_lang::prelude::*;
use common::*;
use task_market::{AdminStatus, DisputeStatus, Market, MarketError, TaskKind, TaskStatus};

const FIXED: TaskKind = TaskKind::FixedPayment;

fn outsider() -> Pubkey {
    key(99)
}

/// Fixed-payment task with `reward` escrowed and a dispute filed on it.
fn disputed_task(market: &mut Market, reward: u64) -> (u64, u64) {
    let task_id = task_with_proof(market, FIXED, reward);
    let dispute_id = market.file_dispute_by_worker(worker(), FIXED, task_id).unwrap();
    (task_id, dispute_id)
}

fn vote_all(market: &mut Market, dispute_id: u64, shares: [u64; 3]) {
    for (admin, share) in admins().into_iter().zip(shares) {
        market.vote_on_dispute(admin, dispute_id, share).unwrap();
    }
}

fn approve_both(market: &mut Market, dispute_id: u64) {
    market.approve_proposal(worker(), dispute_id).unwrap();
    market.approve_proposal(creator(), dispute_id).unwrap();
}

#[test]
fn test_three_votes_resolve_to_floor_mean_and_distribute() {
    let mut market = setup_with_admins();
    let (task_id, dispute_id) = disputed_task(&mut market, 150);
    assert_eq!(dispute_id, 1);
    assert_eq!(market.resolver().get_dispute(dispute_id).unwrap().reward_amount, 150);

    vote_all(&mut market, dispute_id, [80, 90, 100]);
    assert_eq!(market.process_votes(admins()[0], dispute_id), Ok(90));
    assert_eq!(
        market.resolver().get_dispute(dispute_id).unwrap().status,
        DisputeStatus::Resolved
    );

    approve_both(&mut market, dispute_id);
    market.distribute_funds(outsider(), dispute_id).unwrap();

    assert_eq!(market.balance_of(&worker()), 10_090);
    assert_eq!(market.balance_of(&creator()), 9_910);
    // No platform fee on dispute payouts
    assert_eq!(market.balance_of(&treasury()), 0);
    assert_eq!(
        market.resolver().get_dispute(dispute_id).unwrap().status,
        DisputeStatus::Distributed
    );
    assert_eq!(
        market.registry(FIXED).tasks(task_id).unwrap().status,
        TaskStatus::Paid
    );
    assert_eq!(market.events().last().map(|e| e.name()), Some("FundsDistributed"));
    assert!(market.escrow_balanced());
}

#[test]
fn test_processing_needs_quorum_and_an_admin() {
    let mut market = setup_with_admins();
    let (_, dispute_id) = disputed_task(&mut market, 150);

    market.vote_on_dispute(admins()[0], dispute_id, 10).unwrap();
    market.vote_on_dispute(admins()[1], dispute_id, 20).unwrap();
    assert_err(
        market.process_votes(admins()[0], dispute_id),
        MarketError::InsufficientVotes,
    );

    market.vote_on_dispute(admins()[2], dispute_id, 31).unwrap();
    assert_err(
        market.process_votes(outsider(), dispute_id),
        MarketError::NotActiveAdmin,
    );
    // (10 + 20 + 31) / 3 rounds down
    assert_eq!(market.process_votes(admins()[2], dispute_id), Ok(20));
    assert_err(
        market.process_votes(admins()[2], dispute_id),
        MarketError::DisputeNotFiled,
    );
}

#[test]
fn test_vote_rules() {
    let mut market = setup_with_admins();
    let (_, dispute_id) = disputed_task(&mut market, 150);

    assert_err(
        market.vote_on_dispute(outsider(), dispute_id, 50),
        MarketError::NotActiveAdmin,
    );
    assert_err(
        market.vote_on_dispute(admins()[0], dispute_id, 151),
        MarketError::ShareOutOfRange,
    );
    market.vote_on_dispute(admins()[0], dispute_id, 150).unwrap();
    assert_err(
        market.vote_on_dispute(admins()[0], dispute_id, 0),
        MarketError::AlreadyVoted,
    );
    assert!(market.resolver().has_voted_on_dispute(&admins()[0], dispute_id));
    assert_err(
        market.vote_on_dispute(admins()[1], 42, 0),
        MarketError::DisputeNotFound,
    );

    // A staked party still may not judge their own dispute
    market.stake_to_become_admin(worker()).unwrap();
    assert_err(
        market.vote_on_dispute(worker(), dispute_id, 150),
        MarketError::AdminIsDisputeParty,
    );
}

#[test]
fn test_filing_requires_bound_worker_with_pending_proof() {
    let mut market = setup_with_admins();
    let task_id = market
        .create_task(creator(), FIXED, "No proof yet", "", START + DAY)
        .unwrap();
    market
        .add_worker(creator(), FIXED, task_id, worker(), 100)
        .unwrap();

    assert_err(
        market.file_dispute_by_worker(worker(), FIXED, task_id),
        MarketError::ProofNotFound,
    );
    assert_err(
        market.file_dispute_by_worker(bidder(), FIXED, task_id),
        MarketError::NotWorker,
    );

    market
        .submit_proof_of_work(worker(), FIXED, task_id, "proof")
        .unwrap();
    market
        .approve_proof_of_work(creator(), FIXED, task_id, worker())
        .unwrap();
    assert_err(
        market.file_dispute_by_worker(worker(), FIXED, task_id),
        MarketError::TaskNotInProgress,
    );
    assert_eq!(market.resolver().dispute_counter(), 0);
}

#[test]
fn test_disputed_task_is_locked() {
    let mut market = setup_with_admins();
    let (task_id, _) = disputed_task(&mut market, 150);

    assert_err(
        market.file_dispute_by_worker(worker(), FIXED, task_id),
        MarketError::DisputeAlreadyFiled,
    );
    assert_err(
        market.approve_proof_of_work(creator(), FIXED, task_id, worker()),
        MarketError::TaskUnderDispute,
    );
    assert_err(
        market.submit_proof_of_work(worker(), FIXED, task_id, "new proof"),
        MarketError::TaskUnderDispute,
    );
    assert_err(
        market.terminate_task(creator(), FIXED, task_id),
        MarketError::TaskUnderDispute,
    );
}

#[test]
fn test_distribution_needs_both_approvals_and_happens_once() {
    let mut market = setup_with_admins();
    let (_, dispute_id) = disputed_task(&mut market, 150);

    assert_err(
        market.approve_proposal(worker(), dispute_id),
        MarketError::DisputeNotResolved,
    );
    vote_all(&mut market, dispute_id, [80, 90, 100]);
    market.process_votes(admins()[0], dispute_id).unwrap();

    assert_err(
        market.approve_proposal(outsider(), dispute_id),
        MarketError::NotDisputeParty,
    );
    market.approve_proposal(worker(), dispute_id).unwrap();
    let events = market.events().len();
    // Approving again changes nothing
    market.approve_proposal(worker(), dispute_id).unwrap();
    assert_eq!(market.events().len(), events);

    assert_err(
        market.distribute_funds(outsider(), dispute_id),
        MarketError::ProposalNotApproved,
    );
    market.approve_proposal(creator(), dispute_id).unwrap();
    let proposal = *market.resolver().distribution_proposals(dispute_id).unwrap();
    assert!(proposal.worker_approved && proposal.creator_approved);

    market.distribute_funds(outsider(), dispute_id).unwrap();
    assert_err(
        market.distribute_funds(outsider(), dispute_id),
        MarketError::DisputeAlreadyDistributed,
    );
    assert_err(
        market.approve_proposal(creator(), dispute_id),
        MarketError::DisputeAlreadyDistributed,
    );
    assert_err(
        market.reject_proposal(creator(), dispute_id),
        MarketError::DisputeAlreadyDistributed,
    );
    assert_eq!(market.balance_of(&worker()), 10_090);
}

#[test]
fn test_rejection_charges_fee_and_opens_new_round() {
    let mut market = setup_with_admins();
    market
        .update_dispute_processing_reward_bps(owner(), 1_100)
        .unwrap();
    let (task_id, dispute_id) = disputed_task(&mut market, 150);
    vote_all(&mut market, dispute_id, [80, 90, 100]);
    market.process_votes(admins()[0], dispute_id).unwrap();

    assert_err(
        market.reject_proposal(outsider(), dispute_id),
        MarketError::NotDisputeParty,
    );
    market.reject_proposal(creator(), dispute_id).unwrap();

    // 11% of 150 is 16: 5 to each voter, 1 left for the treasury
    assert_eq!(market.balance_of(&creator()), 10_000 - 150 - 16);
    for admin in admins() {
        assert_eq!(market.balance_of(&admin), 4_005);
    }
    assert_eq!(market.balance_of(&treasury()), 1);

    let dispute = market.resolver().get_dispute(dispute_id).unwrap();
    assert_eq!(dispute.status, DisputeStatus::Filed);
    assert_eq!(dispute.round, 1);
    assert!(dispute.votes.is_empty());
    assert!(market.resolver().distribution_proposals(dispute_id).is_none());
    assert_eq!(market.events().last().map(|e| e.name()), Some("ProposalRejected"));

    // Fresh round: earlier voters vote again
    vote_all(&mut market, dispute_id, [150, 150, 150]);
    assert_eq!(market.process_votes(admins()[1], dispute_id), Ok(150));
    approve_both(&mut market, dispute_id);
    market.distribute_funds(worker(), dispute_id).unwrap();

    assert_eq!(market.balance_of(&worker()), 10_150);
    assert_eq!(market.balance_of(&creator()), 9_834);
    assert_eq!(market.registry(FIXED).escrow(task_id).remaining(), 0);
    assert!(market.escrow_balanced());
}

#[test]
fn test_reward_added_after_filing_returns_to_creator() {
    let mut market = setup_with_admins();
    let (task_id, dispute_id) = disputed_task(&mut market, 150);
    market.increase_reward(creator(), FIXED, task_id, 50).unwrap();

    vote_all(&mut market, dispute_id, [80, 90, 100]);
    market.process_votes(admins()[0], dispute_id).unwrap();
    approve_both(&mut market, dispute_id);
    market.distribute_funds(outsider(), dispute_id).unwrap();

    assert_eq!(market.balance_of(&worker()), 10_090);
    assert_eq!(market.balance_of(&creator()), 9_910);
    assert_eq!(market.registry(FIXED).escrow(task_id).remaining(), 0);
    assert!(market.escrow_balanced());
}

#[test]
fn test_milestone_dispute_settles_only_that_milestone() {
    let mut market = setup_with_admins();
    let kind = TaskKind::Milestone;
    let task_id = market
        .create_task(creator(), kind, "Two phases", "", START + 30 * DAY)
        .unwrap();
    market
        .add_worker(creator(), kind, task_id, worker(), 1_000)
        .unwrap();
    market.add_milestone(creator(), kind, task_id, "Phase one", 400).unwrap();
    market.add_milestone(creator(), kind, task_id, "Phase two", 600).unwrap();
    market
        .submit_milestone_proof_of_work(worker(), kind, task_id, 0, "phase one")
        .unwrap();

    assert_err(
        market.file_milestone_dispute_by_worker(worker(), kind, task_id, 1),
        MarketError::ProofNotFound,
    );
    let dispute_id = market
        .file_milestone_dispute_by_worker(worker(), kind, task_id, 0)
        .unwrap();
    let dispute = market.resolver().get_dispute(dispute_id).unwrap();
    assert_eq!(dispute.milestone_index, Some(0));
    assert_eq!(dispute.reward_amount, 400);

    assert_err(
        market.approve_milestone(creator(), kind, task_id, 0),
        MarketError::TaskUnderDispute,
    );
    assert_err(
        market.terminate_task(creator(), kind, task_id),
        MarketError::TaskUnderDispute,
    );

    vote_all(&mut market, dispute_id, [100, 200, 300]);
    assert_eq!(market.process_votes(admins()[0], dispute_id), Ok(200));
    approve_both(&mut market, dispute_id);
    market.distribute_funds(outsider(), dispute_id).unwrap();

    let milestone = &market.registry(kind).get_all_milestones(task_id)[0];
    assert!(milestone.approved && milestone.paid);
    assert_err(
        market.pay_milestone(worker(), kind, task_id, 0),
        MarketError::MilestoneAlreadyPaid,
    );

    // The other milestone follows the normal path
    market
        .submit_milestone_proof_of_work(worker(), kind, task_id, 1, "phase two")
        .unwrap();
    market.approve_milestone(creator(), kind, task_id, 1).unwrap();
    market.complete_task(creator(), kind, task_id).unwrap();
    market.pay_milestone(worker(), kind, task_id, 1).unwrap();

    assert_eq!(market.balance_of(&worker()), 10_000 + 200 + 585);
    assert_eq!(market.balance_of(&creator()), 10_000 - 1_000 + 200);
    assert_eq!(market.balance_of(&treasury()), 15);
    assert_eq!(
        market.registry(kind).tasks(task_id).unwrap().status,
        TaskStatus::Paid
    );
    assert!(market.escrow_balanced());
}

#[test]
fn test_stake_and_withdraw_rules() {
    let mut market = setup_with_admins();
    let (_, dispute_id) = disputed_task(&mut market, 150);
    let admin = admins()[0];

    assert_err(
        market.stake_to_become_admin(admin),
        MarketError::AdminAlreadyActive,
    );
    assert_eq!(market.resolver().admin_stakes(&admin), ADMIN_STAKE);

    market.vote_on_dispute(admin, dispute_id, 75).unwrap();
    assert_err(
        market.withdraw_stake(admin),
        MarketError::AdminHasActiveVotes,
    );

    vote_all_but(&mut market, dispute_id, admin);
    market.process_votes(admin, dispute_id).unwrap();

    market.withdraw_stake(admin).unwrap();
    assert_eq!(market.balance_of(&admin), 5_000);
    assert_eq!(market.resolver().admin_status(&admin), AdminStatus::Withdrawn);
    assert_err(market.withdraw_stake(admin), MarketError::AdminNotStaked);
    assert_err(
        market.process_votes(admin, dispute_id),
        MarketError::DisputeNotFiled,
    );
    assert!(market.escrow_balanced());
}

fn vote_all_but(market: &mut Market, dispute_id: u64, skip: Pubkey) {
    for admin in admins().into_iter().filter(|a| *a != skip) {
        market.vote_on_dispute(admin, dispute_id, 75).unwrap();
    }
}

#[test]
fn test_partial_stake_tops_up_to_threshold() {
    let mut market = setup();
    let admin = key(30);
    fund(&mut market, admin, 5_000);

    market.stake(admin, 400).unwrap();
    assert_eq!(market.resolver().admin_status(&admin), AdminStatus::Staked);
    assert!(!market.resolver().admins().is_eligible(&admin, ADMIN_STAKE));

    market.stake_to_become_admin(admin).unwrap();
    assert_eq!(market.resolver().admin_status(&admin), AdminStatus::Active);
    assert_eq!(market.resolver().admin_stakes(&admin), ADMIN_STAKE);
    assert_eq!(market.balance_of(&admin), 4_000);
    assert_err(market.stake(admin, 0), MarketError::InvalidAmount);
}

#[test]
fn test_raised_threshold_suspends_voting_until_top_up() {
    let mut market = setup_with_admins();
    let (_, dispute_id) = disputed_task(&mut market, 150);
    market.update_admin_stake_amount(owner(), 2 * ADMIN_STAKE).unwrap();

    let admin = admins()[0];
    assert_err(
        market.vote_on_dispute(admin, dispute_id, 10),
        MarketError::NotActiveAdmin,
    );
    market.stake_to_become_admin(admin).unwrap();
    assert_eq!(market.resolver().admin_stakes(&admin), 2 * ADMIN_STAKE);
    market.vote_on_dispute(admin, dispute_id, 10).unwrap();
}
