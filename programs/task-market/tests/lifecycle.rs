//! Task lifecycle across the three registry variants.

mod common;

use common::*;
use task_market::{MarketError, TaskKind, TaskStatus};

#[test]
fn test_fixed_payment_task_pays_worker_minus_platform_fee() {
    let mut market = setup();
    let kind = TaskKind::FixedPayment;
    let task_id = task_with_proof(&mut market, kind, 100);
    assert_eq!(task_id, 1);
    assert_eq!(market.balance_of(&creator()), 9_900);
    assert_eq!(market.balance_of(&market.registry(kind).address()), 100);

    market
        .approve_proof_of_work(creator(), kind, task_id, worker())
        .unwrap();
    assert_eq!(
        market.registry(kind).tasks(task_id).unwrap().status,
        TaskStatus::Completed
    );

    market.pay_task(worker(), kind, task_id).unwrap();
    assert_eq!(
        market.registry(kind).tasks(task_id).unwrap().status,
        TaskStatus::Paid
    );
    // 2.5% of 100 rounds down to 2
    assert_eq!(market.balance_of(&worker()), 10_098);
    assert_eq!(market.balance_of(&treasury()), 2);
    assert_eq!(market.registry(kind).escrow(task_id).remaining(), 0);
    assert_eq!(market.events().last().map(|e| e.name()), Some("TaskPaid"));
    assert!(market.escrow_balanced());
}

#[test]
fn test_task_is_paid_at_most_once() {
    let mut market = setup();
    let kind = TaskKind::FixedPayment;
    let task_id = task_with_proof(&mut market, kind, 100);
    market
        .approve_proof_of_work(creator(), kind, task_id, worker())
        .unwrap();
    market.pay_task(worker(), kind, task_id).unwrap();

    assert_err(
        market.pay_task(worker(), kind, task_id),
        MarketError::TaskFinalized,
    );
    assert_eq!(market.balance_of(&worker()), 10_098);
}

#[test]
fn test_proof_after_deadline_is_rejected() {
    let mut market = setup();
    let kind = TaskKind::FixedPayment;
    let task_id = market
        .create_task(creator(), kind, "Audit", "Check the escrow paths", START + DAY)
        .unwrap();
    market
        .add_worker(creator(), kind, task_id, worker(), 100)
        .unwrap();

    market.advance_clock(2 * DAY).unwrap();
    assert_err(
        market.submit_proof_of_work(worker(), kind, task_id, "late"),
        MarketError::DeadlineExceeded,
    );
}

#[test]
fn test_cancel_in_progress_task_refunds_creator_and_orphans_proof() {
    let mut market = setup();
    let kind = TaskKind::FixedPayment;
    let task_id = task_with_proof(&mut market, kind, 50);
    assert_eq!(market.balance_of(&creator()), 9_950);

    market.terminate_task(creator(), kind, task_id).unwrap();
    assert_eq!(
        market.registry(kind).tasks(task_id).unwrap().status,
        TaskStatus::Cancelled
    );
    assert_eq!(market.balance_of(&creator()), 10_000);
    assert!(market.registry(kind).task_work_proofs(task_id, &worker()).is_some());

    assert_err(
        market.approve_proof_of_work(creator(), kind, task_id, worker()),
        MarketError::TaskFinalized,
    );
    assert_err(
        market.pay_task(worker(), kind, task_id),
        MarketError::TaskFinalized,
    );
    assert_err(
        market.terminate_task(creator(), kind, task_id),
        MarketError::TaskFinalized,
    );
    assert!(market.escrow_balanced());
}

#[test]
fn test_cancel_settles_approved_milestones_before_refunding() {
    let mut market = setup();
    let kind = TaskKind::Milestone;
    let task_id = market
        .create_task(creator(), kind, "Wallet", "Two phases", START + 30 * DAY)
        .unwrap();
    market
        .add_worker(creator(), kind, task_id, worker(), 1_000)
        .unwrap();
    market.add_milestone(creator(), kind, task_id, "Design", 400).unwrap();
    market.add_milestone(creator(), kind, task_id, "Build", 500).unwrap();
    market
        .submit_milestone_proof_of_work(worker(), kind, task_id, 0, "design doc")
        .unwrap();
    market
        .submit_milestone_proof_of_work(worker(), kind, task_id, 1, "first build")
        .unwrap();
    market.approve_milestone(creator(), kind, task_id, 0).unwrap();

    market.terminate_task(creator(), kind, task_id).unwrap();

    // Approved milestone 0 is paid (400 less a 10 fee); pending milestone 1 is refunded
    assert_eq!(market.balance_of(&worker()), 10_390);
    assert_eq!(market.balance_of(&treasury()), 10);
    assert_eq!(market.balance_of(&creator()), 9_600);
    assert_eq!(market.registry(kind).escrow(task_id).remaining(), 0);

    let milestones = market.registry(kind).get_all_milestones(task_id);
    assert!(milestones[0].paid);
    assert!(!milestones[1].paid && !milestones[1].approved);
    assert_eq!(
        market.events().names().iter().rev().take(2).copied().collect::<Vec<_>>(),
        vec!["TaskTerminated", "MilestonePaid"]
    );

    assert_err(
        market.pay_milestone(worker(), kind, task_id, 0),
        MarketError::MilestoneAlreadyPaid,
    );
    assert_err(
        market.pay_milestone(worker(), kind, task_id, 1),
        MarketError::TaskFinalized,
    );
    assert!(market.escrow_balanced());
}

#[test]
fn test_store_addresses_cannot_sign() {
    let mut market = setup();
    let kind = TaskKind::FixedPayment;
    let task_id = task_with_proof(&mut market, kind, 500);
    let registry = market.registry(kind).address();
    let resolver = market.resolver().address();
    let thief = key(99);

    assert_err(market.transfer(registry, thief, 500), MarketError::StoreCannotSign);
    assert_err(
        market.approve(registry, thief, u64::MAX),
        MarketError::StoreCannotSign,
    );
    assert_err(
        market.transfer_from(registry, registry, thief, 500),
        MarketError::StoreCannotSign,
    );
    assert_err(market.stake(resolver, 1), MarketError::StoreCannotSign);
    let users = market.users().address();
    assert_err(
        market.create_task(users, kind, "Spoof", "", START + DAY),
        MarketError::StoreCannotSign,
    );
    assert_eq!(market.balance_of(&thief), 0);
    assert!(market.escrow_balanced());

    // The escrow is intact, so the honest payout still goes through
    market
        .approve_proof_of_work(creator(), kind, task_id, worker())
        .unwrap();
    market.pay_task(worker(), kind, task_id).unwrap();
    assert_eq!(market.balance_of(&worker()), 10_488);
}

#[test]
fn test_completed_task_cannot_be_cancelled() {
    let mut market = setup();
    let kind = TaskKind::FixedPayment;
    let task_id = task_with_proof(&mut market, kind, 100);
    market
        .approve_proof_of_work(creator(), kind, task_id, worker())
        .unwrap();

    assert_err(
        market.terminate_task(creator(), kind, task_id),
        MarketError::TaskNotCancellable,
    );
}

#[test]
fn test_only_creator_manages_task() {
    let mut market = setup();
    let kind = TaskKind::FixedPayment;
    let task_id = market
        .create_task(creator(), kind, "Docs", "", START + DAY)
        .unwrap();

    assert_err(
        market.add_worker(worker(), kind, task_id, worker(), 100),
        MarketError::NotCreator,
    );
    assert_err(
        market.terminate_task(worker(), kind, task_id),
        MarketError::NotCreator,
    );
    assert_err(
        market.add_worker(creator(), kind, task_id, creator(), 100),
        MarketError::InvalidWorker,
    );
    assert_err(
        market.submit_proof_of_work(worker(), kind, task_id, "early"),
        MarketError::NotWorker,
    );
}

#[test]
fn test_create_task_validates_input() {
    let mut market = setup();
    let kind = TaskKind::Bidding;

    assert_err(
        market.create_task(creator(), kind, "  ", "", START + DAY),
        MarketError::EmptyContent,
    );
    assert_err(
        market.create_task(creator(), kind, "Title\nwith newline", "", START + DAY),
        MarketError::InvalidStringInput,
    );
    assert_err(
        market.create_task(creator(), kind, "x".repeat(129), "", START + DAY),
        MarketError::StringTooLong,
    );
    assert_err(
        market.create_task(creator(), kind, "Past", "", START),
        MarketError::InvalidDeadline,
    );
    assert_eq!(market.registry(kind).task_counter(), 0);
}

#[test]
fn test_bidding_flow_binds_accepted_bidder() {
    let mut market = setup();
    let kind = TaskKind::Bidding;
    let task_id = market
        .create_task(creator(), kind, "Indexer", "Index task events", START + 7 * DAY)
        .unwrap();

    assert_err(
        market.submit_bid(creator(), kind, task_id, 100, "self", 1),
        MarketError::CreatorCannotBid,
    );
    assert_err(
        market.submit_bid(bidder(), kind, task_id, 0, "free", 1),
        MarketError::InvalidAmount,
    );

    assert_eq!(
        market.submit_bid(worker(), kind, task_id, 400, "two days", 2 * DAY as u64),
        Ok(0)
    );
    assert_eq!(
        market.submit_bid(bidder(), kind, task_id, 350, "three days", 3 * DAY as u64),
        Ok(1)
    );
    // Rebidding appends a new entry
    assert_eq!(
        market.submit_bid(bidder(), kind, task_id, 300, "cheaper", 3 * DAY as u64),
        Ok(2)
    );
    assert_eq!(market.registry(kind).get_bid_count(task_id), 3);
    assert_err(
        market.accept_bid(creator(), kind, task_id, 3),
        MarketError::BidNotFound,
    );

    market.accept_bid(creator(), kind, task_id, 2).unwrap();
    assert_eq!(market.registry(kind).task_worker(task_id), Some(bidder()));
    assert_eq!(market.registry(kind).tasks(task_id).unwrap().total_reward, 300);
    assert_eq!(market.balance_of(&creator()), 9_700);

    assert_err(
        market.submit_bid(worker(), kind, task_id, 200, "late", 1),
        MarketError::TaskNotOpen,
    );
    assert_err(
        market.accept_bid(creator(), kind, task_id, 0),
        MarketError::WorkerAlreadyAssigned,
    );

    market
        .submit_proof_of_work(bidder(), kind, task_id, "done")
        .unwrap();
    market
        .approve_proof_of_work(creator(), kind, task_id, bidder())
        .unwrap();
    market.pay_task(bidder(), kind, task_id).unwrap();

    // 2.5% of 300 is 7.5, rounded down
    assert_eq!(market.balance_of(&bidder()), 10_293);
    assert_eq!(market.balance_of(&treasury()), 7);
    assert!(market.escrow_balanced());
}

#[test]
fn test_variant_specific_operations_are_rejected_elsewhere() {
    let mut market = setup();
    let bidding = market
        .create_task(creator(), TaskKind::Bidding, "Bid me", "", START + DAY)
        .unwrap();
    let fixed = market
        .create_task(creator(), TaskKind::FixedPayment, "Fixed", "", START + DAY)
        .unwrap();

    assert_err(
        market.add_worker(creator(), TaskKind::Bidding, bidding, worker(), 10),
        MarketError::UnsupportedTaskKind,
    );
    assert_err(
        market.submit_bid(bidder(), TaskKind::FixedPayment, fixed, 10, "", 1),
        MarketError::UnsupportedTaskKind,
    );
    assert_err(
        market.add_milestone(creator(), TaskKind::FixedPayment, fixed, "Step", 10),
        MarketError::UnsupportedTaskKind,
    );
}

#[test]
fn test_registries_keep_separate_counters() {
    let mut market = setup();
    for kind in TaskKind::ALL {
        let id = market
            .create_task(creator(), kind, "First", "", START + DAY)
            .unwrap();
        assert_eq!(id, 1);
    }
    assert_eq!(
        market
            .create_task(creator(), TaskKind::Milestone, "Second", "", START + DAY)
            .unwrap(),
        2
    );
    assert_err(
        market.pay_task(worker(), TaskKind::FixedPayment, 9),
        MarketError::TaskNotFound,
    );
}

#[test]
fn test_milestone_task_pays_each_milestone_once() {
    let mut market = setup();
    let kind = TaskKind::Milestone;
    let task_id = market
        .create_task(creator(), kind, "Wallet", "Three phases", START + 30 * DAY)
        .unwrap();
    market
        .add_worker(creator(), kind, task_id, worker(), 1_000)
        .unwrap();

    assert_eq!(market.add_milestone(creator(), kind, task_id, "Design", 400), Ok(0));
    assert_eq!(market.add_milestone(creator(), kind, task_id, "Build", 500), Ok(1));
    assert_err(
        market.add_milestone(creator(), kind, task_id, "Polish", 200),
        MarketError::MilestoneBudgetExceeded,
    );

    assert_err(
        market.pay_milestone(worker(), kind, task_id, 0),
        MarketError::MilestoneNotApproved,
    );
    assert_err(
        market.approve_milestone(creator(), kind, task_id, 0),
        MarketError::ProofNotFound,
    );

    market
        .submit_milestone_proof_of_work(worker(), kind, task_id, 0, "design doc")
        .unwrap();
    market.approve_milestone(creator(), kind, task_id, 0).unwrap();
    market.pay_milestone(worker(), kind, task_id, 0).unwrap();
    // 400 less 10 fee
    assert_eq!(market.balance_of(&worker()), 10_390);
    assert_err(
        market.pay_milestone(worker(), kind, task_id, 0),
        MarketError::MilestoneAlreadyPaid,
    );
    assert_err(
        market.submit_milestone_proof_of_work(worker(), kind, task_id, 0, "again"),
        MarketError::MilestoneAlreadyApproved,
    );

    assert_err(
        market.complete_task(creator(), kind, task_id),
        MarketError::MilestonesIncomplete,
    );

    market
        .submit_milestone_proof_of_work(worker(), kind, task_id, 1, "release build")
        .unwrap();
    market.approve_milestone(creator(), kind, task_id, 1).unwrap();
    market.complete_task(creator(), kind, task_id).unwrap();
    // Unallocated 100 comes back on completion
    assert_eq!(market.balance_of(&creator()), 9_100);
    assert_eq!(
        market.registry(kind).tasks(task_id).unwrap().status,
        TaskStatus::Completed
    );

    market.pay_milestone(worker(), kind, task_id, 1).unwrap();
    assert_eq!(market.balance_of(&worker()), 10_878);
    assert_eq!(market.balance_of(&treasury()), 22);
    assert_eq!(
        market.registry(kind).tasks(task_id).unwrap().status,
        TaskStatus::Paid
    );
    assert_err(
        market.pay_milestone(worker(), kind, task_id, 1),
        MarketError::MilestoneAlreadyPaid,
    );
    assert_eq!(market.registry(kind).escrow(task_id).remaining(), 0);
    assert!(market.escrow_balanced());
}

#[test]
fn test_complete_after_all_milestones_paid_closes_task() {
    let mut market = setup();
    let kind = TaskKind::Milestone;
    let task_id = market
        .create_task(creator(), kind, "Single step", "", START + DAY)
        .unwrap();
    market
        .add_worker(creator(), kind, task_id, worker(), 1_000)
        .unwrap();
    market.add_milestone(creator(), kind, task_id, "Only", 1_000).unwrap();
    market
        .submit_milestone_proof_of_work(worker(), kind, task_id, 0, "done")
        .unwrap();
    market.approve_milestone(creator(), kind, task_id, 0).unwrap();
    market.pay_milestone(worker(), kind, task_id, 0).unwrap();

    market.complete_task(creator(), kind, task_id).unwrap();
    assert_eq!(
        market.registry(kind).tasks(task_id).unwrap().status,
        TaskStatus::Paid
    );
    assert!(market.escrow_balanced());
}

#[test]
fn test_complete_requires_milestones() {
    let mut market = setup();
    let kind = TaskKind::Milestone;
    let task_id = market
        .create_task(creator(), kind, "Empty", "", START + DAY)
        .unwrap();
    market
        .add_worker(creator(), kind, task_id, worker(), 100)
        .unwrap();

    assert_err(
        market.complete_task(creator(), kind, task_id),
        MarketError::NoMilestones,
    );
}

#[test]
fn test_extend_deadline_and_increase_reward() {
    let mut market = setup();
    let kind = TaskKind::FixedPayment;
    let task_id = market
        .create_task(creator(), kind, "Grow", "", START + DAY)
        .unwrap();

    market.increase_reward(creator(), kind, task_id, 200).unwrap();
    market
        .add_worker(creator(), kind, task_id, worker(), 100)
        .unwrap();
    assert_eq!(market.registry(kind).tasks(task_id).unwrap().total_reward, 300);
    assert_eq!(market.registry(kind).escrow(task_id).remaining(), 300);

    assert_err(
        market.extend_deadline(creator(), kind, task_id, START + DAY),
        MarketError::InvalidDeadline,
    );
    market
        .extend_deadline(creator(), kind, task_id, START + 3 * DAY)
        .unwrap();
    market.advance_clock(2 * DAY).unwrap();
    market
        .submit_proof_of_work(worker(), kind, task_id, "in time")
        .unwrap();
    market
        .approve_proof_of_work(creator(), kind, task_id, worker())
        .unwrap();
    market.pay_task(worker(), kind, task_id).unwrap();

    assert_eq!(market.balance_of(&worker()), 10_293);
    assert_err(
        market.increase_reward(creator(), kind, task_id, 1),
        MarketError::TaskFinalized,
    );
}

#[test]
fn test_failed_call_leaves_no_trace() {
    let mut market = setup();
    let kind = TaskKind::FixedPayment;
    let task_id = market
        .create_task(creator(), kind, "Too big", "", START + DAY)
        .unwrap();
    let events_before = market.events().len();

    assert_err(
        market.add_worker(creator(), kind, task_id, worker(), 20_000),
        MarketError::InsufficientBalance,
    );

    let registry = market.registry(kind);
    assert_eq!(registry.tasks(task_id).unwrap().status, TaskStatus::Open);
    assert_eq!(registry.tasks(task_id).unwrap().total_reward, 0);
    assert_eq!(registry.task_worker(task_id), None);
    assert_eq!(registry.escrow(task_id).remaining(), 0);
    assert_eq!(market.events().len(), events_before);
    assert_eq!(market.balance_of(&creator()), 10_000);
    assert!(market.escrow_balanced());
}

#[test]
fn test_platform_fee_update_applies_to_next_payout() {
    let mut market = setup();
    let kind = TaskKind::FixedPayment;

    assert_err(
        market.update_platform_fee(creator(), 500),
        MarketError::NotOwner,
    );
    assert_err(
        market.update_platform_fee(owner(), 1_001),
        MarketError::InvalidFeeBps,
    );
    market.update_platform_fee(owner(), 1_000).unwrap();
    assert_eq!(market.platform_fee(), 1_000);

    let task_id = task_with_proof(&mut market, kind, 100);
    market
        .approve_proof_of_work(creator(), kind, task_id, worker())
        .unwrap();
    market.pay_task(worker(), kind, task_id).unwrap();
    assert_eq!(market.balance_of(&worker()), 10_090);
    assert_eq!(market.balance_of(&treasury()), 10);
}

#[test]
fn test_ownership_transfer_moves_config_rights() {
    let mut market = setup();
    market.transfer_ownership(owner(), creator()).unwrap();

    assert_err(
        market.update_admin_stake_amount(owner(), 5),
        MarketError::NotOwner,
    );
    market.update_admin_stake_amount(creator(), 5).unwrap();
    assert_eq!(market.admin_stake_amount(), 5);
    market
        .update_dispute_processing_reward_bps(creator(), 250)
        .unwrap();
    assert_eq!(market.dispute_processing_reward_bps(), 250);

    // Mint authority follows ownership
    assert_eq!(market.token().owner(), creator());
    assert_err(market.mint(owner(), owner(), 1), MarketError::NotTokenOwner);
    market.mint(creator(), bidder(), 1).unwrap();
    assert_eq!(market.balance_of(&bidder()), 10_001);

    let registry = market.registry(TaskKind::Bidding).address();
    assert_err(
        market.transfer_ownership(creator(), registry),
        MarketError::StoreCannotSign,
    );
}

#[test]
fn test_clock_never_runs_backwards() {
    let mut market = setup();
    assert_err(market.set_clock(START - 1), MarketError::ClockWentBackwards);
    assert_err(market.advance_clock(-1), MarketError::ClockWentBackwards);
    assert_eq!(market.advance_clock(DAY), Ok(START + DAY));
}
