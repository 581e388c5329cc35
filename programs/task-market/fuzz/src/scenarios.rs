//! Fuzz scenarios that drive a real [`Market`] through its public operations
//!
//! Rejected calls are expected and reported as errors; only a broken
//! invariant is a failure.

use anchor_lang::prelude::Pubkey;
use task_market::{Market, MarketConfig, TaskKind, TaskStatus};

use crate::arbitrary::*;
use crate::invariants::*;

pub const START: i64 = 1_700_000_000;

/// Threshold used by the dispute scenarios
pub const ADMIN_STAKE: u64 = 1_000_000;

pub fn actor(n: u8) -> Pubkey {
    Pubkey::new_from_array([n; 32])
}

pub fn owner() -> Pubkey {
    actor(1)
}

pub fn treasury() -> Pubkey {
    actor(2)
}

pub fn creator() -> Pubkey {
    actor(10)
}

pub fn worker() -> Pubkey {
    actor(11)
}

pub fn admin(i: usize) -> Pubkey {
    actor(20 + i as u8)
}

/// Result of a simulated scenario
#[derive(Debug, Clone)]
pub enum SimulationResult {
    Success,
    Error(String),
    InvariantViolation(String),
}

impl SimulationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SimulationResult::Success)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SimulationResult::Error(_))
    }

    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, SimulationResult::InvariantViolation(_))
    }
}

macro_rules! ensure_valid {
    ($check:expr, $valid:path) => {
        match $check {
            $valid => {}
            other => return SimulationResult::InvariantViolation(format!("{:?}", other)),
        }
    };
}

/// Market at `START` with funded creator, worker and `admins` active admins.
pub fn funded_market(platform_fee_bps: u16, processing_bps: u16, admins: usize) -> Market {
    let config = MarketConfig {
        treasury: treasury(),
        platform_fee_bps,
        dispute_processing_reward_bps: processing_bps,
        admin_stake_amount: ADMIN_STAKE,
        ..MarketConfig::with_owner(owner())
    };
    let mut market = Market::new(config).expect("fuzz config is valid");
    market.set_clock(START).expect("clock starts at zero");

    let mut spenders: Vec<Pubkey> = market.registries().iter().map(|r| r.address()).collect();
    spenders.push(market.resolver().address());

    let actors: Vec<Pubkey> = [creator(), worker()]
        .into_iter()
        .chain((0..admins).map(admin))
        .collect();
    for who in actors {
        market.mint(owner(), who, ACTOR_FUNDING).expect("owner mints");
        for spender in &spenders {
            market.approve(who, *spender, u64::MAX).expect("approve");
        }
    }
    for i in 0..admins {
        market.stake_to_become_admin(admin(i)).expect("stake");
    }
    market
}

/// Checks every scenario runs after each call.
fn check_market(market: &Market) -> SimulationResult {
    ensure_valid!(check_escrow_balanced(market), EscrowInvariantResult::Valid);
    ensure_valid!(check_supply_conserved(market), EscrowInvariantResult::Valid);
    ensure_valid!(check_closed_task_drained(market), EscrowInvariantResult::Valid);
    ensure_valid!(check_single_payout(market), PayoutInvariantResult::Valid);
    SimulationResult::Success
}

/// A failed call must leave no events behind.
fn check_rollback(market: &Market, events_before: usize, ok: bool) -> SimulationResult {
    if !ok && market.events().len() != events_before {
        return SimulationResult::InvariantViolation(format!(
            "failed call left {} events",
            market.events().len() - events_before
        ));
    }
    SimulationResult::Success
}

// ============================================================================
// Whole-task lifecycle
// ============================================================================

pub fn simulate_task_lifecycle(input: &TaskLifecycleInput) -> SimulationResult {
    let mut market = funded_market(input.platform_fee_bps, 100, 0);
    let kind = if input.by_bid {
        TaskKind::Bidding
    } else {
        TaskKind::FixedPayment
    };

    let task_id = match market.create_task(
        creator(),
        kind,
        "Fuzzed task",
        "",
        START + input.deadline_offset,
    ) {
        Ok(id) => id,
        Err(e) => return SimulationResult::Error(e.to_string()),
    };
    let bound = if input.by_bid {
        market
            .submit_bid(worker(), kind, task_id, input.reward, "bid", 1)
            .and_then(|index| market.accept_bid(creator(), kind, task_id, index))
    } else {
        market.add_worker(creator(), kind, task_id, worker(), input.reward)
    };
    if let Err(e) = bound {
        return SimulationResult::Error(e.to_string());
    }

    let mut rejected = 0usize;
    for action in &input.actions {
        let before = status_of(&market, kind, task_id);
        let events_before = market.events().len();
        let worker_before = market.balance_of(&worker());
        let escrow_before = market.registry(kind).escrow(task_id).remaining();

        let result = match *action {
            TaskAction::SubmitProof => {
                market.submit_proof_of_work(worker(), kind, task_id, "proof")
            }
            TaskAction::ApproveProof => {
                market.approve_proof_of_work(creator(), kind, task_id, worker())
            }
            TaskAction::Pay => market.pay_task(worker(), kind, task_id),
            TaskAction::Terminate => market.terminate_task(creator(), kind, task_id),
            TaskAction::AdvanceClock(step) => market.advance_clock(step).map(|_| ()),
            TaskAction::IncreaseReward(amount) => {
                market.increase_reward(creator(), kind, task_id, amount)
            }
            TaskAction::ExtendDeadline(step) => {
                let deadline = market.registry(kind).tasks(task_id).map(|t| t.deadline);
                match deadline {
                    Some(d) => market.extend_deadline(creator(), kind, task_id, d.saturating_add(step)),
                    None => Ok(()),
                }
            }
            TaskAction::FileDispute => market
                .file_dispute_by_worker(worker(), kind, task_id)
                .map(|_| ()),
        };
        if result.is_err() {
            rejected += 1;
        }

        let after = status_of(&market, kind, task_id);
        ensure_valid!(check_task_transition(before, after), TaskInvariantResult::Valid);
        let rollback = check_rollback(&market, events_before, result.is_ok());
        if rollback.is_invariant_violation() {
            return rollback;
        }
        let checked = check_market(&market);
        if checked.is_invariant_violation() {
            return checked;
        }

        // A successful pay moves exactly the escrow, less the fee, to the worker
        if *action == TaskAction::Pay && result.is_ok() {
            let paid = market.balance_of(&worker()) - worker_before;
            let fee = escrow_before as u128 * input.platform_fee_bps as u128 / 10_000;
            if paid as u128 + fee != escrow_before as u128 {
                return SimulationResult::InvariantViolation(format!(
                    "paid {} plus fee {} != escrow {}",
                    paid, fee, escrow_before
                ));
            }
        }
    }

    if rejected == input.actions.len() {
        SimulationResult::Error("every action was rejected".to_string())
    } else {
        SimulationResult::Success
    }
}

fn status_of(market: &Market, kind: TaskKind, task_id: u64) -> TaskStatus {
    market
        .registry(kind)
        .tasks(task_id)
        .map(|t| t.status)
        .unwrap_or_default()
}

// ============================================================================
// Milestone task
// ============================================================================

pub fn simulate_milestone_task(input: &MilestoneInput) -> SimulationResult {
    let kind = TaskKind::Milestone;
    let mut market = funded_market(input.platform_fee_bps, 100, 0);

    let task_id = match market.create_task(creator(), kind, "Milestones", "", START + 86_400) {
        Ok(id) => id,
        Err(e) => return SimulationResult::Error(e.to_string()),
    };
    if let Err(e) = market.add_worker(creator(), kind, task_id, worker(), input.budget) {
        return SimulationResult::Error(e.to_string());
    }
    for bps in &input.reward_bps {
        let reward = share_of(input.budget, *bps);
        // Overruns and zero rewards are rejected; the budget bound is checked below
        let _ = market.add_milestone(creator(), kind, task_id, "step", reward);
    }
    let allocated: u64 = market
        .registry(kind)
        .get_all_milestones(task_id)
        .iter()
        .map(|m| m.reward)
        .sum();
    if allocated > input.budget {
        return SimulationResult::InvariantViolation(format!(
            "milestones allocate {} of a {} budget",
            allocated, input.budget
        ));
    }

    for action in &input.actions {
        let before = status_of(&market, kind, task_id);
        let events_before = market.events().len();
        let result = match *action {
            MilestoneAction::SubmitProof(i) => {
                market.submit_milestone_proof_of_work(worker(), kind, task_id, i as u32, "proof")
            }
            MilestoneAction::Approve(i) => market.approve_milestone(creator(), kind, task_id, i as u32),
            MilestoneAction::Pay(i) => market.pay_milestone(worker(), kind, task_id, i as u32),
            MilestoneAction::Complete => market.complete_task(creator(), kind, task_id),
            MilestoneAction::Terminate => market.terminate_task(creator(), kind, task_id),
        };

        let after = status_of(&market, kind, task_id);
        ensure_valid!(check_task_transition(before, after), TaskInvariantResult::Valid);
        let rollback = check_rollback(&market, events_before, result.is_ok());
        if rollback.is_invariant_violation() {
            return rollback;
        }
        let checked = check_market(&market);
        if checked.is_invariant_violation() {
            return checked;
        }

        // Paid milestones must all be approved
        let unapproved_paid = market
            .registry(kind)
            .get_all_milestones(task_id)
            .iter()
            .any(|m| m.paid && !m.approved);
        if unapproved_paid {
            return SimulationResult::InvariantViolation("paid an unapproved milestone".to_string());
        }
    }
    SimulationResult::Success
}

// ============================================================================
// Dispute voting
// ============================================================================

/// File a whole-task dispute over `reward` on a fresh fixed-payment task.
fn file_dispute(market: &mut Market, reward: u64) -> Result<(u64, u64), SimulationResult> {
    let kind = TaskKind::FixedPayment;
    let filed = market
        .create_task(creator(), kind, "Disputed", "", START + 86_400)
        .and_then(|task_id| {
            market.add_worker(creator(), kind, task_id, worker(), reward)?;
            market.submit_proof_of_work(worker(), kind, task_id, "proof")?;
            let dispute_id = market.file_dispute_by_worker(worker(), kind, task_id)?;
            Ok((task_id, dispute_id))
        });
    filed.map_err(|e| SimulationResult::Error(e.to_string()))
}

pub fn simulate_vote_dispute(input: &VoteDisputeInput) -> SimulationResult {
    let admins = input.share_bps.len();
    let mut market = funded_market(250, 100, admins);
    let (_, dispute_id) = match file_dispute(&mut market, input.reward) {
        Ok(ids) => ids,
        Err(e) => return e,
    };

    let mut accepted = Vec::new();
    let mut voted = vec![false; admins];
    for (i, bps) in input.share_bps.iter().enumerate() {
        let share = share_of(input.reward, *bps);
        let result = market.vote_on_dispute(admin(i), dispute_id, share);
        match (result.is_ok(), share <= input.reward) {
            (true, true) => {
                accepted.push(share);
                voted[i] = true;
            }
            (false, false) => {}
            (ok, _) => {
                return SimulationResult::InvariantViolation(format!(
                    "vote of {} on reward {} accepted={}",
                    share, input.reward, ok
                ))
            }
        }
    }

    if let Some(i) = input.repeat_voter {
        let i = i as usize;
        if voted.get(i) == Some(&true) && market.vote_on_dispute(admin(i), dispute_id, 0).is_ok() {
            return SimulationResult::InvariantViolation(format!("admin {} voted twice", i));
        }
    }
    if input.party_votes {
        let staked = market.stake_to_become_admin(worker()).is_ok();
        if staked && market.vote_on_dispute(worker(), dispute_id, 0).is_ok() {
            return SimulationResult::InvariantViolation("worker judged own dispute".to_string());
        }
    }

    match market.resolver().get_dispute(dispute_id) {
        Some(dispute) => ensure_valid!(check_votes(dispute), DisputeInvariantResult::Valid),
        None => return SimulationResult::InvariantViolation("dispute vanished".to_string()),
    }

    let processed = match admins.checked_sub(1) {
        Some(last) => market.process_votes(admin(last), dispute_id),
        None => market.process_votes(worker(), dispute_id),
    };
    match processed {
        Ok(share) => {
            if accepted.len() < task_market::DISPUTE_QUORUM {
                return SimulationResult::InvariantViolation(format!(
                    "processed with {} votes",
                    accepted.len()
                ));
            }
            ensure_valid!(check_floor_mean(&accepted, share), DisputeInvariantResult::Valid);
        }
        Err(e) => {
            if accepted.len() >= task_market::DISPUTE_QUORUM {
                return SimulationResult::InvariantViolation(format!(
                    "quorum of {} not processed: {}",
                    accepted.len(),
                    e
                ));
            }
        }
    }
    check_market(&market)
}

// ============================================================================
// Dispute settlement
// ============================================================================

fn vote_round(market: &mut Market, dispute_id: u64, reward: u64, bps: &[u16; 3]) -> Result<u64, String> {
    for (i, b) in bps.iter().enumerate() {
        market
            .vote_on_dispute(admin(i), dispute_id, share_of(reward, *b))
            .map_err(|e| e.to_string())?;
    }
    market
        .process_votes(admin(0), dispute_id)
        .map_err(|e| e.to_string())
}

pub fn simulate_resolve_dispute(input: &ResolveDisputeInput) -> SimulationResult {
    let mut market = funded_market(250, input.processing_bps, 3);
    let (task_id, dispute_id) = match file_dispute(&mut market, input.reward) {
        Ok(ids) => ids,
        Err(e) => return e,
    };
    if input.late_top_up > 0
        && market
            .increase_reward(creator(), TaskKind::FixedPayment, task_id, input.late_top_up)
            .is_err()
    {
        return SimulationResult::Error("top up rejected".to_string());
    }

    let mut bps = input.first_round_bps;
    if let Some(by_worker) = input.rejection {
        if let Err(e) = vote_round(&mut market, dispute_id, input.reward, &bps) {
            return SimulationResult::Error(e);
        }
        let rejecter = if by_worker { worker() } else { creator() };
        let before = market.balance_of(&rejecter);
        if let Err(e) = market.reject_proposal(rejecter, dispute_id) {
            return SimulationResult::InvariantViolation(format!("party could not reject: {}", e));
        }
        let fee = share_of(input.reward, input.processing_bps);
        if before - market.balance_of(&rejecter) != fee {
            return SimulationResult::InvariantViolation("rejection fee mismatch".to_string());
        }
        let checked = check_market(&market);
        if checked.is_invariant_violation() {
            return checked;
        }
        bps = input.second_round_bps;
    }

    let share = match vote_round(&mut market, dispute_id, input.reward, &bps) {
        Ok(share) => share,
        Err(e) => return SimulationResult::Error(e),
    };
    let shares: Vec<u64> = bps.iter().map(|b| share_of(input.reward, *b)).collect();
    ensure_valid!(check_floor_mean(&shares, share), DisputeInvariantResult::Valid);

    if market.distribute_funds(creator(), dispute_id).is_ok() {
        return SimulationResult::InvariantViolation("distributed without approvals".to_string());
    }
    if market.approve_proposal(worker(), dispute_id).is_err()
        || market.approve_proposal(creator(), dispute_id).is_err()
    {
        return SimulationResult::InvariantViolation("party could not approve".to_string());
    }

    let worker_before = market.balance_of(&worker());
    let creator_before = market.balance_of(&creator());
    if let Err(e) = market.distribute_funds(admin(0), dispute_id) {
        return SimulationResult::InvariantViolation(format!("distribution failed: {}", e));
    }
    let worker_got = market.balance_of(&worker()) - worker_before;
    // The creator also gets back whatever was escrowed after filing
    let creator_got = market.balance_of(&creator()) - creator_before - input.late_top_up;
    if worker_got != share {
        return SimulationResult::InvariantViolation(format!(
            "worker got {} of proposed {}",
            worker_got, share
        ));
    }
    ensure_valid!(
        check_split(worker_got, creator_got, input.reward),
        DisputeInvariantResult::Valid
    );
    if market.distribute_funds(admin(0), dispute_id).is_ok() {
        return SimulationResult::InvariantViolation("distributed twice".to_string());
    }
    check_market(&market)
}
