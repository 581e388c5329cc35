//! Market invariant checking for fuzz testing
//!
//! Each check inspects a live [`Market`] (or a pair of observations of one)
//! and reports the first violation it finds.

use std::collections::HashSet;

use anchor_lang::prelude::Pubkey;
use task_market::{Dispute, DisputeStatus, Market, MarketEvent, TaskStatus};

/// Escrow invariant results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscrowInvariantResult {
    Valid,
    StoreBalanceMismatch,
    ReleasedExceedsDeposited { task_id: u64, deposited: u64, released: u64 },
    SupplyNotConserved { expected: u64, actual: u64 },
}

/// Task state machine invariant results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskInvariantResult {
    Valid,
    InvalidStateTransition { from: TaskStatus, to: TaskStatus },
    TerminalStateModified { status: TaskStatus },
}

/// Payout invariant results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayoutInvariantResult {
    Valid,
    PaidTwice { registry: Pubkey, task_id: u64, milestone: Option<u32> },
    DistributedTwice { dispute_id: u64 },
}

/// Dispute invariant results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisputeInvariantResult {
    Valid,
    InvalidStateTransition { from: DisputeStatus, to: DisputeStatus },
    DoubleVote { admin: Pubkey },
    PartyVoted { admin: Pubkey },
    ShareOutOfRange { share: u64, reward: u64 },
    NotFloorMean { expected: u64, actual: u64 },
    SplitMismatch { worker: u64, creator: u64, reward: u64 },
}

// ============================================================================
// Escrow invariants
// ============================================================================

/// Every store's token balance equals the sum its books say it holds.
pub fn check_escrow_balanced(market: &Market) -> EscrowInvariantResult {
    if !market.escrow_balanced() {
        return EscrowInvariantResult::StoreBalanceMismatch;
    }
    for registry in market.registries() {
        for task in registry.all_tasks() {
            let escrow = registry.escrow(task.id);
            if escrow.released > escrow.deposited {
                return EscrowInvariantResult::ReleasedExceedsDeposited {
                    task_id: task.id,
                    deposited: escrow.deposited,
                    released: escrow.released,
                };
            }
        }
    }
    EscrowInvariantResult::Valid
}

/// Tokens are only created by minting: balances always sum to the supply.
pub fn check_supply_conserved(market: &Market) -> EscrowInvariantResult {
    let token = market.token();
    let actual: u128 = token.holders().map(|(_, amount)| *amount as u128).sum();
    if actual != token.total_supply() as u128 {
        EscrowInvariantResult::SupplyNotConserved {
            expected: token.total_supply(),
            actual: actual.min(u64::MAX as u128) as u64,
        }
    } else {
        EscrowInvariantResult::Valid
    }
}

/// Escrow of a closed task is fully released.
pub fn check_closed_task_drained(market: &Market) -> EscrowInvariantResult {
    for registry in market.registries() {
        for task in registry.all_tasks().filter(|t| t.status.is_final()) {
            let escrow = registry.escrow(task.id);
            if escrow.remaining() != 0 {
                return EscrowInvariantResult::ReleasedExceedsDeposited {
                    task_id: task.id,
                    deposited: escrow.deposited,
                    released: escrow.released,
                };
            }
        }
    }
    EscrowInvariantResult::Valid
}

// ============================================================================
// Task state machine
// ============================================================================

/// A status observed before and after one call must be equal or one legal step apart.
pub fn check_task_transition(from: TaskStatus, to: TaskStatus) -> TaskInvariantResult {
    if from == to {
        return TaskInvariantResult::Valid;
    }
    if from.is_final() {
        return TaskInvariantResult::TerminalStateModified { status: from };
    }
    // Closing a fully paid milestone task goes Completed -> Paid in the same call
    let two_step = from == TaskStatus::InProgress && to == TaskStatus::Paid;
    if from.can_transition_to(to) || two_step {
        TaskInvariantResult::Valid
    } else {
        TaskInvariantResult::InvalidStateTransition { from, to }
    }
}

// ============================================================================
// Payouts
// ============================================================================

/// No task, milestone or dispute is paid out more than once.
pub fn check_single_payout(market: &Market) -> PayoutInvariantResult {
    let mut paid = HashSet::new();
    let mut distributed = HashSet::new();
    for event in market.events().iter() {
        match event {
            MarketEvent::TaskPaid(e) => {
                if !paid.insert((e.registry, e.task_id, None)) {
                    return PayoutInvariantResult::PaidTwice {
                        registry: e.registry,
                        task_id: e.task_id,
                        milestone: None,
                    };
                }
            }
            MarketEvent::MilestonePaid(e) => {
                if !paid.insert((e.registry, e.task_id, Some(e.index))) {
                    return PayoutInvariantResult::PaidTwice {
                        registry: e.registry,
                        task_id: e.task_id,
                        milestone: Some(e.index),
                    };
                }
            }
            MarketEvent::FundsDistributed(e) => {
                if !distributed.insert(e.dispute_id) {
                    return PayoutInvariantResult::DistributedTwice {
                        dispute_id: e.dispute_id,
                    };
                }
            }
            _ => {}
        }
    }
    PayoutInvariantResult::Valid
}

// ============================================================================
// Disputes
// ============================================================================

pub fn check_dispute_transition(from: DisputeStatus, to: DisputeStatus) -> DisputeInvariantResult {
    if from == to || from.can_transition_to(to) {
        DisputeInvariantResult::Valid
    } else {
        DisputeInvariantResult::InvalidStateTransition { from, to }
    }
}

/// Each admin votes at most once per round, never on their own dispute, and
/// never above the disputed reward.
pub fn check_votes(dispute: &Dispute) -> DisputeInvariantResult {
    let mut seen = HashSet::new();
    for vote in &dispute.votes {
        if !seen.insert(vote.admin) {
            return DisputeInvariantResult::DoubleVote { admin: vote.admin };
        }
        if dispute.is_party(&vote.admin) {
            return DisputeInvariantResult::PartyVoted { admin: vote.admin };
        }
        if vote.worker_share > dispute.reward_amount {
            return DisputeInvariantResult::ShareOutOfRange {
                share: vote.worker_share,
                reward: dispute.reward_amount,
            };
        }
    }
    DisputeInvariantResult::Valid
}

/// The proposed share is the floor of the mean of `shares`.
pub fn check_floor_mean(shares: &[u64], proposed: u64) -> DisputeInvariantResult {
    if shares.is_empty() {
        return DisputeInvariantResult::Valid;
    }
    let sum: u128 = shares.iter().map(|s| *s as u128).sum();
    let expected = (sum / shares.len() as u128) as u64;
    if expected != proposed {
        return DisputeInvariantResult::NotFloorMean {
            expected,
            actual: proposed,
        };
    }
    let min = shares.iter().copied().min().unwrap_or(0);
    let max = shares.iter().copied().max().unwrap_or(0);
    if proposed < min || proposed > max {
        return DisputeInvariantResult::NotFloorMean {
            expected,
            actual: proposed,
        };
    }
    DisputeInvariantResult::Valid
}

/// The two sides of a distribution add up to the disputed reward.
pub fn check_split(worker: u64, creator: u64, reward: u64) -> DisputeInvariantResult {
    if worker.checked_add(creator) == Some(reward) {
        DisputeInvariantResult::Valid
    } else {
        DisputeInvariantResult::SplitMismatch {
            worker,
            creator,
            reward,
        }
    }
}
