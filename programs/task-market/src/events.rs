//! Events emitted by the task market
//!
//! Every state transition appends one of these to the ledger's [`EventLog`].
//! Indexers consume them in the Anchor wire layout (8-byte discriminator
//! followed by the borsh body), see [`EventLog::encoded`].

use anchor_lang::prelude::*;

// ============================================================================
// Token events
// ============================================================================

/// Emitted when tokens move between accounts (including mints and escrow pulls)
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
}

/// Emitted when an allowance is set
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Approval {
    pub owner: Pubkey,
    pub spender: Pubkey,
    pub amount: u64,
}

// ============================================================================
// Task registry events
// ============================================================================

/// Emitted when a new task is created
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskCreated {
    pub registry: Pubkey,
    pub task_id: u64,
    pub creator: Pubkey,
    pub title: String,
    pub deadline: i64,
    pub timestamp: i64,
}

/// Emitted when a bid is appended to a bidding task
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BidSubmitted {
    pub registry: Pubkey,
    pub task_id: u64,
    pub bid_index: u64,
    pub bidder: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

/// Emitted when the creator accepts a bid and binds its bidder
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BidAccepted {
    pub registry: Pubkey,
    pub task_id: u64,
    pub bid_index: u64,
    pub worker: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

/// Emitted when the creator binds a worker directly
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerAdded {
    pub registry: Pubkey,
    pub task_id: u64,
    pub worker: Pubkey,
    pub reward: u64,
    pub timestamp: i64,
}

/// Emitted when a milestone is added to a milestone task
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MilestoneAdded {
    pub registry: Pubkey,
    pub task_id: u64,
    pub index: u32,
    pub reward: u64,
    pub timestamp: i64,
}

/// Emitted when the worker submits (or resubmits) proof for a whole task
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofOfWorkSubmitted {
    pub registry: Pubkey,
    pub task_id: u64,
    pub worker: Pubkey,
    pub timestamp: i64,
}

/// Emitted when the worker submits (or resubmits) proof for a milestone
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MilestoneProofSubmitted {
    pub registry: Pubkey,
    pub task_id: u64,
    pub index: u32,
    pub worker: Pubkey,
    pub timestamp: i64,
}

/// Emitted when the creator approves a whole-task proof
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofOfWorkApproved {
    pub registry: Pubkey,
    pub task_id: u64,
    pub worker: Pubkey,
    pub timestamp: i64,
}

/// Emitted when the creator approves a milestone
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MilestoneApproved {
    pub registry: Pubkey,
    pub task_id: u64,
    pub index: u32,
    pub timestamp: i64,
}

/// Emitted when a task reaches Completed
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskCompleted {
    pub registry: Pubkey,
    pub task_id: u64,
    /// Unallocated milestone budget returned to the creator
    pub refunded: u64,
    pub timestamp: i64,
}

/// Emitted when a whole task is paid out
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskPaid {
    pub registry: Pubkey,
    pub task_id: u64,
    pub worker: Pubkey,
    pub worker_amount: u64,
    pub platform_fee: u64,
    pub timestamp: i64,
}

/// Emitted when a single milestone is paid out
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MilestonePaid {
    pub registry: Pubkey,
    pub task_id: u64,
    pub index: u32,
    pub worker: Pubkey,
    pub worker_amount: u64,
    pub platform_fee: u64,
    pub timestamp: i64,
}

/// Emitted when the creator cancels a task
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskTerminated {
    pub registry: Pubkey,
    pub task_id: u64,
    pub refunded: u64,
    pub timestamp: i64,
}

/// Emitted when the creator pushes a deadline forward
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeadlineExtended {
    pub registry: Pubkey,
    pub task_id: u64,
    pub old_deadline: i64,
    pub new_deadline: i64,
    pub timestamp: i64,
}

/// Emitted when the creator escrows additional reward
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewardIncreased {
    pub registry: Pubkey,
    pub task_id: u64,
    pub amount: u64,
    pub total_reward: u64,
    pub timestamp: i64,
}

// ============================================================================
// Dispute resolver events
// ============================================================================

/// Emitted when an address adds stake
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminStaked {
    pub admin: Pubkey,
    pub amount: u64,
    pub total_stake: u64,
    pub active: bool,
    pub timestamp: i64,
}

/// Emitted when an admin votes on a dispute
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminVoted {
    pub dispute_id: u64,
    pub admin: Pubkey,
    pub worker_share: u64,
    pub timestamp: i64,
}

/// Emitted when an admin withdraws their whole stake
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminWithdrawn {
    pub admin: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

/// Emitted when a worker escalates a task or milestone
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisputeFiled {
    pub dispute_id: u64,
    pub task_id: u64,
    pub milestone_index: Option<u32>,
    pub task_contract: Pubkey,
    pub worker: Pubkey,
    pub task_creator: Pubkey,
    pub reward_amount: u64,
    pub timestamp: i64,
}

/// Emitted when votes are processed into a distribution proposal
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisputeResolved {
    pub dispute_id: u64,
    pub worker_share: u64,
    pub votes: u32,
    pub timestamp: i64,
}

/// Emitted when the agreed split is paid out
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FundsDistributed {
    pub dispute_id: u64,
    pub worker: Pubkey,
    pub worker_share: u64,
    pub task_creator: Pubkey,
    pub creator_share: u64,
    pub timestamp: i64,
}

/// Emitted when the task creator approves the proposal
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalApprovedByCreator {
    pub dispute_id: u64,
    pub task_creator: Pubkey,
    pub timestamp: i64,
}

/// Emitted when the worker approves the proposal
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalApprovedByWorker {
    pub dispute_id: u64,
    pub worker: Pubkey,
    pub timestamp: i64,
}

/// Emitted when a party rejects the proposal and a new round opens
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalRejected {
    pub dispute_id: u64,
    pub rejected_by: Pubkey,
    pub processing_fee: u64,
    pub round: u32,
    pub timestamp: i64,
}

// ============================================================================
// User registry events
// ============================================================================

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRegistered {
    pub user: Pubkey,
    pub name: String,
    pub timestamp: i64,
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserProfileUpdated {
    pub user: Pubkey,
    pub timestamp: i64,
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserSkillsUpdated {
    pub user: Pubkey,
    pub skill_count: u32,
    pub timestamp: i64,
}

// ============================================================================
// Configuration events
// ============================================================================

/// Emitted when the platform fee is updated
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformFeeUpdated {
    pub old_fee_bps: u16,
    pub new_fee_bps: u16,
    pub updated_by: Pubkey,
    pub timestamp: i64,
}

/// Emitted when the admin stake threshold is updated
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminStakeAmountUpdated {
    pub old_amount: u64,
    pub new_amount: u64,
    pub updated_by: Pubkey,
    pub timestamp: i64,
}

/// Emitted when the rejection processing fee is updated
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisputeProcessingRewardUpdated {
    pub old_bps: u16,
    pub new_bps: u16,
    pub updated_by: Pubkey,
    pub timestamp: i64,
}

/// Emitted when market ownership changes hands
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnershipTransferred {
    pub previous_owner: Pubkey,
    pub new_owner: Pubkey,
    pub timestamp: i64,
}

macro_rules! market_events {
    ($($name:ident),* $(,)?) => {
        /// Any event the market can emit
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub enum MarketEvent {
            $($name($name),)*
        }

        impl MarketEvent {
            pub fn name(&self) -> &'static str {
                match self {
                    $(MarketEvent::$name(_) => stringify!($name),)*
                }
            }

            /// Discriminator-prefixed borsh encoding.
            pub fn data(&self) -> Vec<u8> {
                match self {
                    $(MarketEvent::$name(e) => anchor_lang::Event::data(e),)*
                }
            }
        }

        $(
            impl From<$name> for MarketEvent {
                fn from(e: $name) -> Self {
                    MarketEvent::$name(e)
                }
            }
        )*
    };
}

market_events!(
    Transfer,
    Approval,
    TaskCreated,
    BidSubmitted,
    BidAccepted,
    WorkerAdded,
    MilestoneAdded,
    ProofOfWorkSubmitted,
    MilestoneProofSubmitted,
    ProofOfWorkApproved,
    MilestoneApproved,
    TaskCompleted,
    TaskPaid,
    MilestonePaid,
    TaskTerminated,
    DeadlineExtended,
    RewardIncreased,
    AdminStaked,
    AdminVoted,
    AdminWithdrawn,
    DisputeFiled,
    DisputeResolved,
    FundsDistributed,
    ProposalApprovedByCreator,
    ProposalApprovedByWorker,
    ProposalRejected,
    UserRegistered,
    UserProfileUpdated,
    UserSkillsUpdated,
    PlatformFeeUpdated,
    AdminStakeAmountUpdated,
    DisputeProcessingRewardUpdated,
    OwnershipTransferred,
);

/// Append-only event log
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    records: Vec<MarketEvent>,
}

impl EventLog {
    pub fn push(&mut self, event: impl Into<MarketEvent>) {
        self.records.push(event.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarketEvent> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }

    pub fn last(&self) -> Option<&MarketEvent> {
        self.records.last()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.records.iter().map(MarketEvent::name).collect()
    }

    /// Every event in wire layout, oldest first.
    pub fn encoded(&self) -> Vec<Vec<u8>> {
        self.records.iter().map(MarketEvent::data).collect()
    }
}
