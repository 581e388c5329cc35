//! Record types and status machines for the task market

use anchor_lang::prelude::*;

// ============================================================================
// Size Constants
// ============================================================================

/// Maximum task title length in characters
pub const MAX_TITLE_LEN: usize = 128;

/// Maximum task, bid and milestone description length in characters
pub const MAX_DESCRIPTION_LEN: usize = 2048;

/// Maximum proof-of-work content length in characters
pub const MAX_PROOF_LEN: usize = 4096;

/// Maximum profile name length
pub const MAX_NAME_LEN: usize = 64;

/// Maximum email / website length
pub const MAX_CONTACT_LEN: usize = 128;

/// Maximum profile bio length
pub const MAX_BIO_LEN: usize = 1024;

/// Maximum number of skills on a profile
pub const MAX_SKILLS: usize = 20;

/// Maximum length of a single skill tag
pub const MAX_SKILL_LEN: usize = 32;

/// Task registry variant.
///
/// All variants share the [`TaskStatus`] machine and differ only in how the
/// worker is bound and how the reward is paid out:
///
/// | Variant        | Worker binding            | Payout granularity      |
/// |----------------|---------------------------|-------------------------|
/// | `Bidding`      | creator accepts a bid     | whole task              |
/// | `FixedPayment` | creator adds a worker     | whole task              |
/// | `Milestone`    | creator adds a worker     | per approved milestone  |
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TaskKind {
    #[default]
    Bidding,
    FixedPayment,
    Milestone,
}

impl TaskKind {
    pub const ALL: [TaskKind; 3] = [TaskKind::Bidding, TaskKind::FixedPayment, TaskKind::Milestone];

    /// Position of this variant's registry inside the ledger.
    pub fn index(self) -> usize {
        match self {
            TaskKind::Bidding => 0,
            TaskKind::FixedPayment => 1,
            TaskKind::Milestone => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TaskKind::Bidding => "BiddingTask",
            TaskKind::FixedPayment => "FixedPaymentTask",
            TaskKind::Milestone => "MilestonePaymentTask",
        }
    }

    /// Whether workers are bound by accepting a bid.
    pub fn binds_by_bid(self) -> bool {
        matches!(self, TaskKind::Bidding)
    }

    /// Whether the reward is split into milestones.
    pub fn pays_by_milestone(self) -> bool {
        matches!(self, TaskKind::Milestone)
    }
}

/// Task status.
///
/// Discriminant order matches the read surface: 0 Open, 1 InProgress,
/// 2 Completed, 3 Paid, 4 Cancelled.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TaskStatus {
    #[default]
    Open,
    InProgress,
    Completed,
    Paid,
    Cancelled,
}

impl TaskStatus {
    /// Validates whether a status transition is allowed.
    ///
    /// Valid transitions:
    /// - Open → InProgress (worker bound)
    /// - Open → Cancelled, InProgress → Cancelled (creator terminates)
    /// - InProgress → Completed (proof approved / all milestones approved)
    /// - Completed → Paid (reward paid out)
    ///
    /// Paid and Cancelled are terminal.
    pub fn can_transition_to(&self, new_status: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, new_status),
            (Open, InProgress)
                | (Open, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
                | (Completed, Paid)
        )
    }

    pub fn is_final(&self) -> bool {
        matches!(self, TaskStatus::Paid | TaskStatus::Cancelled)
    }

    /// Deadline and reward may still be amended.
    pub fn is_amendable(&self) -> bool {
        matches!(
            self,
            TaskStatus::Open | TaskStatus::InProgress | TaskStatus::Completed
        )
    }
}

/// A unit of paid work
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub id: u64,
    pub creator: Pubkey,
    pub title: String,
    pub description: String,
    /// Total reward escrowed for this task
    pub total_reward: u64,
    pub deadline: i64,
    pub status: TaskStatus,
    pub created_at: i64,
}

impl Task {
    /// Move to `new_status`, rejecting transitions outside the lifecycle DAG.
    pub fn transition(&mut self, new_status: TaskStatus) -> Result<()> {
        require!(
            self.status.can_transition_to(new_status),
            crate::errors::MarketError::InvalidStatusTransition
        );
        self.status = new_status;
        Ok(())
    }
}

/// Escrow ledger for a single task.
///
/// `deposited` only grows; `released` only grows and never exceeds
/// `deposited`. Tokens held for the task are `deposited - released`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TaskEscrow {
    pub deposited: u64,
    pub released: u64,
}

impl TaskEscrow {
    pub fn remaining(&self) -> u64 {
        self.deposited.saturating_sub(self.released)
    }
}

/// A bid on a bidding task. Immutable once submitted.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Bid {
    pub bidder: Pubkey,
    pub amount: u64,
    pub description: String,
    /// Estimated time to deliver, in seconds
    pub estimated_time: u64,
    pub submitted_at: i64,
}

/// Worker-submitted evidence of completion
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct WorkProof {
    pub content: String,
    pub submitted_at: i64,
    pub approved: bool,
}

/// A sub-unit of a milestone task with its own approval/payment cycle
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Milestone {
    pub description: String,
    pub reward: u64,
    pub proof: Option<WorkProof>,
    pub approved: bool,
    pub paid: bool,
}

impl Milestone {
    pub fn proof_submitted(&self) -> bool {
        self.proof.is_some()
    }
}

/// Dispute status.
///
/// Discriminant order matches the read surface: 0 Filed, 1 Resolved,
/// 2 Distributed.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DisputeStatus {
    #[default]
    Filed,
    Resolved,
    Distributed,
}

impl DisputeStatus {
    /// Filed → Resolved (votes processed), Resolved → Distributed (funds
    /// moved), Resolved → Filed (proposal rejected, new vote round).
    pub fn can_transition_to(&self, new_status: DisputeStatus) -> bool {
        use DisputeStatus::*;
        matches!(
            (self, new_status),
            (Filed, Resolved) | (Resolved, Distributed) | (Resolved, Filed)
        )
    }
}

/// What a dispute is about: a whole task, or one milestone of a task.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DisputeSubject {
    pub task_id: u64,
    pub milestone_index: Option<u32>,
}

impl DisputeSubject {
    pub fn task(task_id: u64) -> Self {
        Self {
            task_id,
            milestone_index: None,
        }
    }

    pub fn milestone(task_id: u64, index: u32) -> Self {
        Self {
            task_id,
            milestone_index: Some(index),
        }
    }
}

/// A single admin vote: the share of the disputed reward the worker should get
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisputeVote {
    pub admin: Pubkey,
    pub worker_share: u64,
    pub voted_at: i64,
}

/// An escalation filed by a worker against a task creator
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Dispute {
    pub id: u64,
    pub task_id: u64,
    pub milestone_index: Option<u32>,
    /// Address of the registry the task lives in
    pub task_contract: Pubkey,
    pub worker: Pubkey,
    pub task_creator: Pubkey,
    /// Reward snapshot taken when the dispute was filed
    pub reward_amount: u64,
    pub status: DisputeStatus,
    pub filed_at: i64,
    pub resolved_at: i64,
    /// Votes of the current round
    pub votes: Vec<DisputeVote>,
    /// Number of rejected proposals so far
    pub round: u32,
}

impl Dispute {
    pub fn subject(&self) -> DisputeSubject {
        DisputeSubject {
            task_id: self.task_id,
            milestone_index: self.milestone_index,
        }
    }

    pub fn has_voted(&self, admin: &Pubkey) -> bool {
        self.votes.iter().any(|v| v.admin == *admin)
    }

    pub fn is_party(&self, key: &Pubkey) -> bool {
        *key == self.worker || *key == self.task_creator
    }

    pub fn transition(&mut self, new_status: DisputeStatus) -> Result<()> {
        require!(
            self.status.can_transition_to(new_status),
            crate::errors::MarketError::InvalidStatusTransition
        );
        self.status = new_status;
        Ok(())
    }
}

/// Averaged vote outcome pending approval by both parties
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DistributionProposal {
    pub worker_share: u64,
    pub worker_approved: bool,
    pub creator_approved: bool,
}

impl DistributionProposal {
    pub fn fully_approved(&self) -> bool {
        self.worker_approved && self.creator_approved
    }
}

/// Admin stake status.
///
/// Discriminant order matches the read surface, where 1 means Active.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum AdminStatus {
    #[default]
    None,
    Active,
    Staked,
    Withdrawn,
}

/// Per-address admin stake
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct AdminStake {
    pub amount: u64,
    pub status: AdminStatus,
    /// Votes cast in rounds that have not been processed yet
    pub active_dispute_votes: u32,
    pub last_staked_at: i64,
}

/// User profile. No cross-entity invariants.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub bio: String,
    pub website: String,
    pub skills: Vec<String>,
    pub exists: bool,
    pub registered_at: i64,
}
