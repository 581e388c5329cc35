//! TaskRegistry: per-task state for one task variant
//!
//! The three variants share this store and the task state machine; the
//! [`TaskKind`] tag decides which binding and payout operations are allowed.

use anchor_lang::prelude::*;
use indexmap::IndexMap;

use crate::errors::MarketError;
use crate::events::{MilestonePaid, TaskPaid};
use crate::instructions::token_helpers::release_from_escrow;
use crate::ledger::{store_address, TaskSource, TxContext};
use crate::state::{
    Bid, DisputeSubject, Milestone, Task, TaskEscrow, TaskKind, TaskStatus, WorkProof,
};

#[derive(Clone, Debug)]
pub struct TaskRegistry {
    pub(crate) address: Pubkey,
    pub(crate) kind: TaskKind,
    pub(crate) task_counter: u64,
    pub(crate) tasks: IndexMap<u64, Task>,
    pub(crate) workers: IndexMap<u64, Pubkey>,
    pub(crate) bids: IndexMap<u64, Vec<Bid>>,
    /// (task id, worker) -> whole-task proof
    pub(crate) work_proofs: IndexMap<(u64, Pubkey), WorkProof>,
    pub(crate) milestones: IndexMap<u64, Vec<Milestone>>,
    pub(crate) escrows: IndexMap<u64, TaskEscrow>,
    /// Subjects with a dispute that has not been distributed yet
    pub(crate) open_disputes: IndexMap<DisputeSubject, u64>,
}

impl TaskRegistry {
    pub fn new(kind: TaskKind) -> Self {
        Self {
            address: store_address(&[b"registry", kind.name().as_bytes()]),
            kind,
            task_counter: 0,
            tasks: IndexMap::new(),
            workers: IndexMap::new(),
            bids: IndexMap::new(),
            work_proofs: IndexMap::new(),
            milestones: IndexMap::new(),
            escrows: IndexMap::new(),
            open_disputes: IndexMap::new(),
        }
    }

    pub fn address(&self) -> Pubkey {
        self.address
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn tasks(&self, task_id: u64) -> Option<&Task> {
        self.tasks.get(&task_id)
    }

    pub fn task_worker(&self, task_id: u64) -> Option<Pubkey> {
        self.workers.get(&task_id).copied()
    }

    pub fn task_work_proofs(&self, task_id: u64, worker: &Pubkey) -> Option<&WorkProof> {
        self.work_proofs.get(&(task_id, *worker))
    }

    pub fn get_all_bids(&self, task_id: u64) -> &[Bid] {
        self.bids.get(&task_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_bid(&self, task_id: u64, bid_index: u64) -> Result<&Bid> {
        usize::try_from(bid_index)
            .ok()
            .and_then(|i| self.get_all_bids(task_id).get(i))
            .ok_or_else(|| error!(MarketError::BidNotFound))
    }

    pub fn get_bid_count(&self, task_id: u64) -> u64 {
        self.get_all_bids(task_id).len() as u64
    }

    pub fn get_all_milestones(&self, task_id: u64) -> &[Milestone] {
        self.milestones
            .get(&task_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn task_counter(&self) -> u64 {
        self.task_counter
    }

    pub fn escrow(&self, task_id: u64) -> TaskEscrow {
        self.escrows.get(&task_id).copied().unwrap_or_default()
    }

    /// Id of the open dispute on `subject`, if any.
    pub fn open_dispute(&self, subject: &DisputeSubject) -> Option<u64> {
        self.open_disputes.get(subject).copied()
    }

    /// Tokens this registry should hold across all tasks.
    pub fn total_escrowed(&self) -> u64 {
        self.escrows.values().map(TaskEscrow::remaining).sum()
    }

    pub fn all_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    // ========================================================================
    // Handler helpers
    // ========================================================================

    pub(crate) fn require_kind(&self, allowed: bool) -> Result<()> {
        require!(allowed, MarketError::UnsupportedTaskKind);
        Ok(())
    }

    pub(crate) fn task(&self, task_id: u64) -> Result<&Task> {
        self.tasks
            .get(&task_id)
            .ok_or_else(|| error!(MarketError::TaskNotFound))
    }

    pub(crate) fn task_mut(&mut self, task_id: u64) -> Result<&mut Task> {
        self.tasks
            .get_mut(&task_id)
            .ok_or_else(|| error!(MarketError::TaskNotFound))
    }

    /// Task lookup for any mutating call: Paid and Cancelled tasks are frozen.
    pub(crate) fn live_task(&self, task_id: u64) -> Result<&Task> {
        let task = self.task(task_id)?;
        require!(!task.status.is_final(), MarketError::TaskFinalized);
        Ok(task)
    }

    pub(crate) fn milestone(&self, task_id: u64, index: u32) -> Result<&Milestone> {
        self.get_all_milestones(task_id)
            .get(index as usize)
            .ok_or_else(|| error!(MarketError::MilestoneNotFound))
    }

    pub(crate) fn milestone_mut(&mut self, task_id: u64, index: u32) -> Result<&mut Milestone> {
        self.milestones
            .get_mut(&task_id)
            .and_then(|m| m.get_mut(index as usize))
            .ok_or_else(|| error!(MarketError::MilestoneNotFound))
    }

    pub(crate) fn is_disputed(&self, subject: &DisputeSubject) -> bool {
        self.open_disputes.contains_key(subject)
    }

    pub(crate) fn has_open_dispute(&self, task_id: u64) -> bool {
        self.open_disputes.keys().any(|s| s.task_id == task_id)
    }

    pub(crate) fn require_not_disputed(&self, subject: &DisputeSubject) -> Result<()> {
        require!(!self.is_disputed(subject), MarketError::TaskUnderDispute);
        Ok(())
    }

    /// Bound worker of a task, failing if none.
    pub(crate) fn worker(&self, task_id: u64) -> Result<Pubkey> {
        self.task_worker(task_id)
            .ok_or_else(|| error!(MarketError::NoWorkerAssigned))
    }

    pub(crate) fn record_deposit(&mut self, task_id: u64, amount: u64) -> Result<()> {
        let escrow = self.escrows.entry(task_id).or_default();
        escrow.deposited = escrow
            .deposited
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;
        Ok(())
    }

    pub(crate) fn record_release(&mut self, task_id: u64, amount: u64) -> Result<()> {
        let escrow = self.escrows.entry(task_id).or_default();
        require!(
            escrow.remaining() >= amount,
            MarketError::InsufficientEscrowBalance
        );
        escrow.released = escrow
            .released
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Release `amount` of a task's escrow to `recipient`.
    pub(crate) fn pay_out(
        &mut self,
        ctx: &mut TxContext,
        task_id: u64,
        recipient: Pubkey,
        amount: u64,
    ) -> Result<()> {
        self.record_release(task_id, amount)?;
        release_from_escrow(ctx, self.address, recipient, amount)
    }

    /// Return whatever is left in a task's escrow to its creator.
    pub(crate) fn refund_remaining(&mut self, ctx: &mut TxContext, task_id: u64) -> Result<u64> {
        let creator = self.task(task_id)?.creator;
        let remaining = self.escrow(task_id).remaining();
        self.pay_out(ctx, task_id, creator, remaining)?;
        Ok(remaining)
    }

    pub(crate) fn all_milestones_paid(&self, task_id: u64) -> bool {
        self.get_all_milestones(task_id).iter().all(|m| m.paid)
    }

    pub(crate) fn allocated_milestone_rewards(&self, task_id: u64) -> Result<u64> {
        self.get_all_milestones(task_id)
            .iter()
            .try_fold(0u64, |acc, m| acc.checked_add(m.reward))
            .ok_or_else(|| error!(MarketError::ArithmeticOverflow))
    }

    /// Move a Completed milestone task whose milestones are all paid on to
    /// Paid, returning leftover escrow to the creator.
    pub(crate) fn close_if_fully_paid(&mut self, ctx: &mut TxContext, task_id: u64) -> Result<()> {
        if self.task(task_id)?.status == TaskStatus::Completed && self.all_milestones_paid(task_id) {
            self.task_mut(task_id)?.transition(TaskStatus::Paid)?;
            self.refund_remaining(ctx, task_id)?;
        }
        Ok(())
    }
}

impl TaskSource for TaskRegistry {
    fn address(&self) -> Pubkey {
        self.address
    }

    fn disputed_reward(&self, subject: &DisputeSubject) -> Result<u64> {
        match subject.milestone_index {
            Some(index) => Ok(self.milestone(subject.task_id, index)?.reward),
            None => {
                self.task(subject.task_id)?;
                Ok(self.escrow(subject.task_id).remaining())
            }
        }
    }

    fn payout_split(
        &mut self,
        ctx: &mut TxContext,
        subject: &DisputeSubject,
        worker_share: u64,
        creator_share: u64,
    ) -> Result<()> {
        require!(self.is_disputed(subject), MarketError::DisputeNotFound);
        let task_id = subject.task_id;
        let worker = self.worker(task_id)?;
        let creator = self.task(task_id)?.creator;

        // Effects before transfers
        self.open_disputes.shift_remove(subject);
        match subject.milestone_index {
            None => {
                let task = self.task_mut(task_id)?;
                task.transition(TaskStatus::Completed)?;
                task.transition(TaskStatus::Paid)?;
            }
            Some(index) => {
                let milestone = self.milestone_mut(task_id, index)?;
                require!(!milestone.paid, MarketError::MilestoneAlreadyPaid);
                milestone.approved = true;
                milestone.paid = true;
                if let Some(proof) = milestone.proof.as_mut() {
                    proof.approved = true;
                }
            }
        }

        self.pay_out(ctx, task_id, worker, worker_share)?;
        self.pay_out(ctx, task_id, creator, creator_share)?;

        let registry = self.address;
        let timestamp = ctx.now;
        match subject.milestone_index {
            None => {
                // Escrow added after filing goes back to the creator
                self.refund_remaining(ctx, task_id)?;
                ctx.emit(TaskPaid {
                    registry,
                    task_id,
                    worker,
                    worker_amount: worker_share,
                    platform_fee: 0,
                    timestamp,
                });
            }
            Some(index) => {
                ctx.emit(MilestonePaid {
                    registry,
                    task_id,
                    index,
                    worker,
                    worker_amount: worker_share,
                    platform_fee: 0,
                    timestamp,
                });
                self.close_if_fully_paid(ctx, task_id)?;
            }
        }
        Ok(())
    }
}
