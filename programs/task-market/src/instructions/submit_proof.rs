//! Submit proof of work for a task or a milestone
//!
//! A pending (unapproved) proof is overwritten by resubmission.

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::{MilestoneProofSubmitted, ProofOfWorkSubmitted};
use crate::ledger::{TaskRegistry, TxContext};
use crate::state::{DisputeSubject, TaskStatus, WorkProof, MAX_PROOF_LEN};
use crate::utils::validation::require_content;

/// Checks shared by both proof kinds: caller is the bound worker, the task is
/// in progress and the deadline has not passed.
fn require_worker_can_submit(registry: &TaskRegistry, ctx: &TxContext, task_id: u64) -> Result<()> {
    let task = registry.live_task(task_id)?;
    require!(
        registry.task_worker(task_id) == Some(ctx.signer),
        MarketError::NotWorker
    );
    require!(
        task.status == TaskStatus::InProgress,
        MarketError::TaskNotInProgress
    );
    require!(ctx.now <= task.deadline, MarketError::DeadlineExceeded);
    Ok(())
}

pub fn handler(
    registry: &mut TaskRegistry,
    ctx: &mut TxContext,
    task_id: u64,
    content: String,
) -> Result<()> {
    registry.require_kind(!registry.kind.pays_by_milestone())?;
    require_worker_can_submit(registry, ctx, task_id)?;
    registry.require_not_disputed(&DisputeSubject::task(task_id))?;
    require_content(&content, MAX_PROOF_LEN, true)?;

    let key = (task_id, ctx.signer);
    if let Some(existing) = registry.work_proofs.get(&key) {
        require!(!existing.approved, MarketError::ProofAlreadyApproved);
    }
    registry.work_proofs.insert(
        key,
        WorkProof {
            content,
            submitted_at: ctx.now,
            approved: false,
        },
    );

    ctx.emit(ProofOfWorkSubmitted {
        registry: registry.address,
        task_id,
        worker: ctx.signer,
        timestamp: ctx.now,
    });

    Ok(())
}

pub fn milestone_handler(
    registry: &mut TaskRegistry,
    ctx: &mut TxContext,
    task_id: u64,
    index: u32,
    content: String,
) -> Result<()> {
    registry.require_kind(registry.kind.pays_by_milestone())?;
    require_worker_can_submit(registry, ctx, task_id)?;
    registry.require_not_disputed(&DisputeSubject::milestone(task_id, index))?;
    require_content(&content, MAX_PROOF_LEN, true)?;

    let now = ctx.now;
    let milestone = registry.milestone_mut(task_id, index)?;
    require!(!milestone.approved, MarketError::MilestoneAlreadyApproved);
    milestone.proof = Some(WorkProof {
        content,
        submitted_at: now,
        approved: false,
    });

    ctx.emit(MilestoneProofSubmitted {
        registry: registry.address,
        task_id,
        index,
        worker: ctx.signer,
        timestamp: now,
    });

    Ok(())
}
