//! Creator approval of submitted work

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::{MilestoneApproved, ProofOfWorkApproved, TaskCompleted};
use crate::ledger::{TaskRegistry, TxContext};
use crate::state::{DisputeSubject, TaskStatus};

fn require_creator_can_approve(registry: &TaskRegistry, ctx: &TxContext, task_id: u64) -> Result<()> {
    let task = registry.live_task(task_id)?;
    require_keys_eq!(ctx.signer, task.creator, MarketError::NotCreator);
    require!(
        task.status == TaskStatus::InProgress,
        MarketError::TaskNotInProgress
    );
    Ok(())
}

/// Approve a whole-task proof; the task moves to Completed.
pub fn handler(
    registry: &mut TaskRegistry,
    ctx: &mut TxContext,
    task_id: u64,
    worker: Pubkey,
) -> Result<()> {
    registry.require_kind(!registry.kind.pays_by_milestone())?;
    require_creator_can_approve(registry, ctx, task_id)?;
    registry.require_not_disputed(&DisputeSubject::task(task_id))?;

    let proof = registry
        .work_proofs
        .get_mut(&(task_id, worker))
        .ok_or(MarketError::ProofNotFound)?;
    require!(!proof.approved, MarketError::ProofAlreadyApproved);
    proof.approved = true;

    registry.task_mut(task_id)?.transition(TaskStatus::Completed)?;

    ctx.emit(ProofOfWorkApproved {
        registry: registry.address,
        task_id,
        worker,
        timestamp: ctx.now,
    });
    ctx.emit(TaskCompleted {
        registry: registry.address,
        task_id,
        refunded: 0,
        timestamp: ctx.now,
    });

    Ok(())
}

/// Approve a milestone; the task stays InProgress until `complete_task`.
pub fn milestone_handler(
    registry: &mut TaskRegistry,
    ctx: &mut TxContext,
    task_id: u64,
    index: u32,
) -> Result<()> {
    registry.require_kind(registry.kind.pays_by_milestone())?;
    require_creator_can_approve(registry, ctx, task_id)?;
    registry.require_not_disputed(&DisputeSubject::milestone(task_id, index))?;

    let milestone = registry.milestone_mut(task_id, index)?;
    require!(!milestone.approved, MarketError::MilestoneAlreadyApproved);
    let proof = milestone.proof.as_mut().ok_or(MarketError::ProofNotFound)?;
    proof.approved = true;
    milestone.approved = true;

    ctx.emit(MilestoneApproved {
        registry: registry.address,
        task_id,
        index,
        timestamp: ctx.now,
    });

    Ok(())
}
