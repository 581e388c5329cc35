//! Pay out a completed task or an approved milestone to the worker
//!
//! The paid flag / Paid status is written before any tokens move, so a
//! task or milestone is paid at most once.

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::{MilestonePaid, TaskPaid};
use crate::instructions::completion_helpers::calculate_reward_split;
use crate::ledger::{TaskRegistry, TxContext};
use crate::state::{DisputeSubject, TaskStatus};

pub fn handler(registry: &mut TaskRegistry, ctx: &mut TxContext, task_id: u64) -> Result<()> {
    registry.require_kind(!registry.kind.pays_by_milestone())?;
    let task = registry.live_task(task_id)?;
    let status = task.status;
    let worker = registry.worker(task_id)?;
    require_keys_eq!(ctx.signer, worker, MarketError::NotWorker);
    require!(status == TaskStatus::Completed, MarketError::TaskNotCompleted);
    registry.require_not_disputed(&DisputeSubject::task(task_id))?;

    let amount = registry.escrow(task_id).remaining();
    let (worker_amount, platform_fee) =
        calculate_reward_split(amount, ctx.config.platform_fee_bps)?;

    registry.task_mut(task_id)?.transition(TaskStatus::Paid)?;

    let treasury = ctx.config.treasury;
    registry.pay_out(ctx, task_id, worker, worker_amount)?;
    registry.pay_out(ctx, task_id, treasury, platform_fee)?;

    ctx.emit(TaskPaid {
        registry: registry.address,
        task_id,
        worker,
        worker_amount,
        platform_fee,
        timestamp: ctx.now,
    });

    Ok(())
}

pub fn milestone_handler(
    registry: &mut TaskRegistry,
    ctx: &mut TxContext,
    task_id: u64,
    index: u32,
) -> Result<()> {
    registry.require_kind(registry.kind.pays_by_milestone())?;
    registry.task(task_id)?;
    let milestone = registry.milestone(task_id, index)?;
    require!(!milestone.paid, MarketError::MilestoneAlreadyPaid);
    let approved = milestone.approved;

    let task = registry.live_task(task_id)?;
    let status = task.status;
    let worker = registry.worker(task_id)?;
    require_keys_eq!(ctx.signer, worker, MarketError::NotWorker);
    require!(
        matches!(status, TaskStatus::InProgress | TaskStatus::Completed),
        MarketError::TaskNotInProgress
    );
    require!(approved, MarketError::MilestoneNotApproved);
    registry.require_not_disputed(&DisputeSubject::milestone(task_id, index))?;

    settle_milestone(registry, ctx, task_id, index, worker)?;
    registry.close_if_fully_paid(ctx, task_id)
}

/// Pay an approved milestone's reward, less the platform fee, to `worker`
/// and mark it paid. Also used when a task is cancelled with approved work
/// still unpaid.
pub(crate) fn settle_milestone(
    registry: &mut TaskRegistry,
    ctx: &mut TxContext,
    task_id: u64,
    index: u32,
    worker: Pubkey,
) -> Result<()> {
    let reward = registry.milestone(task_id, index)?.reward;
    let (worker_amount, platform_fee) =
        calculate_reward_split(reward, ctx.config.platform_fee_bps)?;

    registry.milestone_mut(task_id, index)?.paid = true;

    let treasury = ctx.config.treasury;
    registry.pay_out(ctx, task_id, worker, worker_amount)?;
    registry.pay_out(ctx, task_id, treasury, platform_fee)?;

    ctx.emit(MilestonePaid {
        registry: registry.address,
        task_id,
        index,
        worker,
        worker_amount,
        platform_fee,
        timestamp: ctx.now,
    });
    Ok(())
}
