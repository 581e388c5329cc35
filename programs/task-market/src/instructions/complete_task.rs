//! Complete a milestone task once every milestone is approved
//!
//! Unallocated budget goes back to the creator. If every milestone was
//! already paid the task closes straight away.

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::TaskCompleted;
use crate::ledger::{TaskRegistry, TxContext};
use crate::state::TaskStatus;

pub fn handler(registry: &mut TaskRegistry, ctx: &mut TxContext, task_id: u64) -> Result<()> {
    registry.require_kind(registry.kind.pays_by_milestone())?;
    let task = registry.live_task(task_id)?;
    require_keys_eq!(ctx.signer, task.creator, MarketError::NotCreator);
    require!(
        task.status == TaskStatus::InProgress,
        MarketError::TaskNotInProgress
    );
    let total_reward = task.total_reward;

    let milestones = registry.get_all_milestones(task_id);
    require!(!milestones.is_empty(), MarketError::NoMilestones);
    require!(
        milestones.iter().all(|m| m.approved),
        MarketError::MilestonesIncomplete
    );

    let unallocated = total_reward
        .checked_sub(registry.allocated_milestone_rewards(task_id)?)
        .ok_or(MarketError::ArithmeticOverflow)?;

    registry.task_mut(task_id)?.transition(TaskStatus::Completed)?;

    let creator = ctx.signer;
    registry.pay_out(ctx, task_id, creator, unallocated)?;

    ctx.emit(TaskCompleted {
        registry: registry.address,
        task_id,
        refunded: unallocated,
        timestamp: ctx.now,
    });

    registry.close_if_fully_paid(ctx, task_id)
}
