//! Cancel a task and refund the creator
//!
//! Milestones the creator already approved but has not paid are settled to
//! the worker first; only the rest of the escrow goes back.

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::TaskTerminated;
use crate::instructions::pay_task::settle_milestone;
use crate::ledger::{TaskRegistry, TxContext};
use crate::state::TaskStatus;

pub fn handler(registry: &mut TaskRegistry, ctx: &mut TxContext, task_id: u64) -> Result<()> {
    let task = registry.live_task(task_id)?;
    require_keys_eq!(ctx.signer, task.creator, MarketError::NotCreator);
    require!(
        task.status.can_transition_to(TaskStatus::Cancelled),
        MarketError::TaskNotCancellable
    );
    require!(
        !registry.has_open_dispute(task_id),
        MarketError::TaskUnderDispute
    );

    let owed: Vec<u32> = registry
        .get_all_milestones(task_id)
        .iter()
        .enumerate()
        .filter(|(_, m)| m.approved && !m.paid)
        .map(|(i, _)| i as u32)
        .collect();

    registry.task_mut(task_id)?.transition(TaskStatus::Cancelled)?;

    if !owed.is_empty() {
        let worker = registry.worker(task_id)?;
        for index in owed {
            settle_milestone(registry, ctx, task_id, index, worker)?;
        }
    }

    // Pending proofs stay behind as history; nothing can act on them now
    let refunded = registry.refund_remaining(ctx, task_id)?;
    msg!("Task {} cancelled, refunded {}", task_id, refunded);

    ctx.emit(TaskTerminated {
        registry: registry.address,
        task_id,
        refunded,
        timestamp: ctx.now,
    });

    Ok(())
}
