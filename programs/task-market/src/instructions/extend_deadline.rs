//! Push a task deadline forward

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::DeadlineExtended;
use crate::instructions::create_task::validate_deadline;
use crate::ledger::{TaskRegistry, TxContext};

pub fn handler(
    registry: &mut TaskRegistry,
    ctx: &mut TxContext,
    task_id: u64,
    new_deadline: i64,
) -> Result<()> {
    let task = registry.live_task(task_id)?;
    require_keys_eq!(ctx.signer, task.creator, MarketError::NotCreator);
    require!(task.status.is_amendable(), MarketError::TaskFinalized);
    let old_deadline = task.deadline;
    require!(new_deadline > old_deadline, MarketError::InvalidDeadline);
    validate_deadline(new_deadline, ctx.now, ctx.config.max_deadline_seconds)?;

    registry.task_mut(task_id)?.deadline = new_deadline;

    ctx.emit(DeadlineExtended {
        registry: registry.address,
        task_id,
        old_deadline,
        new_deadline,
        timestamp: ctx.now,
    });

    Ok(())
}
