//! Bind a worker directly (fixed-payment and milestone tasks)
//!
//! Pulls `reward` from the creator into escrow. For milestone tasks this
//! reward is the budget that milestones are later allocated from.

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::WorkerAdded;
use crate::instructions::token_helpers::pull_into_escrow;
use crate::ledger::{TaskRegistry, TxContext};
use crate::state::TaskStatus;

pub fn handler(
    registry: &mut TaskRegistry,
    ctx: &mut TxContext,
    task_id: u64,
    worker: Pubkey,
    reward: u64,
) -> Result<()> {
    registry.require_kind(!registry.kind.binds_by_bid())?;
    let task = registry.live_task(task_id)?;
    require_keys_eq!(ctx.signer, task.creator, MarketError::NotCreator);
    require!(
        registry.task_worker(task_id).is_none(),
        MarketError::WorkerAlreadyAssigned
    );
    require!(task.status == TaskStatus::Open, MarketError::TaskNotOpen);
    require!(
        worker != task.creator && worker != Pubkey::default(),
        MarketError::InvalidWorker
    );
    require!(reward > 0, MarketError::InvalidAmount);

    registry.workers.insert(task_id, worker);
    let task = registry.task_mut(task_id)?;
    task.transition(TaskStatus::InProgress)?;
    task.total_reward = task
        .total_reward
        .checked_add(reward)
        .ok_or(MarketError::ArithmeticOverflow)?;
    registry.record_deposit(task_id, reward)?;

    let creator = ctx.signer;
    pull_into_escrow(ctx, creator, registry.address, reward)?;

    ctx.emit(WorkerAdded {
        registry: registry.address,
        task_id,
        worker,
        reward,
        timestamp: ctx.now,
    });

    Ok(())
}
