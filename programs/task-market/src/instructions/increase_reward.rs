//! Escrow additional reward for a task

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::RewardIncreased;
use crate::instructions::token_helpers::pull_into_escrow;
use crate::ledger::{TaskRegistry, TxContext};

pub fn handler(
    registry: &mut TaskRegistry,
    ctx: &mut TxContext,
    task_id: u64,
    amount: u64,
) -> Result<()> {
    let task = registry.live_task(task_id)?;
    require_keys_eq!(ctx.signer, task.creator, MarketError::NotCreator);
    require!(task.status.is_amendable(), MarketError::TaskFinalized);
    require!(amount > 0, MarketError::InvalidAmount);

    let task = registry.task_mut(task_id)?;
    task.total_reward = task
        .total_reward
        .checked_add(amount)
        .ok_or(MarketError::ArithmeticOverflow)?;
    let total_reward = task.total_reward;
    registry.record_deposit(task_id, amount)?;

    let creator = ctx.signer;
    pull_into_escrow(ctx, creator, registry.address, amount)?;

    ctx.emit(RewardIncreased {
        registry: registry.address,
        task_id,
        amount,
        total_reward,
        timestamp: ctx.now,
    });

    Ok(())
}
