//! Accept a bid: bind the bidder as worker and escrow the bid amount

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::BidAccepted;
use crate::instructions::token_helpers::pull_into_escrow;
use crate::ledger::{TaskRegistry, TxContext};
use crate::state::TaskStatus;

pub fn handler(
    registry: &mut TaskRegistry,
    ctx: &mut TxContext,
    task_id: u64,
    bid_index: u64,
) -> Result<()> {
    registry.require_kind(registry.kind.binds_by_bid())?;
    let task = registry.live_task(task_id)?;
    require_keys_eq!(ctx.signer, task.creator, MarketError::NotCreator);
    require!(
        registry.task_worker(task_id).is_none(),
        MarketError::WorkerAlreadyAssigned
    );
    require!(task.status == TaskStatus::Open, MarketError::TaskNotOpen);

    let bid = registry.get_bid(task_id, bid_index)?;
    let worker = bid.bidder;
    let amount = bid.amount;

    registry.workers.insert(task_id, worker);
    let task = registry.task_mut(task_id)?;
    task.transition(TaskStatus::InProgress)?;
    task.total_reward = task
        .total_reward
        .checked_add(amount)
        .ok_or(MarketError::ArithmeticOverflow)?;
    registry.record_deposit(task_id, amount)?;

    let creator = ctx.signer;
    pull_into_escrow(ctx, creator, registry.address, amount)?;

    ctx.emit(BidAccepted {
        registry: registry.address,
        task_id,
        bid_index,
        worker,
        amount,
        timestamp: ctx.now,
    });

    Ok(())
}
