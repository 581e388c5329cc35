//! Submit a bid on an open bidding task
//!
//! Bids are append-only: a bidder who bids again gets a new entry.

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::BidSubmitted;
use crate::ledger::{TaskRegistry, TxContext};
use crate::state::{Bid, TaskStatus, MAX_DESCRIPTION_LEN};
use crate::utils::validation::require_text;

pub fn handler(
    registry: &mut TaskRegistry,
    ctx: &mut TxContext,
    task_id: u64,
    amount: u64,
    description: String,
    estimated_time: u64,
) -> Result<u64> {
    registry.require_kind(registry.kind.binds_by_bid())?;
    let task = registry.live_task(task_id)?;
    require!(task.status == TaskStatus::Open, MarketError::TaskNotOpen);
    require!(ctx.now <= task.deadline, MarketError::DeadlineExceeded);
    require!(ctx.signer != task.creator, MarketError::CreatorCannotBid);
    require!(amount > 0, MarketError::InvalidAmount);
    require_text(&description, MAX_DESCRIPTION_LEN, true)?;

    let bids = registry.bids.entry(task_id).or_default();
    let bid_index = bids.len() as u64;
    bids.push(Bid {
        bidder: ctx.signer,
        amount,
        description,
        estimated_time,
        submitted_at: ctx.now,
    });

    ctx.emit(BidSubmitted {
        registry: registry.address,
        task_id,
        bid_index,
        bidder: ctx.signer,
        amount,
        timestamp: ctx.now,
    });

    Ok(bid_index)
}
