//! Stake tokens toward admin voting rights
//!
//! Partial stakes accumulate with status Staked; once the stake reaches the
//! configured threshold the status becomes Active.

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::AdminStaked;
use crate::instructions::token_helpers::pull_into_escrow;
use crate::ledger::{DisputeResolver, TxContext};
use crate::state::AdminStatus;

/// Add `amount` to the caller's stake.
pub fn handler(resolver: &mut DisputeResolver, ctx: &mut TxContext, amount: u64) -> Result<()> {
    require!(amount > 0, MarketError::InvalidAmount);
    stake(resolver, ctx, amount)
}

/// Top the caller's stake up to the admin threshold.
pub fn to_threshold_handler(resolver: &mut DisputeResolver, ctx: &mut TxContext) -> Result<()> {
    let threshold = ctx.config.admin_stake_amount;
    require!(
        !resolver.admins.is_eligible(&ctx.signer, threshold),
        MarketError::AdminAlreadyActive
    );
    let current = resolver.admins.get(&ctx.signer).amount;
    stake(resolver, ctx, threshold.saturating_sub(current))
}

fn stake(resolver: &mut DisputeResolver, ctx: &mut TxContext, amount: u64) -> Result<()> {
    let admin = ctx.signer;
    let threshold = ctx.config.admin_stake_amount;

    let stake = resolver.admins.entry_mut(admin);
    stake.amount = stake
        .amount
        .checked_add(amount)
        .ok_or(MarketError::ArithmeticOverflow)?;
    stake.status = if stake.amount >= threshold {
        AdminStatus::Active
    } else {
        AdminStatus::Staked
    };
    stake.last_staked_at = ctx.now;
    let total_stake = stake.amount;
    let active = stake.status == AdminStatus::Active;

    pull_into_escrow(ctx, admin, resolver.address, amount)?;

    ctx.emit(AdminStaked {
        admin,
        amount,
        total_stake,
        active,
        timestamp: ctx.now,
    });

    Ok(())
}
