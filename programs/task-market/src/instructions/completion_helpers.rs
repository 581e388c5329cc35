//! Shared helper functions for task and milestone payouts.
//!
//! Used by `pay_task` for both whole-task and milestone payouts.

use crate::errors::MarketError;
use crate::instructions::constants::BASIS_POINTS_DIVISOR;
use anchor_lang::prelude::*;

/// Split a payout into the worker's amount and the platform fee.
///
/// The fee is `floor(amount * platform_fee_bps / 10000)`; the worker gets
/// the rest.
pub fn calculate_reward_split(amount: u64, platform_fee_bps: u16) -> Result<(u64, u64)> {
    let platform_fee = amount
        .checked_mul(platform_fee_bps as u64)
        .ok_or(MarketError::ArithmeticOverflow)?
        .checked_div(BASIS_POINTS_DIVISOR)
        .ok_or(MarketError::ArithmeticOverflow)?;

    let worker_reward = amount
        .checked_sub(platform_fee)
        .ok_or(MarketError::ArithmeticOverflow)?;

    Ok((worker_reward, platform_fee))
}
