//! Shared helper functions for dispute resolution logic.
//!
//! Used by `process_votes` (vote aggregation) and `reject_proposal`
//! (processing fee).

use crate::errors::MarketError;
use crate::instructions::constants::BASIS_POINTS_DIVISOR;
use crate::state::DisputeVote;
use anchor_lang::prelude::*;

/// Floor of the mean worker share across `votes`.
///
/// Summed in `u128` so any number of `u64` shares fits.
pub fn floor_mean_share(votes: &[DisputeVote]) -> Result<u64> {
    require!(!votes.is_empty(), MarketError::InsufficientVotes);
    let sum: u128 = votes.iter().map(|v| v.worker_share as u128).sum();
    let mean = sum / votes.len() as u128;
    u64::try_from(mean).map_err(|_| error!(MarketError::ArithmeticOverflow))
}

/// Fee charged to the party rejecting a distribution proposal.
pub fn processing_fee(reward_amount: u64, processing_reward_bps: u16) -> Result<u64> {
    reward_amount
        .checked_mul(processing_reward_bps as u64)
        .ok_or(MarketError::ArithmeticOverflow)?
        .checked_div(BASIS_POINTS_DIVISOR)
        .ok_or_else(|| error!(MarketError::ArithmeticOverflow))
}

/// Split a processing fee equally among `voters`.
///
/// # Returns
/// * `(per_voter, remainder)` where the remainder goes to the treasury.
///   With no voters the whole fee is remainder.
pub fn split_processing_fee(fee: u64, voters: usize) -> Result<(u64, u64)> {
    if voters == 0 {
        return Ok((0, fee));
    }
    let voters = voters as u64;
    let per_voter = fee
        .checked_div(voters)
        .ok_or(MarketError::ArithmeticOverflow)?;
    let remainder = fee
        .checked_rem(voters)
        .ok_or(MarketError::ArithmeticOverflow)?;
    Ok((per_voter, remainder))
}
