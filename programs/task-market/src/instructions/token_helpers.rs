//! Shared token movement helpers for escrow-holding stores.
//!
//! A store (registry or resolver) holds escrow as the token balance of its own
//! address. Pulls go through the payer's allowance to that address.

use anchor_lang::prelude::*;

use crate::ledger::TxContext;

/// Pull `amount` from `payer` into the escrow held by `contract`.
///
/// The payer must have approved `contract` for at least `amount` beforehand.
pub fn pull_into_escrow(
    ctx: &mut TxContext,
    payer: Pubkey,
    contract: Pubkey,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    ctx.token
        .transfer_from(contract, payer, contract, amount, ctx.events)
}

/// Release `amount` from the escrow held by `contract` to `recipient`.
pub fn release_from_escrow(
    ctx: &mut TxContext,
    contract: Pubkey,
    recipient: Pubkey,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    ctx.token.transfer(contract, recipient, amount, ctx.events)
}
