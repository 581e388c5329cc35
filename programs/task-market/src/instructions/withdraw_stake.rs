//! Withdraw an admin's whole stake

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::AdminWithdrawn;
use crate::instructions::token_helpers::release_from_escrow;
use crate::ledger::{DisputeResolver, TxContext};
use crate::state::AdminStatus;

pub fn handler(resolver: &mut DisputeResolver, ctx: &mut TxContext) -> Result<()> {
    let admin = ctx.signer;
    let current = resolver.admins.get(&admin);
    require!(current.amount > 0, MarketError::AdminNotStaked);
    // Votes in unprocessed rounds still count on this stake
    require!(
        current.active_dispute_votes == 0,
        MarketError::AdminHasActiveVotes
    );

    let stake = resolver.admins.entry_mut(admin);
    let amount = stake.amount;
    stake.amount = 0;
    stake.status = AdminStatus::Withdrawn;

    release_from_escrow(ctx, resolver.address, admin, amount)?;

    ctx.emit(AdminWithdrawn {
        admin,
        amount,
        timestamp: ctx.now,
    });

    Ok(())
}
