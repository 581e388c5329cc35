//! Reject a distribution proposal and reopen the dispute for a new round
//!
//! The rejecting party pays a processing fee (bps of the disputed reward),
//! split equally among the admins who voted in the rejected round. The
//! division remainder goes to the treasury. Votes are cleared.

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::ProposalRejected;
use crate::instructions::approve_proposal::require_resolved;
use crate::instructions::dispute_helpers::{processing_fee, split_processing_fee};
use crate::instructions::token_helpers::{pull_into_escrow, release_from_escrow};
use crate::ledger::{DisputeResolver, TxContext};
use crate::state::DisputeStatus;

pub fn handler(resolver: &mut DisputeResolver, ctx: &mut TxContext, dispute_id: u64) -> Result<()> {
    let rejecter = ctx.signer;
    let dispute = resolver.dispute(dispute_id)?;
    require_resolved(dispute)?;
    require!(dispute.is_party(&rejecter), MarketError::NotDisputeParty);

    let fee = processing_fee(
        dispute.reward_amount,
        ctx.config.dispute_processing_reward_bps,
    )?;
    let voters: Vec<Pubkey> = dispute.votes.iter().map(|v| v.admin).collect();
    let (per_voter, remainder) = split_processing_fee(fee, voters.len())?;

    // Effects: reopen with a fresh round
    let dispute = resolver.dispute_mut(dispute_id)?;
    dispute.transition(DisputeStatus::Filed)?;
    dispute.votes.clear();
    dispute.resolved_at = 0;
    dispute.round = dispute
        .round
        .checked_add(1)
        .ok_or(MarketError::ArithmeticOverflow)?;
    let round = dispute.round;
    resolver.proposals.shift_remove(&dispute_id);

    // Transfers: fee in from the rejecter, then out to voters and treasury
    let resolver_address = resolver.address;
    pull_into_escrow(ctx, rejecter, resolver_address, fee)?;
    for voter in voters {
        release_from_escrow(ctx, resolver_address, voter, per_voter)?;
    }
    let treasury = ctx.config.treasury;
    release_from_escrow(ctx, resolver_address, treasury, remainder)?;

    msg!(
        "Dispute {} proposal rejected, round {} opened, fee {}",
        dispute_id,
        round,
        fee
    );

    ctx.emit(ProposalRejected {
        dispute_id,
        rejected_by: rejecter,
        processing_fee: fee,
        round,
        timestamp: ctx.now,
    });

    Ok(())
}
