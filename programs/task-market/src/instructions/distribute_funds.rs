//! Pay out an approved distribution proposal
//!
//! The dispute is marked Distributed before the originating registry moves
//! any tokens, so the split is paid at most once.

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::FundsDistributed;
use crate::instructions::approve_proposal::require_resolved;
use crate::ledger::{DisputeResolver, TaskSource, TxContext};
use crate::state::DisputeStatus;

pub fn handler(
    resolver: &mut DisputeResolver,
    source: &mut dyn TaskSource,
    ctx: &mut TxContext,
    dispute_id: u64,
) -> Result<()> {
    let dispute = resolver.dispute(dispute_id)?;
    require_resolved(dispute)?;
    require_keys_eq!(
        source.address(),
        dispute.task_contract,
        MarketError::UnknownTaskContract
    );

    let proposal = resolver
        .distribution_proposals(dispute_id)
        .copied()
        .ok_or(MarketError::DisputeNotResolved)?;
    require!(proposal.fully_approved(), MarketError::ProposalNotApproved);

    let subject = dispute.subject();
    let worker = dispute.worker;
    let task_creator = dispute.task_creator;
    let worker_share = proposal.worker_share;
    let creator_share = dispute
        .reward_amount
        .checked_sub(worker_share)
        .ok_or(MarketError::ShareOutOfRange)?;

    resolver
        .dispute_mut(dispute_id)?
        .transition(DisputeStatus::Distributed)?;

    source.payout_split(ctx, &subject, worker_share, creator_share)?;

    msg!(
        "Dispute {} distributed: {} to worker, {} to creator",
        dispute_id,
        worker_share,
        creator_share
    );

    ctx.emit(FundsDistributed {
        dispute_id,
        worker,
        worker_share,
        task_creator,
        creator_share,
        timestamp: ctx.now,
    });

    Ok(())
}
