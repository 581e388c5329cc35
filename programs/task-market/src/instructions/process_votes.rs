//! Aggregate a dispute round into a distribution proposal
//!
//! Requires quorum. The proposed worker share is the floor of the mean vote.

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::DisputeResolved;
use crate::instructions::constants::DISPUTE_QUORUM;
use crate::instructions::dispute_helpers::floor_mean_share;
use crate::ledger::{DisputeResolver, TxContext};
use crate::state::{DisputeStatus, DistributionProposal};

pub fn handler(resolver: &mut DisputeResolver, ctx: &mut TxContext, dispute_id: u64) -> Result<u64> {
    let DisputeResolver {
        disputes,
        proposals,
        admins,
        ..
    } = resolver;
    let dispute = disputes
        .get_mut(&dispute_id)
        .ok_or(MarketError::DisputeNotFound)?;

    require!(
        dispute.status == DisputeStatus::Filed,
        MarketError::DisputeNotFiled
    );
    admins.require_eligible(&ctx.signer, ctx.config.admin_stake_amount)?;
    require!(
        dispute.votes.len() >= DISPUTE_QUORUM,
        MarketError::InsufficientVotes
    );

    let worker_share = floor_mean_share(&dispute.votes)?;
    require!(
        worker_share <= dispute.reward_amount,
        MarketError::ShareOutOfRange
    );

    dispute.transition(DisputeStatus::Resolved)?;
    dispute.resolved_at = ctx.now;
    proposals.insert(
        dispute_id,
        DistributionProposal {
            worker_share,
            worker_approved: false,
            creator_approved: false,
        },
    );

    // The round is closed: voters are free to withdraw again
    for vote in &dispute.votes {
        let stake = admins.entry_mut(vote.admin);
        stake.active_dispute_votes = stake.active_dispute_votes.saturating_sub(1);
    }

    msg!(
        "Dispute {} resolved: worker share {} of {} from {} votes",
        dispute_id,
        worker_share,
        dispute.reward_amount,
        dispute.votes.len()
    );

    ctx.emit(DisputeResolved {
        dispute_id,
        worker_share,
        votes: dispute.votes.len() as u32,
        timestamp: ctx.now,
    });

    Ok(worker_share)
}
