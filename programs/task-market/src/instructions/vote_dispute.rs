//! Admin vote on a filed dispute

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::AdminVoted;
use crate::ledger::{AdminStore, DisputeResolver, TxContext};
use crate::state::{Dispute, DisputeStatus, DisputeVote};

pub fn handler(
    resolver: &mut DisputeResolver,
    ctx: &mut TxContext,
    dispute_id: u64,
    worker_share: u64,
) -> Result<()> {
    let DisputeResolver {
        disputes, admins, ..
    } = resolver;
    let dispute = disputes
        .get_mut(&dispute_id)
        .ok_or(MarketError::DisputeNotFound)?;
    cast_vote(dispute, admins, ctx, worker_share)
}

/// Record one vote against the admin store passed in.
pub fn cast_vote(
    dispute: &mut Dispute,
    admins: &mut AdminStore,
    ctx: &mut TxContext,
    worker_share: u64,
) -> Result<()> {
    let admin = ctx.signer;

    require!(
        dispute.status == DisputeStatus::Filed,
        MarketError::DisputeNotFiled
    );

    // Eligibility is checked against the threshold in force now
    admins.require_eligible(&admin, ctx.config.admin_stake_amount)?;

    // Neither party may judge their own dispute
    require!(!dispute.is_party(&admin), MarketError::AdminIsDisputeParty);

    // Duplicate detection keyed by (admin, dispute)
    require!(!dispute.has_voted(&admin), MarketError::AlreadyVoted);

    require!(
        worker_share <= dispute.reward_amount,
        MarketError::ShareOutOfRange
    );

    dispute.votes.push(DisputeVote {
        admin,
        worker_share,
        voted_at: ctx.now,
    });

    let stake = admins.entry_mut(admin);
    stake.active_dispute_votes = stake
        .active_dispute_votes
        .checked_add(1)
        .ok_or(MarketError::ArithmeticOverflow)?;

    ctx.emit(AdminVoted {
        dispute_id: dispute.id,
        admin,
        worker_share,
        timestamp: ctx.now,
    });

    Ok(())
}
