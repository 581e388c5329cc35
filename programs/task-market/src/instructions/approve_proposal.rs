//! Party approval of a distribution proposal
//!
//! Approving twice is a no-op and emits nothing.

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::{ProposalApprovedByCreator, ProposalApprovedByWorker};
use crate::ledger::{DisputeResolver, TxContext};
use crate::state::{Dispute, DisputeStatus};

/// Status check shared by the proposal operations.
pub fn require_resolved(dispute: &Dispute) -> Result<()> {
    match dispute.status {
        DisputeStatus::Resolved => Ok(()),
        DisputeStatus::Distributed => err!(MarketError::DisputeAlreadyDistributed),
        DisputeStatus::Filed => err!(MarketError::DisputeNotResolved),
    }
}

pub fn handler(resolver: &mut DisputeResolver, ctx: &mut TxContext, dispute_id: u64) -> Result<()> {
    let dispute = resolver.dispute(dispute_id)?;
    require_resolved(dispute)?;
    require!(dispute.is_party(&ctx.signer), MarketError::NotDisputeParty);
    let worker = dispute.worker;
    let task_creator = dispute.task_creator;

    let proposal = resolver
        .proposals
        .get_mut(&dispute_id)
        .ok_or(MarketError::DisputeNotResolved)?;

    if ctx.signer == worker {
        if !proposal.worker_approved {
            proposal.worker_approved = true;
            ctx.emit(ProposalApprovedByWorker {
                dispute_id,
                worker,
                timestamp: ctx.now,
            });
        }
    } else if !proposal.creator_approved {
        proposal.creator_approved = true;
        ctx.emit(ProposalApprovedByCreator {
            dispute_id,
            task_creator,
            timestamp: ctx.now,
        });
    }

    Ok(())
}
