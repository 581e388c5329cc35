//! File a dispute on a task (or milestone) whose proof the creator has not approved
//!
//! The registry records the open dispute and locks the subject; the resolver
//! gets a snapshot of the reward and a back-reference to this registry.

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::DisputeFiled;
use crate::ledger::{DisputeResolver, TaskRegistry, TaskSource, TxContext};
use crate::state::{Dispute, DisputeStatus, DisputeSubject, TaskStatus};

pub fn handler(
    registry: &mut TaskRegistry,
    resolver: &mut DisputeResolver,
    ctx: &mut TxContext,
    task_id: u64,
) -> Result<u64> {
    registry.require_kind(!registry.kind.pays_by_milestone())?;
    require_worker_can_file(registry, ctx, task_id)?;

    let proof = registry
        .task_work_proofs(task_id, &ctx.signer)
        .ok_or(MarketError::ProofNotFound)?;
    require!(!proof.approved, MarketError::ProofAlreadyApproved);

    file(registry, resolver, ctx, DisputeSubject::task(task_id))
}

pub fn milestone_handler(
    registry: &mut TaskRegistry,
    resolver: &mut DisputeResolver,
    ctx: &mut TxContext,
    task_id: u64,
    index: u32,
) -> Result<u64> {
    registry.require_kind(registry.kind.pays_by_milestone())?;
    require_worker_can_file(registry, ctx, task_id)?;

    let milestone = registry.milestone(task_id, index)?;
    require!(!milestone.approved, MarketError::MilestoneAlreadyApproved);
    require!(milestone.proof_submitted(), MarketError::ProofNotFound);

    file(
        registry,
        resolver,
        ctx,
        DisputeSubject::milestone(task_id, index),
    )
}

fn require_worker_can_file(registry: &TaskRegistry, ctx: &TxContext, task_id: u64) -> Result<()> {
    let task = registry.live_task(task_id)?;
    require!(
        registry.task_worker(task_id) == Some(ctx.signer),
        MarketError::NotWorker
    );
    require!(
        task.status == TaskStatus::InProgress,
        MarketError::TaskNotInProgress
    );
    Ok(())
}

fn file(
    registry: &mut TaskRegistry,
    resolver: &mut DisputeResolver,
    ctx: &mut TxContext,
    subject: DisputeSubject,
) -> Result<u64> {
    require!(
        !registry.is_disputed(&subject),
        MarketError::DisputeAlreadyFiled
    );
    let reward_amount = registry.disputed_reward(&subject)?;
    let task_creator = registry.task(subject.task_id)?.creator;
    let worker = ctx.signer;
    let task_contract = registry.address;

    let dispute_id = resolver
        .dispute_counter
        .checked_add(1)
        .ok_or(MarketError::ArithmeticOverflow)?;
    resolver.dispute_counter = dispute_id;
    resolver.disputes.insert(
        dispute_id,
        Dispute {
            id: dispute_id,
            task_id: subject.task_id,
            milestone_index: subject.milestone_index,
            task_contract,
            worker,
            task_creator,
            reward_amount,
            status: DisputeStatus::Filed,
            filed_at: ctx.now,
            resolved_at: 0,
            votes: Vec::new(),
            round: 0,
        },
    );
    registry.open_disputes.insert(subject, dispute_id);

    ctx.emit(DisputeFiled {
        dispute_id,
        task_id: subject.task_id,
        milestone_index: subject.milestone_index,
        task_contract,
        worker,
        task_creator,
        reward_amount,
        timestamp: ctx.now,
    });

    Ok(dispute_id)
}
