//! Add a milestone to a milestone task
//!
//! Milestones are allocated from the escrowed budget: the sum of milestone
//! rewards may never exceed the task's total reward.

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::MilestoneAdded;
use crate::ledger::{TaskRegistry, TxContext};
use crate::state::{Milestone, TaskStatus, MAX_DESCRIPTION_LEN};
use crate::utils::validation::require_content;

pub fn handler(
    registry: &mut TaskRegistry,
    ctx: &mut TxContext,
    task_id: u64,
    description: String,
    reward: u64,
) -> Result<u32> {
    registry.require_kind(registry.kind.pays_by_milestone())?;
    let task = registry.live_task(task_id)?;
    require_keys_eq!(ctx.signer, task.creator, MarketError::NotCreator);
    require!(
        matches!(task.status, TaskStatus::Open | TaskStatus::InProgress),
        MarketError::TaskNotInProgress
    );
    require!(reward > 0, MarketError::InvalidAmount);
    require_content(&description, MAX_DESCRIPTION_LEN, true)?;

    let total_reward = task.total_reward;
    let allocated = registry
        .allocated_milestone_rewards(task_id)?
        .checked_add(reward)
        .ok_or(MarketError::ArithmeticOverflow)?;
    require!(
        allocated <= total_reward,
        MarketError::MilestoneBudgetExceeded
    );

    let milestones = registry.milestones.entry(task_id).or_default();
    let index = u32::try_from(milestones.len()).map_err(|_| error!(MarketError::ArithmeticOverflow))?;
    milestones.push(Milestone {
        description,
        reward,
        proof: None,
        approved: false,
        paid: false,
    });

    ctx.emit(MilestoneAdded {
        registry: registry.address,
        task_id,
        index,
        reward,
        timestamp: ctx.now,
    });

    Ok(index)
}
