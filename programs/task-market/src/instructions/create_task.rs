//! Create a new task

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::TaskCreated;
use crate::ledger::{TaskRegistry, TxContext};
use crate::state::{Task, TaskStatus, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};
use crate::utils::validation::{require_content, require_text};

/// Validate a deadline against the current time and the configured horizon.
pub fn validate_deadline(deadline: i64, now: i64, max_deadline_seconds: i64) -> Result<()> {
    require!(deadline > now, MarketError::InvalidDeadline);
    let horizon = now
        .checked_add(max_deadline_seconds)
        .ok_or(MarketError::ArithmeticOverflow)?;
    require!(deadline <= horizon, MarketError::InvalidDeadline);
    Ok(())
}

/// Tasks start Open with no reward; reward is escrowed when a worker is
/// bound or through `increase_reward`.
pub fn handler(
    registry: &mut TaskRegistry,
    ctx: &mut TxContext,
    title: String,
    description: String,
    deadline: i64,
) -> Result<u64> {
    require_content(&title, MAX_TITLE_LEN, false)?;
    require_text(&description, MAX_DESCRIPTION_LEN, true)?;
    validate_deadline(deadline, ctx.now, ctx.config.max_deadline_seconds)?;

    let task_id = registry
        .task_counter
        .checked_add(1)
        .ok_or(MarketError::ArithmeticOverflow)?;
    registry.task_counter = task_id;

    registry.tasks.insert(
        task_id,
        Task {
            id: task_id,
            creator: ctx.signer,
            title: title.clone(),
            description,
            total_reward: 0,
            deadline,
            status: TaskStatus::Open,
            created_at: ctx.now,
        },
    );

    ctx.emit(TaskCreated {
        registry: registry.address,
        task_id,
        creator: ctx.signer,
        title,
        deadline,
        timestamp: ctx.now,
    });

    Ok(task_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    #[test]
    fn test_deadline_must_be_future() {
        assert_eq!(
            validate_deadline(100, 100, 1_000).unwrap_err(),
            Error::from(MarketError::InvalidDeadline)
        );
        assert!(validate_deadline(101, 100, 1_000).is_ok());
    }

    #[test]
    fn test_deadline_horizon() {
        assert!(validate_deadline(1_100, 100, 1_000).is_ok());
        assert_eq!(
            validate_deadline(1_101, 100, 1_000).unwrap_err(),
            Error::from(MarketError::InvalidDeadline)
        );
    }
}
