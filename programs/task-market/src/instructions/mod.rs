//! Instruction handlers for the task market
//!
//! One module per write operation, each exposing `handler` (and a
//! `milestone_handler` where the milestone variant has its own form).

pub mod completion_helpers;
pub mod constants;
pub mod dispute_helpers;
pub mod token_helpers;

// Task registry
pub mod accept_bid;
pub mod add_milestone;
pub mod add_worker;
pub mod approve_proof;
pub mod complete_task;
pub mod create_task;
pub mod extend_deadline;
pub mod file_dispute;
pub mod increase_reward;
pub mod pay_task;
pub mod submit_bid;
pub mod submit_proof;
pub mod terminate_task;

// Dispute resolver
pub mod approve_proposal;
pub mod distribute_funds;
pub mod process_votes;
pub mod reject_proposal;
pub mod stake_admin;
pub mod vote_dispute;
pub mod withdraw_stake;

// User registry
pub mod register_user;
pub mod update_user;

// Configuration
pub mod update_config;

pub use constants::*;
