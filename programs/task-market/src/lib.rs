#![allow(unexpected_cfgs)]
//! Task Market
//!
//! An escrowed task marketplace with stake-weighted dispute resolution.
//! Creators post tasks, bind workers (by accepting a bid, by direct
//! assignment, or with a milestone budget) and pay out against approved
//! proof of work. Workers whose proof is left unapproved can escalate to a
//! dispute resolver where staked admins vote on the split, and both parties
//! must approve the result before any funds move.
//!
//! The whole ledger (token, three task registries, dispute resolver, user
//! registry) lives in a [`Market`], which applies every write atomically.

use anchor_lang::prelude::*;

declare_id!("HsMczySXkCtQWhxHBTDntKX8ZoYLKxNpLBHByzcxveSr");

pub mod config;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod ledger;
pub mod market;
pub mod state;
pub mod utils;

pub use config::MarketConfig;
pub use errors::{error_kind, market_error, ErrorKind, MarketError};
pub use events::{EventLog, MarketEvent};
pub use instructions::constants::DISPUTE_QUORUM;
pub use ledger::{DisputeResolver, TaskRegistry, TaskSource, TaskToken, UserInfo};
pub use market::Market;
pub use state::*;
