//! Contract stores of the market ledger.
//!
//! Each store plays the role of one deployed contract and has its own
//! address. Tokens escrowed by a store are held in the [`TaskToken`] balance
//! of that address.

pub mod registry;
pub mod resolver;
pub mod token;
pub mod user_info;

pub use registry::TaskRegistry;
pub use resolver::{AdminStore, DisputeResolver};
pub use token::TaskToken;
pub use user_info::UserInfo;

use anchor_lang::prelude::*;

use crate::config::MarketConfig;
use crate::events::{EventLog, MarketEvent};
use crate::state::DisputeSubject;

/// Derive the address of a market store from its seeds.
pub fn store_address(seeds: &[&[u8]]) -> Pubkey {
    Pubkey::find_program_address(seeds, &crate::ID).0
}

/// Everything a handler may touch besides the store it operates on.
pub struct TxContext<'a> {
    /// Transaction signer
    pub signer: Pubkey,
    /// Block timestamp
    pub now: i64,
    pub token: &'a mut TaskToken,
    pub events: &'a mut EventLog,
    pub config: &'a MarketConfig,
}

impl<'a> TxContext<'a> {
    pub fn emit(&mut self, event: impl Into<MarketEvent>) {
        self.events.push(event);
    }
}

/// Lookup interface a dispute resolver uses to reach the task it references.
///
/// The resolver only ever holds `(task_contract, task_id)` and goes through
/// this trait to read the disputed reward and to settle it.
pub trait TaskSource {
    /// Address disputes use as `task_contract`
    fn address(&self) -> Pubkey;

    /// Reward currently at stake for the subject
    fn disputed_reward(&self, subject: &DisputeSubject) -> Result<u64>;

    /// Pay the agreed split out of escrow and close the subject.
    fn payout_split(
        &mut self,
        ctx: &mut TxContext,
        subject: &DisputeSubject,
        worker_share: u64,
        creator_share: u64,
    ) -> Result<()>;
}
