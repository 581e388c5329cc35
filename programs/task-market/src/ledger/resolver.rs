//! DisputeResolver: disputes, distribution proposals and admin stakes
//!
//! Disputes reference their task only through `(task_contract, task_id)`;
//! settlement goes back through [`TaskSource`](crate::ledger::TaskSource).

use anchor_lang::prelude::*;
use indexmap::IndexMap;

use crate::errors::MarketError;
use crate::ledger::store_address;
use crate::state::{AdminStake, AdminStatus, Dispute, DistributionProposal};

/// Per-admin stake and vote bookkeeping, keyed by admin address
#[derive(Clone, Debug, Default)]
pub struct AdminStore {
    stakes: IndexMap<Pubkey, AdminStake>,
}

impl AdminStore {
    pub fn get(&self, admin: &Pubkey) -> AdminStake {
        self.stakes.get(admin).copied().unwrap_or_default()
    }

    pub fn status(&self, admin: &Pubkey) -> AdminStatus {
        self.get(admin).status
    }

    /// Active with at least `threshold` staked.
    pub fn is_eligible(&self, admin: &Pubkey, threshold: u64) -> bool {
        let stake = self.get(admin);
        stake.status == AdminStatus::Active && stake.amount >= threshold
    }

    pub fn require_eligible(&self, admin: &Pubkey, threshold: u64) -> Result<()> {
        require!(
            self.is_eligible(admin, threshold),
            MarketError::NotActiveAdmin
        );
        Ok(())
    }

    pub(crate) fn entry_mut(&mut self, admin: Pubkey) -> &mut AdminStake {
        self.stakes.entry(admin).or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Pubkey, &AdminStake)> {
        self.stakes.iter()
    }

    /// Tokens the resolver should hold for stakes.
    pub fn total_staked(&self) -> u64 {
        self.stakes.values().map(|s| s.amount).sum()
    }
}

#[derive(Clone, Debug)]
pub struct DisputeResolver {
    pub(crate) address: Pubkey,
    pub(crate) dispute_counter: u64,
    pub(crate) disputes: IndexMap<u64, Dispute>,
    pub(crate) proposals: IndexMap<u64, DistributionProposal>,
    pub(crate) admins: AdminStore,
}

impl Default for DisputeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DisputeResolver {
    pub fn new() -> Self {
        Self {
            address: store_address(&[b"dispute_resolver"]),
            dispute_counter: 0,
            disputes: IndexMap::new(),
            proposals: IndexMap::new(),
            admins: AdminStore::default(),
        }
    }

    pub fn address(&self) -> Pubkey {
        self.address
    }

    pub fn admins(&self) -> &AdminStore {
        &self.admins
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn get_dispute(&self, dispute_id: u64) -> Option<&Dispute> {
        self.disputes.get(&dispute_id)
    }

    pub fn distribution_proposals(&self, dispute_id: u64) -> Option<&DistributionProposal> {
        self.proposals.get(&dispute_id)
    }

    pub fn admin_status(&self, admin: &Pubkey) -> AdminStatus {
        self.admins.status(admin)
    }

    pub fn admin_stakes(&self, admin: &Pubkey) -> u64 {
        self.admins.get(admin).amount
    }

    pub fn has_voted_on_dispute(&self, admin: &Pubkey, dispute_id: u64) -> bool {
        self.disputes
            .get(&dispute_id)
            .map(|d| d.has_voted(admin))
            .unwrap_or(false)
    }

    pub fn dispute_counter(&self) -> u64 {
        self.dispute_counter
    }

    pub fn get_all_disputes(&self) -> Vec<&Dispute> {
        self.disputes.values().collect()
    }

    // ========================================================================
    // Handler helpers
    // ========================================================================

    pub(crate) fn dispute(&self, dispute_id: u64) -> Result<&Dispute> {
        self.disputes
            .get(&dispute_id)
            .ok_or_else(|| error!(MarketError::DisputeNotFound))
    }

    pub(crate) fn dispute_mut(&mut self, dispute_id: u64) -> Result<&mut Dispute> {
        self.disputes
            .get_mut(&dispute_id)
            .ok_or_else(|| error!(MarketError::DisputeNotFound))
    }
}
