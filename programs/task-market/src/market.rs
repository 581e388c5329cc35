//! Transactional facade over the market ledger
//!
//! Every write names its signer and runs as one transaction: the ledger is
//! snapshotted first and restored if the handler fails, so a failed call
//! leaves no partial effect (events included).

use std::path::Path;

use anchor_lang::prelude::*;

use crate::config::MarketConfig;
use crate::errors::MarketError;
use crate::events::EventLog;
use crate::instructions::{
    accept_bid, add_milestone, add_worker, approve_proof, approve_proposal, complete_task,
    create_task, distribute_funds, extend_deadline, file_dispute, increase_reward, pay_task,
    process_votes, register_user, reject_proposal, stake_admin, submit_bid, submit_proof,
    terminate_task, update_config, update_user, vote_dispute, withdraw_stake,
};
use crate::ledger::{
    store_address, DisputeResolver, TaskRegistry, TaskSource, TaskToken, TxContext, UserInfo,
};
use crate::state::{TaskKind, UserProfile};

/// All contract stores. Cloned as the rollback snapshot of a transaction.
#[derive(Clone, Debug)]
pub struct Ledger {
    token: TaskToken,
    registries: [TaskRegistry; 3],
    resolver: DisputeResolver,
    users: UserInfo,
    config: MarketConfig,
}

impl Ledger {
    fn new(config: MarketConfig) -> Self {
        Self {
            token: TaskToken::new(store_address(&[b"task_token"]), config.owner),
            registries: TaskKind::ALL.map(TaskRegistry::new),
            resolver: DisputeResolver::new(),
            users: UserInfo::new(),
            config,
        }
    }

    /// Store accounts only move funds through the market's own handlers.
    fn require_external_signer(&self, signer: &Pubkey) -> Result<()> {
        let is_store = *signer == self.token.address()
            || *signer == self.resolver.address()
            || *signer == self.users.address()
            || self.registries.iter().any(|r| r.address() == *signer);
        require!(!is_store, MarketError::StoreCannotSign);
        Ok(())
    }

    fn registry_tx<'a>(
        &'a mut self,
        kind: TaskKind,
        signer: Pubkey,
        now: i64,
        events: &'a mut EventLog,
    ) -> (&'a mut TaskRegistry, TxContext<'a>) {
        let Ledger {
            token,
            registries,
            config,
            ..
        } = self;
        (
            &mut registries[kind.index()],
            TxContext {
                signer,
                now,
                token,
                events,
                config,
            },
        )
    }

    fn resolver_tx<'a>(
        &'a mut self,
        signer: Pubkey,
        now: i64,
        events: &'a mut EventLog,
    ) -> (&'a mut DisputeResolver, &'a mut [TaskRegistry; 3], TxContext<'a>) {
        let Ledger {
            token,
            registries,
            resolver,
            config,
            ..
        } = self;
        (
            resolver,
            registries,
            TxContext {
                signer,
                now,
                token,
                events,
                config,
            },
        )
    }

    fn users_tx<'a>(
        &'a mut self,
        signer: Pubkey,
        now: i64,
        events: &'a mut EventLog,
    ) -> (&'a mut UserInfo, TxContext<'a>) {
        let Ledger {
            token,
            users,
            config,
            ..
        } = self;
        (
            users,
            TxContext {
                signer,
                now,
                token,
                events,
                config,
            },
        )
    }
}

/// Resolve a dispute's `task_contract` back-reference to its registry.
pub fn task_source<'a>(
    registries: &'a mut [TaskRegistry],
    address: &Pubkey,
) -> Result<&'a mut dyn TaskSource> {
    registries
        .iter_mut()
        .find(|r| r.address() == *address)
        .map(|r| r as &mut dyn TaskSource)
        .ok_or_else(|| error!(MarketError::UnknownTaskContract))
}

#[derive(Clone, Debug)]
pub struct Market {
    ledger: Ledger,
    events: EventLog,
    now: i64,
}

impl Market {
    pub fn new(config: MarketConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ledger: Ledger::new(config),
            events: EventLog::default(),
            now: 0,
        })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(MarketConfig::from_json_file(path)?)
    }

    // ========================================================================
    // Clock
    // ========================================================================

    pub fn now(&self) -> i64 {
        self.now
    }

    pub fn advance_clock(&mut self, seconds: i64) -> Result<i64> {
        require!(seconds >= 0, MarketError::ClockWentBackwards);
        self.now = self
            .now
            .checked_add(seconds)
            .ok_or(MarketError::ArithmeticOverflow)?;
        Ok(self.now)
    }

    pub fn set_clock(&mut self, timestamp: i64) -> Result<()> {
        require!(timestamp >= self.now, MarketError::ClockWentBackwards);
        self.now = timestamp;
        Ok(())
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    fn transact<T>(
        &mut self,
        signer: Pubkey,
        f: impl FnOnce(&mut Ledger, &mut EventLog, i64) -> Result<T>,
    ) -> Result<T> {
        self.ledger.require_external_signer(&signer)?;
        let snapshot = self.ledger.clone();
        let mark = self.events.len();
        let result = f(&mut self.ledger, &mut self.events, self.now);
        if result.is_err() {
            self.ledger = snapshot;
            self.events.truncate(mark);
        }
        result
    }

    fn with_registry<T>(
        &mut self,
        signer: Pubkey,
        kind: TaskKind,
        f: impl FnOnce(&mut TaskRegistry, &mut TxContext) -> Result<T>,
    ) -> Result<T> {
        self.transact(signer, |ledger, events, now| {
            let (registry, mut ctx) = ledger.registry_tx(kind, signer, now, events);
            f(registry, &mut ctx)
        })
    }

    fn with_resolver<T>(
        &mut self,
        signer: Pubkey,
        f: impl FnOnce(&mut DisputeResolver, &mut [TaskRegistry; 3], &mut TxContext) -> Result<T>,
    ) -> Result<T> {
        self.transact(signer, |ledger, events, now| {
            let (resolver, registries, mut ctx) = ledger.resolver_tx(signer, now, events);
            f(resolver, registries, &mut ctx)
        })
    }

    fn with_users<T>(
        &mut self,
        signer: Pubkey,
        f: impl FnOnce(&mut UserInfo, &mut TxContext) -> Result<T>,
    ) -> Result<T> {
        self.transact(signer, |ledger, events, now| {
            let (users, mut ctx) = ledger.users_tx(signer, now, events);
            f(users, &mut ctx)
        })
    }

    // ========================================================================
    // TaskToken
    // ========================================================================

    pub fn mint(&mut self, signer: Pubkey, to: Pubkey, amount: u64) -> Result<()> {
        self.transact(signer, |ledger, events, _| ledger.token.mint(signer, to, amount, events))
    }

    pub fn transfer(&mut self, signer: Pubkey, to: Pubkey, amount: u64) -> Result<()> {
        self.transact(signer, |ledger, events, _| ledger.token.transfer(signer, to, amount, events))
    }

    pub fn approve(&mut self, signer: Pubkey, spender: Pubkey, amount: u64) -> Result<()> {
        self.transact(signer, |ledger, events, _| ledger.token.approve(signer, spender, amount, events))
    }

    /// Same as [`Market::approve`]; the bidding front-end approves the
    /// registry under this name before accepting a bid.
    pub fn approve_task_contract(&mut self, signer: Pubkey, spender: Pubkey, amount: u64) -> Result<()> {
        self.approve(signer, spender, amount)
    }

    pub fn transfer_from(&mut self, signer: Pubkey, from: Pubkey, to: Pubkey, amount: u64) -> Result<()> {
        self.transact(signer, |ledger, events, _| {
            ledger.token.transfer_from(signer, from, to, amount, events)
        })
    }

    // ========================================================================
    // TaskRegistry
    // ========================================================================

    pub fn create_task(
        &mut self,
        signer: Pubkey,
        kind: TaskKind,
        title: impl Into<String>,
        description: impl Into<String>,
        deadline: i64,
    ) -> Result<u64> {
        let (title, description) = (title.into(), description.into());
        self.with_registry(signer, kind, |registry, ctx| {
            create_task::handler(registry, ctx, title, description, deadline)
        })
    }

    pub fn submit_bid(
        &mut self,
        signer: Pubkey,
        kind: TaskKind,
        task_id: u64,
        amount: u64,
        description: impl Into<String>,
        estimated_time: u64,
    ) -> Result<u64> {
        let description = description.into();
        self.with_registry(signer, kind, |registry, ctx| {
            submit_bid::handler(registry, ctx, task_id, amount, description, estimated_time)
        })
    }

    pub fn accept_bid(&mut self, signer: Pubkey, kind: TaskKind, task_id: u64, bid_index: u64) -> Result<()> {
        self.with_registry(signer, kind, |registry, ctx| {
            accept_bid::handler(registry, ctx, task_id, bid_index)
        })
    }

    pub fn add_worker(
        &mut self,
        signer: Pubkey,
        kind: TaskKind,
        task_id: u64,
        worker: Pubkey,
        reward: u64,
    ) -> Result<()> {
        self.with_registry(signer, kind, |registry, ctx| {
            add_worker::handler(registry, ctx, task_id, worker, reward)
        })
    }

    pub fn add_milestone(
        &mut self,
        signer: Pubkey,
        kind: TaskKind,
        task_id: u64,
        description: impl Into<String>,
        reward: u64,
    ) -> Result<u32> {
        let description = description.into();
        self.with_registry(signer, kind, |registry, ctx| {
            add_milestone::handler(registry, ctx, task_id, description, reward)
        })
    }

    pub fn submit_proof_of_work(
        &mut self,
        signer: Pubkey,
        kind: TaskKind,
        task_id: u64,
        content: impl Into<String>,
    ) -> Result<()> {
        let content = content.into();
        self.with_registry(signer, kind, |registry, ctx| {
            submit_proof::handler(registry, ctx, task_id, content)
        })
    }

    pub fn submit_milestone_proof_of_work(
        &mut self,
        signer: Pubkey,
        kind: TaskKind,
        task_id: u64,
        index: u32,
        content: impl Into<String>,
    ) -> Result<()> {
        let content = content.into();
        self.with_registry(signer, kind, |registry, ctx| {
            submit_proof::milestone_handler(registry, ctx, task_id, index, content)
        })
    }

    pub fn approve_proof_of_work(
        &mut self,
        signer: Pubkey,
        kind: TaskKind,
        task_id: u64,
        worker: Pubkey,
    ) -> Result<()> {
        self.with_registry(signer, kind, |registry, ctx| {
            approve_proof::handler(registry, ctx, task_id, worker)
        })
    }

    pub fn approve_milestone(&mut self, signer: Pubkey, kind: TaskKind, task_id: u64, index: u32) -> Result<()> {
        self.with_registry(signer, kind, |registry, ctx| {
            approve_proof::milestone_handler(registry, ctx, task_id, index)
        })
    }

    pub fn complete_task(&mut self, signer: Pubkey, kind: TaskKind, task_id: u64) -> Result<()> {
        self.with_registry(signer, kind, |registry, ctx| {
            complete_task::handler(registry, ctx, task_id)
        })
    }

    pub fn pay_task(&mut self, signer: Pubkey, kind: TaskKind, task_id: u64) -> Result<()> {
        self.with_registry(signer, kind, |registry, ctx| {
            pay_task::handler(registry, ctx, task_id)
        })
    }

    pub fn pay_milestone(&mut self, signer: Pubkey, kind: TaskKind, task_id: u64, index: u32) -> Result<()> {
        self.with_registry(signer, kind, |registry, ctx| {
            pay_task::milestone_handler(registry, ctx, task_id, index)
        })
    }

    pub fn terminate_task(&mut self, signer: Pubkey, kind: TaskKind, task_id: u64) -> Result<()> {
        self.with_registry(signer, kind, |registry, ctx| {
            terminate_task::handler(registry, ctx, task_id)
        })
    }

    pub fn extend_deadline(
        &mut self,
        signer: Pubkey,
        kind: TaskKind,
        task_id: u64,
        new_deadline: i64,
    ) -> Result<()> {
        self.with_registry(signer, kind, |registry, ctx| {
            extend_deadline::handler(registry, ctx, task_id, new_deadline)
        })
    }

    pub fn increase_reward(&mut self, signer: Pubkey, kind: TaskKind, task_id: u64, amount: u64) -> Result<()> {
        self.with_registry(signer, kind, |registry, ctx| {
            increase_reward::handler(registry, ctx, task_id, amount)
        })
    }

    pub fn file_dispute_by_worker(&mut self, signer: Pubkey, kind: TaskKind, task_id: u64) -> Result<u64> {
        self.with_resolver(signer, |resolver, registries, ctx| {
            file_dispute::handler(&mut registries[kind.index()], resolver, ctx, task_id)
        })
    }

    pub fn file_milestone_dispute_by_worker(
        &mut self,
        signer: Pubkey,
        kind: TaskKind,
        task_id: u64,
        index: u32,
    ) -> Result<u64> {
        self.with_resolver(signer, |resolver, registries, ctx| {
            file_dispute::milestone_handler(&mut registries[kind.index()], resolver, ctx, task_id, index)
        })
    }

    // ========================================================================
    // DisputeResolver
    // ========================================================================

    /// Add a partial stake.
    pub fn stake(&mut self, signer: Pubkey, amount: u64) -> Result<()> {
        self.with_resolver(signer, |resolver, _, ctx| {
            stake_admin::handler(resolver, ctx, amount)
        })
    }

    pub fn stake_to_become_admin(&mut self, signer: Pubkey) -> Result<()> {
        self.with_resolver(signer, |resolver, _, ctx| {
            stake_admin::to_threshold_handler(resolver, ctx)
        })
    }

    pub fn withdraw_stake(&mut self, signer: Pubkey) -> Result<()> {
        self.with_resolver(signer, |resolver, _, ctx| {
            withdraw_stake::handler(resolver, ctx)
        })
    }

    pub fn vote_on_dispute(&mut self, signer: Pubkey, dispute_id: u64, worker_share: u64) -> Result<()> {
        self.with_resolver(signer, |resolver, _, ctx| {
            vote_dispute::handler(resolver, ctx, dispute_id, worker_share)
        })
    }

    /// Returns the proposed worker share.
    pub fn process_votes(&mut self, signer: Pubkey, dispute_id: u64) -> Result<u64> {
        self.with_resolver(signer, |resolver, _, ctx| {
            process_votes::handler(resolver, ctx, dispute_id)
        })
    }

    pub fn approve_proposal(&mut self, signer: Pubkey, dispute_id: u64) -> Result<()> {
        self.with_resolver(signer, |resolver, _, ctx| {
            approve_proposal::handler(resolver, ctx, dispute_id)
        })
    }

    pub fn distribute_funds(&mut self, signer: Pubkey, dispute_id: u64) -> Result<()> {
        self.with_resolver(signer, |resolver, registries, ctx| {
            let task_contract = resolver.dispute(dispute_id)?.task_contract;
            let source = task_source(registries, &task_contract)?;
            distribute_funds::handler(resolver, source, ctx, dispute_id)
        })
    }

    pub fn reject_proposal(&mut self, signer: Pubkey, dispute_id: u64) -> Result<()> {
        self.with_resolver(signer, |resolver, _, ctx| {
            reject_proposal::handler(resolver, ctx, dispute_id)
        })
    }

    // ========================================================================
    // UserInfo
    // ========================================================================

    pub fn register_user(
        &mut self,
        signer: Pubkey,
        name: impl Into<String>,
        email: impl Into<String>,
        bio: impl Into<String>,
        website: impl Into<String>,
        skills: Vec<String>,
    ) -> Result<()> {
        let (name, email, bio, website) = (name.into(), email.into(), bio.into(), website.into());
        self.with_users(signer, |users, ctx| {
            register_user::handler(users, ctx, name, email, bio, website, skills)
        })
    }

    pub fn update_user_profile(
        &mut self,
        signer: Pubkey,
        name: impl Into<String>,
        email: impl Into<String>,
        bio: impl Into<String>,
        website: impl Into<String>,
    ) -> Result<()> {
        let (name, email, bio, website) = (name.into(), email.into(), bio.into(), website.into());
        self.with_users(signer, |users, ctx| {
            update_user::profile_handler(users, ctx, name, email, bio, website)
        })
    }

    pub fn update_user_skills(&mut self, signer: Pubkey, skills: Vec<String>) -> Result<()> {
        self.with_users(signer, |users, ctx| {
            update_user::skills_handler(users, ctx, skills)
        })
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    pub fn update_platform_fee(&mut self, signer: Pubkey, platform_fee_bps: u16) -> Result<()> {
        self.transact(signer, |ledger, events, now| {
            update_config::platform_fee_handler(&mut ledger.config, events, signer, now, platform_fee_bps)
        })
    }

    pub fn update_admin_stake_amount(&mut self, signer: Pubkey, amount: u64) -> Result<()> {
        self.transact(signer, |ledger, events, now| {
            update_config::admin_stake_amount_handler(&mut ledger.config, events, signer, now, amount)
        })
    }

    pub fn update_dispute_processing_reward_bps(&mut self, signer: Pubkey, bps: u16) -> Result<()> {
        self.transact(signer, |ledger, events, now| {
            update_config::processing_reward_handler(&mut ledger.config, events, signer, now, bps)
        })
    }

    pub fn transfer_ownership(&mut self, signer: Pubkey, new_owner: Pubkey) -> Result<()> {
        self.transact(signer, |ledger, events, now| {
            ledger.require_external_signer(&new_owner)?;
            update_config::transfer_ownership_handler(&mut ledger.config, events, signer, now, new_owner)?;
            ledger.token.set_owner(new_owner);
            Ok(())
        })
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn registry(&self, kind: TaskKind) -> &TaskRegistry {
        &self.ledger.registries[kind.index()]
    }

    pub fn registries(&self) -> &[TaskRegistry] {
        &self.ledger.registries
    }

    pub fn resolver(&self) -> &DisputeResolver {
        &self.ledger.resolver
    }

    pub fn users(&self) -> &UserInfo {
        &self.ledger.users
    }

    pub fn token(&self) -> &TaskToken {
        &self.ledger.token
    }

    pub fn config(&self) -> &MarketConfig {
        &self.ledger.config
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn balance_of(&self, account: &Pubkey) -> u64 {
        self.ledger.token.balance_of(account)
    }

    pub fn platform_fee(&self) -> u16 {
        self.ledger.config.platform_fee_bps
    }

    pub fn admin_stake_amount(&self) -> u64 {
        self.ledger.config.admin_stake_amount
    }

    pub fn dispute_processing_reward_bps(&self) -> u16 {
        self.ledger.config.dispute_processing_reward_bps
    }

    pub fn get_user_profile(&self, user: &Pubkey) -> UserProfile {
        self.ledger.users.get_user_profile(user)
    }

    /// Whether every store holds exactly the tokens its books say it should.
    pub fn escrow_balanced(&self) -> bool {
        let token = &self.ledger.token;
        let registries_ok = self
            .ledger
            .registries
            .iter()
            .all(|r| token.balance_of(&r.address()) == r.total_escrowed());
        let resolver = &self.ledger.resolver;
        registries_ok && token.balance_of(&resolver.address()) == resolver.admins().total_staked()
    }
}
