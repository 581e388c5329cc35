#![allow(dead_code)]

use anchor_lang::error::Error;
use anchor_lang::prelude::*;
use task_market::{Market, MarketConfig, MarketError, TaskKind};

pub const START: i64 = 1_700_000_000;
pub const DAY: i64 = 86_400;

/// Small threshold so tests can stake without minting huge balances.
pub const ADMIN_STAKE: u64 = 1_000;

pub fn key(n: u8) -> Pubkey {
    Pubkey::new_from_array([n; 32])
}

#[track_caller]
pub fn assert_err<T: std::fmt::Debug>(result: Result<T>, expected: MarketError) {
    let err = result.expect_err("call should fail");
    assert_eq!(err, Error::from(expected));
}

pub fn owner() -> Pubkey {
    key(1)
}

pub fn treasury() -> Pubkey {
    key(2)
}

pub fn creator() -> Pubkey {
    key(10)
}

pub fn worker() -> Pubkey {
    key(11)
}

pub fn bidder() -> Pubkey {
    key(12)
}

pub fn admins() -> [Pubkey; 3] {
    [key(20), key(21), key(22)]
}

pub fn config() -> MarketConfig {
    MarketConfig {
        treasury: treasury(),
        admin_stake_amount: ADMIN_STAKE,
        ..MarketConfig::with_owner(owner())
    }
}

/// Mint `amount` to `who` and let every market store pull from it.
pub fn fund(market: &mut Market, who: Pubkey, amount: u64) {
    market.mint(owner(), who, amount).unwrap();
    let spenders: Vec<Pubkey> = market
        .registries()
        .iter()
        .map(|r| r.address())
        .chain(std::iter::once(market.resolver().address()))
        .collect();
    for spender in spenders {
        market.approve(who, spender, u64::MAX).unwrap();
    }
}

/// Market at `START` with a funded creator, worker and bidder.
pub fn setup() -> Market {
    let mut market = Market::new(config()).unwrap();
    market.set_clock(START).unwrap();
    for who in [creator(), worker(), bidder()] {
        fund(&mut market, who, 10_000);
    }
    market
}

/// As `setup`, plus three active admins.
pub fn setup_with_admins() -> Market {
    let mut market = setup();
    for admin in admins() {
        fund(&mut market, admin, 5_000);
        market.stake_to_become_admin(admin).unwrap();
    }
    market
}

/// Task bound to `worker()` with `reward` escrowed and proof submitted.
pub fn task_with_proof(market: &mut Market, kind: TaskKind, reward: u64) -> u64 {
    let task_id = market
        .create_task(creator(), kind, "Port the parser", "Rewrite it", START + 7 * DAY)
        .unwrap();
    market
        .add_worker(creator(), kind, task_id, worker(), reward)
        .unwrap();
    market
        .submit_proof_of_work(worker(), kind, task_id, "https://example.org/pr/1")
        .unwrap();
    task_id
}
