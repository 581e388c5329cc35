//! Market configuration
//!
//! Loaded from a JSON document whose addresses are base58 strings:
//!
//! ```json
//! {
//!   "owner": "11111111111111111111111111111112",
//!   "treasury": "11111111111111111111111111111113",
//!   "platform_fee_bps": 250
//! }
//! ```
//!
//! Omitted numeric fields take their defaults. `treasury` defaults to `owner`.

use std::path::Path;
use std::str::FromStr;

use anchor_lang::prelude::*;
use serde::Deserialize;

use crate::errors::MarketError;
use crate::instructions::constants::{
    DEFAULT_ADMIN_STAKE_AMOUNT, DEFAULT_DISPUTE_PROCESSING_REWARD_BPS, DEFAULT_PLATFORM_FEE_BPS,
    MAX_DEADLINE_SECONDS, MAX_DISPUTE_PROCESSING_REWARD_BPS, MAX_PLATFORM_FEE_BPS,
};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct MarketConfig {
    /// May update the fee settings and transfer ownership
    pub owner: Pubkey,
    /// Receives platform fees and fee-split dust
    pub treasury: Pubkey,
    /// Platform fee on task and milestone payouts, in basis points
    pub platform_fee_bps: u16,
    /// Stake required for admin voting rights
    pub admin_stake_amount: u64,
    /// Fee charged on proposal rejection, in basis points of the disputed reward
    pub dispute_processing_reward_bps: u16,
    /// Furthest a task deadline may lie in the future
    pub max_deadline_seconds: i64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            owner: Pubkey::default(),
            treasury: Pubkey::default(),
            platform_fee_bps: DEFAULT_PLATFORM_FEE_BPS,
            admin_stake_amount: DEFAULT_ADMIN_STAKE_AMOUNT,
            dispute_processing_reward_bps: DEFAULT_DISPUTE_PROCESSING_REWARD_BPS,
            max_deadline_seconds: MAX_DEADLINE_SECONDS,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MarketConfigFile {
    owner: String,
    #[serde(default)]
    treasury: Option<String>,
    #[serde(default = "default_platform_fee_bps")]
    platform_fee_bps: u16,
    #[serde(default = "default_admin_stake_amount")]
    admin_stake_amount: u64,
    #[serde(default = "default_dispute_processing_reward_bps")]
    dispute_processing_reward_bps: u16,
    #[serde(default = "default_max_deadline_seconds")]
    max_deadline_seconds: i64,
}

fn default_platform_fee_bps() -> u16 {
    DEFAULT_PLATFORM_FEE_BPS
}

fn default_admin_stake_amount() -> u64 {
    DEFAULT_ADMIN_STAKE_AMOUNT
}

fn default_dispute_processing_reward_bps() -> u16 {
    DEFAULT_DISPUTE_PROCESSING_REWARD_BPS
}

fn default_max_deadline_seconds() -> i64 {
    MAX_DEADLINE_SECONDS
}

fn parse_address(field: &str, value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value).map_err(|_| {
        msg!("config: {} is not a base58 address: {}", field, value);
        error!(MarketError::InvalidConfig)
    })
}

impl MarketConfig {
    /// Default settings owned by `owner`, who also receives fees.
    pub fn with_owner(owner: Pubkey) -> Self {
        Self {
            owner,
            treasury: owner,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        require!(
            self.platform_fee_bps <= MAX_PLATFORM_FEE_BPS,
            MarketError::InvalidConfig
        );
        require!(
            self.dispute_processing_reward_bps <= MAX_DISPUTE_PROCESSING_REWARD_BPS,
            MarketError::InvalidConfig
        );
        require!(self.admin_stake_amount > 0, MarketError::InvalidConfig);
        require!(self.max_deadline_seconds > 0, MarketError::InvalidConfig);
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: MarketConfigFile = serde_json::from_str(json).map_err(|e| {
            msg!("config: invalid document: {}", e);
            error!(MarketError::InvalidConfig)
        })?;

        let owner = parse_address("owner", &file.owner)?;
        let treasury = match file.treasury.as_deref() {
            Some(t) => parse_address("treasury", t)?,
            None => owner,
        };

        let config = Self {
            owner,
            treasury,
            platform_fee_bps: file.platform_fee_bps,
            admin_stake_amount: file.admin_stake_amount,
            dispute_processing_reward_bps: file.dispute_processing_reward_bps,
            max_deadline_seconds: file.max_deadline_seconds,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            msg!("config: cannot read {}: {}", path.display(), e);
            error!(MarketError::InvalidConfig)
        })?;
        Self::from_json_str(&json)
    }
}
