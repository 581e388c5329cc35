//! Shared constants for instruction handlers.

/// Basis points divisor (100% = 10000 bps)
pub const BASIS_POINTS_DIVISOR: u64 = 10000;

/// Maximum platform fee (10%)
pub const MAX_PLATFORM_FEE_BPS: u16 = 1000;

/// Default platform fee (2.5%)
pub const DEFAULT_PLATFORM_FEE_BPS: u16 = 250;

/// Maximum dispute processing fee (100% of the disputed reward)
pub const MAX_DISPUTE_PROCESSING_REWARD_BPS: u16 = 10000;

/// Default dispute processing fee (1%)
pub const DEFAULT_DISPUTE_PROCESSING_REWARD_BPS: u16 = 100;

/// Token decimals, as for SPL mints
pub const TOKEN_DECIMALS: u8 = 9;

/// One whole token in base units
pub const ONE_TOKEN: u64 = 1_000_000_000;

/// Default admin stake threshold (1000 tokens)
pub const DEFAULT_ADMIN_STAKE_AMOUNT: u64 = 1000 * ONE_TOKEN;

/// Minimum number of admin votes before a dispute round can be processed
pub const DISPUTE_QUORUM: usize = 3;

/// Maximum deadline horizon (1 year in seconds)
pub const MAX_DEADLINE_SECONDS: i64 = 365 * 24 * 60 * 60;
