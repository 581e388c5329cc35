//! Update market configuration (owner gated)

use anchor_lang::prelude::*;

use crate::config::MarketConfig;
use crate::errors::MarketError;
use crate::events::{
    AdminStakeAmountUpdated, DisputeProcessingRewardUpdated, EventLog, OwnershipTransferred,
    PlatformFeeUpdated,
};
use crate::instructions::constants::{MAX_DISPUTE_PROCESSING_REWARD_BPS, MAX_PLATFORM_FEE_BPS};

fn require_owner(config: &MarketConfig, signer: &Pubkey) -> Result<()> {
    require_keys_eq!(*signer, config.owner, MarketError::NotOwner);
    Ok(())
}

pub fn platform_fee_handler(
    config: &mut MarketConfig,
    events: &mut EventLog,
    signer: Pubkey,
    now: i64,
    platform_fee_bps: u16,
) -> Result<()> {
    require_owner(config, &signer)?;
    require!(
        platform_fee_bps <= MAX_PLATFORM_FEE_BPS,
        MarketError::InvalidFeeBps
    );

    let old_fee_bps = config.platform_fee_bps;
    config.platform_fee_bps = platform_fee_bps;
    msg!("Platform fee {} -> {} bps", old_fee_bps, platform_fee_bps);

    events.push(PlatformFeeUpdated {
        old_fee_bps,
        new_fee_bps: platform_fee_bps,
        updated_by: signer,
        timestamp: now,
    });
    Ok(())
}

/// Admins below a raised threshold keep their status but lose eligibility
/// until they top up.
pub fn admin_stake_amount_handler(
    config: &mut MarketConfig,
    events: &mut EventLog,
    signer: Pubkey,
    now: i64,
    amount: u64,
) -> Result<()> {
    require_owner(config, &signer)?;
    require!(amount > 0, MarketError::InvalidAmount);

    let old_amount = config.admin_stake_amount;
    config.admin_stake_amount = amount;
    msg!("Admin stake amount {} -> {}", old_amount, amount);

    events.push(AdminStakeAmountUpdated {
        old_amount,
        new_amount: amount,
        updated_by: signer,
        timestamp: now,
    });
    Ok(())
}

pub fn processing_reward_handler(
    config: &mut MarketConfig,
    events: &mut EventLog,
    signer: Pubkey,
    now: i64,
    bps: u16,
) -> Result<()> {
    require_owner(config, &signer)?;
    require!(
        bps <= MAX_DISPUTE_PROCESSING_REWARD_BPS,
        MarketError::InvalidFeeBps
    );

    let old_bps = config.dispute_processing_reward_bps;
    config.dispute_processing_reward_bps = bps;
    msg!("Dispute processing reward {} -> {} bps", old_bps, bps);

    events.push(DisputeProcessingRewardUpdated {
        old_bps,
        new_bps: bps,
        updated_by: signer,
        timestamp: now,
    });
    Ok(())
}

pub fn transfer_ownership_handler(
    config: &mut MarketConfig,
    events: &mut EventLog,
    signer: Pubkey,
    now: i64,
    new_owner: Pubkey,
) -> Result<()> {
    require_owner(config, &signer)?;
    require!(new_owner != Pubkey::default(), MarketError::InvalidConfig);

    let previous_owner = config.owner;
    config.owner = new_owner;
    msg!("Ownership transferred {} -> {}", previous_owner, new_owner);

    events.push(OwnershipTransferred {
        previous_owner,
        new_owner,
        timestamp: now,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    fn key(n: u8) -> Pubkey {
        Pubkey::new_from_array([n; 32])
    }

    #[test]
    fn test_platform_fee_owner_only() {
        let mut config = MarketConfig::with_owner(key(1));
        let mut events = EventLog::default();

        assert_eq!(
            platform_fee_handler(&mut config, &mut events, key(2), 0, 100).unwrap_err(),
            Error::from(MarketError::NotOwner)
        );
        platform_fee_handler(&mut config, &mut events, key(1), 0, 100).unwrap();
        assert_eq!(config.platform_fee_bps, 100);
        assert_eq!(events.names(), vec!["PlatformFeeUpdated"]);
    }

    #[test]
    fn test_platform_fee_cap() {
        let mut config = MarketConfig::with_owner(key(1));
        let mut events = EventLog::default();
        assert_eq!(
            platform_fee_handler(&mut config, &mut events, key(1), 0, 1001).unwrap_err(),
            Error::from(MarketError::InvalidFeeBps)
        );
        platform_fee_handler(&mut config, &mut events, key(1), 0, 1000).unwrap();
    }

    #[test]
    fn test_processing_reward_cap() {
        let mut config = MarketConfig::with_owner(key(1));
        let mut events = EventLog::default();
        assert_eq!(
            processing_reward_handler(&mut config, &mut events, key(1), 0, 10_001).unwrap_err(),
            Error::from(MarketError::InvalidFeeBps)
        );
        processing_reward_handler(&mut config, &mut events, key(1), 0, 10_000).unwrap();
        assert_eq!(config.dispute_processing_reward_bps, 10_000);
    }

    #[test]
    fn test_transfer_ownership_hands_over_rights() {
        let mut config = MarketConfig::with_owner(key(1));
        let mut events = EventLog::default();
        transfer_ownership_handler(&mut config, &mut events, key(1), 5, key(2)).unwrap();
        assert_eq!(config.owner, key(2));

        assert_eq!(
            admin_stake_amount_handler(&mut config, &mut events, key(1), 6, 10).unwrap_err(),
            Error::from(MarketError::NotOwner)
        );
        admin_stake_amount_handler(&mut config, &mut events, key(2), 6, 10).unwrap();
        assert_eq!(config.admin_stake_amount, 10);
    }
}
