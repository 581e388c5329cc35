//! TaskToken: the fungible escrow asset
//!
//! Plain balances and owner-set allowances. Every debit checks the allowance
//! (for delegated transfers) and the balance before any state is touched.

use anchor_lang::prelude::*;
use indexmap::IndexMap;

use crate::errors::MarketError;
use crate::events::{Approval, EventLog, Transfer};

#[derive(Clone, Debug)]
pub struct TaskToken {
    address: Pubkey,
    owner: Pubkey,
    total_supply: u64,
    balances: IndexMap<Pubkey, u64>,
    /// (owner, spender) -> remaining allowance
    allowances: IndexMap<(Pubkey, Pubkey), u64>,
}

impl TaskToken {
    pub fn new(address: Pubkey, owner: Pubkey) -> Self {
        Self {
            address,
            owner,
            total_supply: 0,
            balances: IndexMap::new(),
            allowances: IndexMap::new(),
        }
    }

    pub fn address(&self) -> Pubkey {
        self.address
    }

    pub fn owner(&self) -> Pubkey {
        self.owner
    }

    /// Hand the mint authority to `owner`. Follows market ownership.
    pub(crate) fn set_owner(&mut self, owner: Pubkey) {
        self.owner = owner;
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    pub fn balance_of(&self, account: &Pubkey) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> u64 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    /// Accounts with a non-zero balance, in first-seen order.
    pub fn holders(&self) -> impl Iterator<Item = (&Pubkey, &u64)> {
        self.balances.iter().filter(|(_, amount)| **amount > 0)
    }

    pub fn mint(
        &mut self,
        caller: Pubkey,
        to: Pubkey,
        amount: u64,
        events: &mut EventLog,
    ) -> Result<()> {
        require_keys_eq!(caller, self.owner, MarketError::NotTokenOwner);
        require!(amount > 0, MarketError::InvalidAmount);

        let total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;
        let balance = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;

        self.total_supply = total_supply;
        self.balances.insert(to, balance);

        events.push(Transfer {
            from: Pubkey::default(),
            to,
            amount,
        });
        Ok(())
    }

    pub fn approve(
        &mut self,
        owner: Pubkey,
        spender: Pubkey,
        amount: u64,
        events: &mut EventLog,
    ) -> Result<()> {
        self.allowances.insert((owner, spender), amount);
        events.push(Approval {
            owner,
            spender,
            amount,
        });
        Ok(())
    }

    /// Move `amount` from `from` to `to`. Zero amounts are a no-op.
    pub fn transfer(
        &mut self,
        from: Pubkey,
        to: Pubkey,
        amount: u64,
        events: &mut EventLog,
    ) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let from_balance = self.balance_of(&from);
        require!(from_balance >= amount, MarketError::InsufficientBalance);

        self.move_balance(from, to, amount)?;
        events.push(Transfer { from, to, amount });
        Ok(())
    }

    /// Delegated transfer: `spender` moves `amount` of `from`'s tokens to `to`,
    /// consuming allowance.
    pub fn transfer_from(
        &mut self,
        spender: Pubkey,
        from: Pubkey,
        to: Pubkey,
        amount: u64,
        events: &mut EventLog,
    ) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let allowance = self.allowance(&from, &spender);
        require!(allowance >= amount, MarketError::InsufficientAllowance);
        require!(
            self.balance_of(&from) >= amount,
            MarketError::InsufficientBalance
        );

        self.move_balance(from, to, amount)?;
        self.allowances.insert((from, spender), allowance - amount);
        events.push(Transfer { from, to, amount });
        Ok(())
    }

    fn move_balance(&mut self, from: Pubkey, to: Pubkey, amount: u64) -> Result<()> {
        if from == to {
            return Ok(());
        }
        let from_balance = self
            .balance_of(&from)
            .checked_sub(amount)
            .ok_or(MarketError::InsufficientBalance)?;
        let to_balance = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;
        self.balances.insert(from, from_balance);
        self.balances.insert(to, to_balance);
        Ok(())
    }
}
