//! UserInfo: profile registry

use anchor_lang::prelude::*;
use indexmap::IndexMap;

use crate::ledger::store_address;
use crate::state::UserProfile;

#[derive(Clone, Debug)]
pub struct UserInfo {
    pub(crate) address: Pubkey,
    pub(crate) profiles: IndexMap<Pubkey, UserProfile>,
}

impl Default for UserInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl UserInfo {
    pub fn new() -> Self {
        Self {
            address: store_address(&[b"user_info"]),
            profiles: IndexMap::new(),
        }
    }

    pub fn address(&self) -> Pubkey {
        self.address
    }

    /// Profile of `user`; unknown addresses get an empty profile with `exists == false`.
    pub fn get_user_profile(&self, user: &Pubkey) -> UserProfile {
        self.profiles.get(user).cloned().unwrap_or_default()
    }

    pub fn get_user_skills(&self, user: &Pubkey) -> Vec<String> {
        self.profiles
            .get(user)
            .map(|p| p.skills.clone())
            .unwrap_or_default()
    }

    pub fn is_user_registered(&self, user: &Pubkey) -> bool {
        self.profiles.get(user).map(|p| p.exists).unwrap_or(false)
    }

    pub fn user_count(&self) -> usize {
        self.profiles.len()
    }
}
