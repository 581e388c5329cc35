//! Update a registered user's profile or skills

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::{UserProfileUpdated, UserSkillsUpdated};
use crate::instructions::register_user::{validate_profile, validate_skills};
use crate::ledger::{TxContext, UserInfo};
use crate::state::UserProfile;

fn registered_profile<'a>(users: &'a mut UserInfo, user: &Pubkey) -> Result<&'a mut UserProfile> {
    users
        .profiles
        .get_mut(user)
        .filter(|p| p.exists)
        .ok_or_else(|| error!(MarketError::UserNotRegistered))
}

pub fn profile_handler(
    users: &mut UserInfo,
    ctx: &mut TxContext,
    name: String,
    email: String,
    bio: String,
    website: String,
) -> Result<()> {
    let profile = registered_profile(users, &ctx.signer)?;
    validate_profile(&name, &email, &bio, &website)?;

    profile.name = name;
    profile.email = email;
    profile.bio = bio;
    profile.website = website;

    ctx.emit(UserProfileUpdated {
        user: ctx.signer,
        timestamp: ctx.now,
    });

    Ok(())
}

pub fn skills_handler(users: &mut UserInfo, ctx: &mut TxContext, skills: Vec<String>) -> Result<()> {
    let profile = registered_profile(users, &ctx.signer)?;
    validate_skills(&skills)?;

    let skill_count = skills.len() as u32;
    profile.skills = skills;

    ctx.emit(UserSkillsUpdated {
        user: ctx.signer,
        skill_count,
        timestamp: ctx.now,
    });

    Ok(())
}
