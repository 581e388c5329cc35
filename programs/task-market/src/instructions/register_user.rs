//! Register a user profile

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::events::UserRegistered;
use crate::ledger::{TxContext, UserInfo};
use crate::state::{
    UserProfile, MAX_BIO_LEN, MAX_CONTACT_LEN, MAX_NAME_LEN, MAX_SKILLS, MAX_SKILL_LEN,
};
use crate::utils::validation::{require_contact, require_content, require_text};

/// Profile fields without skills, validated together.
pub fn validate_profile(name: &str, email: &str, bio: &str, website: &str) -> Result<()> {
    require_content(name, MAX_NAME_LEN, false)?;
    require_contact(email, MAX_CONTACT_LEN)?;
    require_text(bio, MAX_BIO_LEN, true)?;
    require_contact(website, MAX_CONTACT_LEN)?;
    Ok(())
}

pub fn validate_skills(skills: &[String]) -> Result<()> {
    require!(skills.len() <= MAX_SKILLS, MarketError::StringTooLong);
    for skill in skills {
        require_content(skill, MAX_SKILL_LEN, false)?;
    }
    Ok(())
}

pub fn handler(
    users: &mut UserInfo,
    ctx: &mut TxContext,
    name: String,
    email: String,
    bio: String,
    website: String,
    skills: Vec<String>,
) -> Result<()> {
    require!(
        !users.is_user_registered(&ctx.signer),
        MarketError::UserAlreadyRegistered
    );
    validate_profile(&name, &email, &bio, &website)?;
    validate_skills(&skills)?;

    users.profiles.insert(
        ctx.signer,
        UserProfile {
            name: name.clone(),
            email,
            bio,
            website,
            skills,
            exists: true,
            registered_at: ctx.now,
        },
    );

    ctx.emit(UserRegistered {
        user: ctx.signer,
        name,
        timestamp: ctx.now,
    });

    Ok(())
}
