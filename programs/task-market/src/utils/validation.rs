//! Input validation utilities for the task market

use anchor_lang::prelude::*;

use crate::errors::MarketError;

/// Validates that a string contains only printable ASCII characters (including space).
///
/// Used for contact fields (email, website) that end up in URLs.
///
/// # Examples
/// ```
/// use task_market::utils::validation::validate_string_input;
///
/// assert!(validate_string_input("https://example.com/me"));
/// assert!(!validate_string_input("hello\nworld"));
/// ```
pub fn validate_string_input(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_graphic() || c == ' ')
}

/// Validates free text: any Unicode except control characters, with newlines
/// allowed only when `allow_newlines` is set.
pub fn validate_text_input(s: &str, allow_newlines: bool) -> bool {
    s.chars()
        .all(|c| !c.is_control() || (allow_newlines && c == '\n'))
}

/// Checks length (in characters) and character set of a free-text field.
pub fn require_text(s: &str, max_len: usize, allow_newlines: bool) -> Result<()> {
    require!(s.chars().count() <= max_len, MarketError::StringTooLong);
    require!(
        validate_text_input(s, allow_newlines),
        MarketError::InvalidStringInput
    );
    Ok(())
}

/// Like [`require_text`] but the field must not be empty or whitespace only.
pub fn require_content(s: &str, max_len: usize, allow_newlines: bool) -> Result<()> {
    require!(!s.trim().is_empty(), MarketError::EmptyContent);
    require_text(s, max_len, allow_newlines)
}

/// Checks a contact field (email, website): printable ASCII up to `max_len`.
pub fn require_contact(s: &str, max_len: usize) -> Result<()> {
    require!(s.len() <= max_len, MarketError::StringTooLong);
    require!(validate_string_input(s), MarketError::InvalidStringInput);
    Ok(())
}
