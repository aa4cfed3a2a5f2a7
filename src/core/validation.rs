//! Field-level validation shared by the catalog, user and recipe operations.
//!
//! The plain checks return [`Error::Validation`] with a message that can be
//! shown to the client as is. The `validate_required` and `validate_username`
//! hooks plug into `#[derive(Validate)]` payloads instead and report a
//! [`ValidationError`] that the caller converts.

use crate::errors::{Error, Result};
use std::borrow::Cow;
use validator::ValidationError;

/// Smallest amount of an ingredient a recipe may list.
pub const MIN_AMOUNT: i32 = 1;
/// Largest amount of an ingredient a recipe may list.
pub const MAX_AMOUNT: i32 = 2000;
/// Shortest allowed cooking time, in minutes.
pub const MIN_COOKING_TIME: i32 = 1;
/// Maximum length of recipe and tag names.
pub const MAX_NAME_LENGTH: usize = 200;

/// Rejects empty (or whitespace-only) values and values longer than `max_len` characters.
pub fn validate_text(field: &str, value: &str, max_len: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    if value.chars().count() > max_len {
        return Err(Error::validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(())
}

/// Checks a `#RRGGBB` hex color.
pub fn validate_color(color: &str) -> Result<()> {
    let valid = color
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if valid {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "Color '{color}' must be in #RRGGBB format"
        )))
    }
}

/// Checks a slug against `^[-a-zA-Z0-9_]+$`.
pub fn validate_slug(slug: &str) -> Result<()> {
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "Slug '{slug}' may only contain letters, digits, hyphens and underscores"
        )))
    }
}

/// `validator` hook: rejects blank values.
#[allow(clippy::ptr_arg)]
pub fn validate_required(value: &String) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("is_required");
        error.message = Some(Cow::from("This field is required"));
        Err(error)
    } else {
        Ok(())
    }
}

/// `validator` hook: a non-blank username matching `^[\w.@+-]+$`.
#[allow(clippy::ptr_arg)]
pub fn validate_username(username: &String) -> std::result::Result<(), ValidationError> {
    validate_required(username)?;
    let valid = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'));
    if valid {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_username");
        error.message = Some(Cow::from(
            "Username may only contain letters, digits and .@+-_",
        ));
        Err(error)
    }
}

/// Checks that an ingredient amount lies within `MIN_AMOUNT..=MAX_AMOUNT`.
pub fn validate_amount(amount: i32) -> Result<()> {
    if (MIN_AMOUNT..=MAX_AMOUNT).contains(&amount) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "Ingredient amount must be between {MIN_AMOUNT} and {MAX_AMOUNT}, got {amount}"
        )))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_color_format() {
        assert!(validate_color("#E26C2D").is_ok());
        assert!(validate_color("#abcdef").is_ok());
        assert!(validate_color("E26C2D").is_err());
        assert!(validate_color("#E26C2").is_err());
        assert!(validate_color("#GGGGGG").is_err());
        assert!(validate_color("#E26C2D0").is_err());
    }

    #[test]
    fn test_slug_format() {
        assert!(validate_slug("breakfast").is_ok());
        assert!(validate_slug("late-night_snack2").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("with space").is_err());
        assert!(validate_slug("завтрак").is_err());
    }

    #[test]
    fn test_username_format() {
        assert!(validate_username(&"chef.anna+1@home".to_string()).is_ok());
        assert!(validate_username(&"bad name".to_string()).is_err());
        assert!(validate_username(&"semi;colon".to_string()).is_err());
        let blank = validate_username(&"   ".to_string()).unwrap_err();
        assert_eq!(blank.code, "is_required");
    }

    #[test]
    fn test_amount_bounds() {
        assert!(validate_amount(1).is_ok());
        assert!(validate_amount(2000).is_ok());
        assert!(validate_amount(0).is_err());
        assert!(validate_amount(-5).is_err());
        assert!(validate_amount(2001).is_err());
    }

    #[test]
    fn test_text_length() {
        assert!(validate_text("Name", "Pancakes", MAX_NAME_LENGTH).is_ok());
        assert!(validate_text("Name", "   ", MAX_NAME_LENGTH).is_err());
        assert!(validate_text("Name", &"x".repeat(201), MAX_NAME_LENGTH).is_err());
    }
}
