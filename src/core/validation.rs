//! Reusable field checks for entity drafts
//!
//! Drafts call these from their `validate()` implementations. Checks return
//! a [`ValidationError`] naming the offending field so UI code can point at
//! the right input.

use crate::core::error::ValidationError;

/// Check that a required string field is present and non-blank
pub fn non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new(field, "must not be empty"))
    } else {
        Ok(())
    }
}

/// Check that an optional field, when present, is non-blank
pub fn non_empty_opt(field: &str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(v) => non_empty(field, v),
        None => Ok(()),
    }
}
