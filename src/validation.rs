//! Input validation for page names and version tokens.
//!
//! Page names appear in URLs and in the `name` column, so they are limited to
//! ASCII letters and digits. That keeps path segments unambiguous (no
//! separators, dots, or spaces) before anything reaches the store.

use crate::db::WikiError;
use crate::models::RevisionId;

pub const MAX_NAME_LEN: usize = 128;

pub fn validate_page_name(name: &str) -> Result<(), WikiError> {
    if name.is_empty() {
        return Err(WikiError::InvalidInput("Page name must not be empty".to_string()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(WikiError::InvalidInput(format!(
            "Page name too long (max {} characters)",
            MAX_NAME_LEN
        )));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(WikiError::InvalidInput(
            "Page name must contain only letters and digits".to_string(),
        ));
    }
    Ok(())
}

/// Parse an explicit version token such as the `12` in `/view/Main/12`.
///
/// Only plain ASCII digits are accepted; signs, whitespace, and values that
/// overflow an `i64` are rejected.
pub fn parse_version_token(token: &str) -> Result<RevisionId, WikiError> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WikiError::InvalidInput(format!(
            "Version '{}' is not a number",
            token
        )));
    }
    token
        .parse::<RevisionId>()
        .map_err(|e| WikiError::InvalidInput(format!("Version '{}' is out of range: {}", token, e)))
}
