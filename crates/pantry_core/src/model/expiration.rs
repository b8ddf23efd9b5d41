//! Expiration parsing and storage-key normalization.
//!
//! The store enforces `UNIQUE(section_id, name, expiration)`. SQL unique
//! indexes treat NULLs as distinct, so "no expiration" is persisted as a
//! reserved sentinel date and every read maps it back to `None`.
//!
//! # Invariants
//! - `from_storage_key(&to_storage_key(x)) == Ok(x)` for every accepted `x`.
//! - Keys sort lexicographically in calendar order, sentinel last.
//! - The sentinel date is not accepted as user input.

use crate::model::article::InputError;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Textual date format accepted from callers and used for storage keys.
pub const EXPIRATION_FORMAT: &str = "%Y-%m-%d";

/// Storage key standing for "no expiration".
const ABSENT_KEY: &str = "9999-12-31";

static STRICT_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date regex"));

/// Parses a user-supplied expiration.
///
/// Returns `Ok(None)` for the empty string and `InvalidExpiration` for
/// anything that is not a real `YYYY-MM-DD` calendar date.
///
/// `9999-12-31` is reserved for "no expiration" and is rejected too.
pub(crate) fn parse_expiration(value: &str) -> Result<Option<NaiveDate>, InputError> {
    if value.is_empty() {
        return Ok(None);
    }
    if !STRICT_DATE_RE.is_match(value) || value == ABSENT_KEY {
        return Err(InputError::InvalidExpiration);
    }
    NaiveDate::parse_from_str(value, EXPIRATION_FORMAT)
        .map(Some)
        .map_err(|_| InputError::InvalidExpiration)
}

/// Maps an optional expiration to the comparable key persisted in the store.
pub fn to_storage_key(expiration: Option<NaiveDate>) -> String {
    match expiration {
        Some(date) => date.format(EXPIRATION_FORMAT).to_string(),
        None => ABSENT_KEY.to_string(),
    }
}

/// Inverse of [`to_storage_key`].
///
/// Returns an error message when the persisted key is not a valid date.
pub fn from_storage_key(key: &str) -> Result<Option<NaiveDate>, String> {
    if key == ABSENT_KEY {
        return Ok(None);
    }
    NaiveDate::parse_from_str(key, EXPIRATION_FORMAT)
        .map(Some)
        .map_err(|_| format!("invalid expiration key `{key}`"))
}
