//! Caller-facing error taxonomy of the pantry engine.
//!
//! Ownership failures are reported as the entity's "not found" kind; there
//! is no forbidden kind. Store detail is logged and never returned.

use crate::model::article::InputError;
use crate::repo::RepoError;
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PantryResult<T> = Result<T, PantryError>;

/// Errors returned by section and article use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PantryError {
    /// Owner does not exist.
    UserUnknown,
    /// Section is missing or owned by someone else.
    SectionNotFound,
    /// Owner already has a section with this name.
    SectionDuplicated,
    /// Article is missing or lives in a foreign section.
    ArticleNotFound,
    /// Another article already uses this `(section, name, expiration)`.
    ArticleDuplicated,
    /// Quantity is not a non-negative number.
    InvalidQuantity,
    /// Expiration is not a `YYYY-MM-DD` date.
    InvalidExpiration,
    /// Unexpected store failure; details are in the log.
    Unknown,
}

impl Display for PantryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::UserUnknown => "unknown user",
            Self::SectionNotFound => "section not found",
            Self::SectionDuplicated => "a section with the same name already exists",
            Self::ArticleNotFound => "article not found",
            Self::ArticleDuplicated => {
                "an article with the same name and expiration already exists"
            }
            Self::InvalidQuantity => "invalid quantity",
            Self::InvalidExpiration => "invalid expiration",
            Self::Unknown => "unknown error",
        };
        f.write_str(message)
    }
}

impl Error for PantryError {}

impl From<InputError> for PantryError {
    fn from(value: InputError) -> Self {
        match value {
            InputError::InvalidQuantity => Self::InvalidQuantity,
            InputError::InvalidExpiration => Self::InvalidExpiration,
        }
    }
}

/// Logs an unexpected repository failure and hides it behind `Unknown`.
pub(crate) fn store_failure(event: &'static str, err: RepoError) -> PantryError {
    error!("event={event} module=pantry status=error error_code=store_failure error={err}");
    PantryError::Unknown
}
