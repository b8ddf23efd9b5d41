//! Article records and input parsing.
//!
//! # Responsibility
//! - Define the article read model returned to callers.
//! - Convert free-text form fields into a validated `ParsedArticle`.
//!
//! # Invariants
//! - Parsed quantities are finite and non-negative.
//! - `(section, name, expiration)` is the article identity; two absent
//!   expirations are the same expiration.

use crate::model::expiration::{parse_expiration, to_storage_key, EXPIRATION_FORMAT};
use crate::model::section::SectionId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned article identifier, unique across all sections.
pub type ArticleId = i64;

/// Tracked pantry item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub id: ArticleId,
    pub section_id: SectionId,
    pub name: String,
    /// `None` means the article does not expire.
    pub expiration: Option<NaiveDate>,
    /// `None` means the quantity is not tracked.
    pub quantity: Option<f64>,
}

impl Article {
    /// Returns whether the article expired strictly before `today`.
    ///
    /// Articles without expiration never expire.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiration.is_some_and(|expiration| expiration < today)
    }

    /// Expiration rendered as `YYYY-MM-DD`, if any.
    pub fn formatted_expiration(&self) -> Option<String> {
        self.expiration
            .map(|expiration| expiration.format(EXPIRATION_FORMAT).to_string())
    }
}

/// Article plus its neighbours under `(expiration, id)` order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderedArticle {
    pub article: Article,
    pub prev: Option<ArticleId>,
    pub next: Option<ArticleId>,
}

/// Immediate predecessor/successor ids of one article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Neighbors {
    pub prev: Option<ArticleId>,
    pub next: Option<ArticleId>,
}

/// Raw article fields as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleInput {
    pub name: String,
    /// Empty means "not tracked".
    pub quantity: String,
    /// Empty means "does not expire"; otherwise `YYYY-MM-DD`.
    pub expiration: String,
    /// Destination section id as text.
    pub section: String,
}

impl ArticleInput {
    /// Convenience constructor used by callers that already hold the fields.
    pub fn new(
        name: impl Into<String>,
        quantity: impl Into<String>,
        expiration: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            expiration: expiration.into(),
            section: section.into(),
        }
    }

    /// Validates quantity and expiration.
    ///
    /// The destination section is not resolved here; see [`SectionRef`].
    pub fn parse(&self) -> Result<ParsedArticle, InputError> {
        let quantity = parse_quantity(&self.quantity)?;
        let expiration = parse_expiration(&self.expiration)?;

        Ok(ParsedArticle {
            name: self.name.clone(),
            quantity,
            expiration,
            section: SectionRef::new(self.section.clone()),
        })
    }
}

/// Validated article fragment ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArticle {
    pub name: String,
    pub quantity: Option<f64>,
    pub expiration: Option<NaiveDate>,
    pub section: SectionRef,
}

impl ParsedArticle {
    /// Comparable storage form of the expiration.
    pub fn expiration_key(&self) -> String {
        to_storage_key(self.expiration)
    }
}

/// Unresolved destination section reference.
///
/// Kept as text so that an unusable reference only fails when a write
/// actually needs the section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRef(String);

impl SectionRef {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the referenced id when the text is a positive integer.
    pub fn id(&self) -> Option<SectionId> {
        self.0.parse::<SectionId>().ok().filter(|id| *id > 0)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Empty text means "no destination given".
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<SectionId> for SectionRef {
    fn from(value: SectionId) -> Self {
        Self(value.to_string())
    }
}

/// Input rejection raised before anything reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    InvalidQuantity,
    InvalidExpiration,
}

impl Display for InputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuantity => write!(f, "quantity must be a non-negative number"),
            Self::InvalidExpiration => write!(f, "expiration must be a YYYY-MM-DD date"),
        }
    }
}

impl Error for InputError {}

fn parse_quantity(value: &str) -> Result<Option<f64>, InputError> {
    if value.is_empty() {
        return Ok(None);
    }
    let quantity = value
        .parse::<f64>()
        .map_err(|_| InputError::InvalidQuantity)?;
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(InputError::InvalidQuantity);
    }
    // Folds `-0` into `0`.
    Ok(Some(quantity.abs()))
}
