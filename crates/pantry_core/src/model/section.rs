//! Section records and scope selection.

use serde::{Deserialize, Serialize};

/// Identifier of the user that owns sections. Resolved upstream.
pub type OwnerId = i64;

/// Store-assigned section identifier, unique across all owners.
pub type SectionId = i64;

/// Named, per-owner grouping of articles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub owner_id: OwnerId,
    /// Unique per owner, compared case-sensitively.
    pub name: String,
}

/// Which sections an article listing or neighbour lookup spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionScope {
    /// Every section of the requesting owner.
    All,
    /// One section, ownership-checked before use.
    Section(SectionId),
}

impl SectionScope {
    /// Token accepted by [`SectionScope::parse`] for all sections.
    pub const ALL_TOKEN: &'static str = "all";

    /// Parses a scope reference coming from a request path or query.
    ///
    /// `"all"` and `"0"` select every section; a positive integer selects one
    /// section. Returns `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        if value == Self::ALL_TOKEN {
            return Some(Self::All);
        }
        match value.parse::<SectionId>().ok()? {
            0 => Some(Self::All),
            id if id > 0 => Some(Self::Section(id)),
            _ => None,
        }
    }
}

impl From<SectionId> for SectionScope {
    fn from(value: SectionId) -> Self {
        Self::Section(value)
    }
}

/// Aggregate counters for one owner's pantry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PantryStats {
    pub sections: u64,
    pub articles: u64,
}
