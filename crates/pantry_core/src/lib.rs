//! Pantry storage engine.
//!
//! Manages per-owner storage sections and the perishable articles inside
//! them: identity and merge rules, nullable expirations, and the
//! `(expiration, id)` ordering used for navigation.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, PantryConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::article::{
    Article, ArticleId, ArticleInput, InputError, Neighbors, OrderedArticle, ParsedArticle,
    SectionRef,
};
pub use model::section::{OwnerId, PantryStats, Section, SectionId, SectionScope};
pub use repo::article_repo::{ArticleDraft, ArticleRepository, SqliteArticleRepository};
pub use repo::owner_repo::{OwnerRepository, SqliteOwnerRepository};
pub use repo::section_repo::{SectionRepository, SqliteSectionRepository};
pub use repo::{RepoError, RepoResult};
pub use service::article_service::ArticleService;
pub use service::error::{PantryError, PantryResult};
pub use service::section_service::SectionService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
