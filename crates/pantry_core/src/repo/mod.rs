//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per aggregate.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Every section/article read is scoped by owner in SQL, never filtered
//!   after the fact.
//! - Repository APIs return semantic errors (`NotFound`, `UniqueViolation`)
//!   in addition to DB transport errors.

pub mod article_repo;
pub mod owner_repo;
pub mod section_repo;
mod schema;

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error shared by pantry repositories.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target row does not exist (or is not visible to the owner).
    NotFound { entity: &'static str, id: i64 },
    /// A write collided with a composite unique key.
    UniqueViolation,
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::UniqueViolation => write!(f, "unique constraint violated"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "pantry repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "pantry repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "pantry repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid pantry data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if is_unique_violation(&value) {
            return Self::UniqueViolation;
        }
        Self::Db(DbError::Sqlite(value))
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
