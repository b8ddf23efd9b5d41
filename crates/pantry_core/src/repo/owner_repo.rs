//! Owner directory contract and SQLite implementation.
//!
//! The pantry engine only asks whether an owner exists; account data
//! (credentials, e-mail, sessions) lives elsewhere.

use super::schema::ensure_table_ready;
use super::{RepoError, RepoResult};
use crate::model::section::OwnerId;
use rusqlite::Connection;

/// Owner existence collaborator consumed by the section manager.
pub trait OwnerRepository {
    /// Returns whether `owner_id` refers to a registered owner.
    fn owner_exists(&self, owner_id: OwnerId) -> RepoResult<bool>;
    /// Registers a new owner and returns its id.
    fn create_owner(&self, username: &str) -> RepoResult<OwnerId>;
    /// Removes an owner together with all sections and articles.
    fn delete_owner(&self, owner_id: OwnerId) -> RepoResult<()>;
}

/// SQLite-backed owner directory.
pub struct SqliteOwnerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOwnerRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "owners", &["id", "username", "created_at"])?;
        Ok(Self { conn })
    }
}

impl OwnerRepository for SqliteOwnerRepository<'_> {
    fn owner_exists(&self, owner_id: OwnerId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM owners WHERE id = ?1);",
            [owner_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn create_owner(&self, username: &str) -> RepoResult<OwnerId> {
        self.conn
            .execute("INSERT INTO owners (username) VALUES (?1);", [username])?;
        Ok(self.conn.last_insert_rowid())
    }

    fn delete_owner(&self, owner_id: OwnerId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM owners WHERE id = ?1;", [owner_id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "owner",
                id: owner_id,
            });
        }
        Ok(())
    }
}
