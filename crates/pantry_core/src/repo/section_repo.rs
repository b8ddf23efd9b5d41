//! Section repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist per-owner sections and enforce `(owner_id, name)` uniqueness.
//! - Scope every lookup by owner so foreign sections read as absent.
//!
//! # Invariants
//! - Listing order is `id ASC`.
//! - Deleting a section cascades to its articles through the foreign key.

use super::schema::ensure_table_ready;
use super::{RepoError, RepoResult};
use crate::model::section::{OwnerId, PantryStats, Section, SectionId};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Repository interface for section operations.
pub trait SectionRepository {
    /// Lists all sections of one owner.
    fn list_sections(&self, owner_id: OwnerId) -> RepoResult<Vec<Section>>;
    /// Loads one section when it exists and belongs to `owner_id`.
    fn get_section(&self, owner_id: OwnerId, section_id: SectionId)
        -> RepoResult<Option<Section>>;
    /// Returns whether `owner_id` already has a section called `name`.
    fn section_name_taken(&self, owner_id: OwnerId, name: &str) -> RepoResult<bool>;
    /// Creates one section.
    fn create_section(&self, owner_id: OwnerId, name: &str) -> RepoResult<Section>;
    /// Renames one owned section.
    fn rename_section(
        &self,
        owner_id: OwnerId,
        section_id: SectionId,
        name: &str,
    ) -> RepoResult<()>;
    /// Deletes one owned section and its articles.
    fn delete_section(&self, owner_id: OwnerId, section_id: SectionId) -> RepoResult<()>;
    /// Counts sections and articles of one owner.
    fn stats(&self, owner_id: OwnerId) -> RepoResult<PantryStats>;
}

/// SQLite-backed section repository.
pub struct SqliteSectionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSectionRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "sections", &["id", "owner_id", "name"])?;
        Ok(Self { conn })
    }
}

impl SectionRepository for SqliteSectionRepository<'_> {
    fn list_sections(&self, owner_id: OwnerId) -> RepoResult<Vec<Section>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner_id, name
             FROM sections
             WHERE owner_id = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([owner_id])?;
        let mut sections = Vec::new();
        while let Some(row) = rows.next()? {
            sections.push(parse_section_row(row)?);
        }
        Ok(sections)
    }

    fn get_section(
        &self,
        owner_id: OwnerId,
        section_id: SectionId,
    ) -> RepoResult<Option<Section>> {
        let section = self
            .conn
            .query_row(
                "SELECT id, owner_id, name
                 FROM sections
                 WHERE owner_id = ?1
                   AND id = ?2;",
                params![owner_id, section_id],
                parse_section_row,
            )
            .optional()?;
        Ok(section)
    }

    fn section_name_taken(&self, owner_id: OwnerId, name: &str) -> RepoResult<bool> {
        let taken: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sections
                WHERE owner_id = ?1
                  AND name = ?2
            );",
            params![owner_id, name],
            |row| row.get(0),
        )?;
        Ok(taken == 1)
    }

    fn create_section(&self, owner_id: OwnerId, name: &str) -> RepoResult<Section> {
        self.conn.execute(
            "INSERT INTO sections (owner_id, name) VALUES (?1, ?2);",
            params![owner_id, name],
        )?;
        Ok(Section {
            id: self.conn.last_insert_rowid(),
            owner_id,
            name: name.to_string(),
        })
    }

    fn rename_section(
        &self,
        owner_id: OwnerId,
        section_id: SectionId,
        name: &str,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE sections
             SET name = ?3
             WHERE owner_id = ?1
               AND id = ?2;",
            params![owner_id, section_id, name],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "section",
                id: section_id,
            });
        }
        Ok(())
    }

    fn delete_section(&self, owner_id: OwnerId, section_id: SectionId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM sections
             WHERE owner_id = ?1
               AND id = ?2;",
            params![owner_id, section_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "section",
                id: section_id,
            });
        }
        Ok(())
    }

    fn stats(&self, owner_id: OwnerId) -> RepoResult<PantryStats> {
        let (sections, articles): (i64, i64) = self.conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM sections WHERE owner_id = ?1),
                (SELECT COUNT(*)
                 FROM articles a
                 INNER JOIN sections s ON s.id = a.section_id
                 WHERE s.owner_id = ?1);",
            [owner_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(PantryStats {
            sections: count_to_u64(sections)?,
            articles: count_to_u64(articles)?,
        })
    }
}

fn parse_section_row(row: &Row<'_>) -> rusqlite::Result<Section> {
    Ok(Section {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        name: row.get("name")?,
    })
}

fn count_to_u64(value: i64) -> RepoResult<u64> {
    u64::try_from(value).map_err(|_| RepoError::InvalidData(format!("negative count `{value}`")))
}
