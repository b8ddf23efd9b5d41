//! Article repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist articles with merge-on-insert semantics.
//! - Serve owner-scoped reads ordered by `(expiration, id)`.
//! - Answer predecessor/successor queries without materializing the list.
//!
//! # Invariants
//! - `(section_id, name, expiration)` is unique; the absent expiration is
//!   stored as the sentinel key so that it collides with itself.
//! - Merge is one atomic upsert per row: `NULL + q` stays `NULL`.
//! - Ordering is `expiration ASC, id ASC` everywhere, sentinel last.
//! - Neighbour lookups are bounded index scans (`LIMIT 1` over
//!   `idx_articles_section_order` / `idx_articles_order`).

use super::schema::ensure_table_ready;
use super::{RepoError, RepoResult};
use crate::model::article::{Article, ArticleId, Neighbors};
use crate::model::expiration::{from_storage_key, to_storage_key};
use crate::model::section::{OwnerId, SectionId, SectionScope};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const OWNED_ARTICLE_SELECT_SQL: &str = "SELECT
    a.id AS id,
    a.section_id AS section_id,
    a.name AS name,
    a.expiration AS expiration,
    a.quantity AS quantity
FROM articles a
INNER JOIN sections s ON s.id = a.section_id";

/// Fully resolved article write.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleDraft {
    pub section_id: SectionId,
    pub name: String,
    pub expiration: Option<NaiveDate>,
    pub quantity: Option<f64>,
}

/// Repository interface for article operations.
///
/// Callers verify section ownership before writes; reads are scoped by
/// owner inside the queries.
pub trait ArticleRepository {
    /// Inserts or merges every draft inside one transaction.
    fn upsert_articles(&self, drafts: &[ArticleDraft]) -> RepoResult<()>;
    /// Loads one article whose section belongs to `owner_id`.
    fn get_article(&self, owner_id: OwnerId, article_id: ArticleId)
        -> RepoResult<Option<Article>>;
    /// Lists articles in scope, ordered, optionally filtered by name.
    ///
    /// `name_filter` is a case-insensitive substring; empty matches all.
    fn list_articles(
        &self,
        owner_id: OwnerId,
        scope: SectionScope,
        name_filter: &str,
    ) -> RepoResult<Vec<Article>>;
    /// Returns whether another article already occupies the draft's key.
    fn key_taken_by_other(&self, draft: &ArticleDraft, article_id: ArticleId)
        -> RepoResult<bool>;
    /// Overwrites section, name, expiration and quantity of one article.
    fn update_article(&self, article_id: ArticleId, draft: &ArticleDraft) -> RepoResult<()>;
    /// Returns neighbours of `article_id` in scope, `None` when the article
    /// is not visible in that scope.
    fn neighbors(
        &self,
        owner_id: OwnerId,
        scope: SectionScope,
        article_id: ArticleId,
    ) -> RepoResult<Option<Neighbors>>;
    /// Deletes one owned article and returns the id that followed it in the
    /// owner's global order at deletion time.
    fn delete_article(&self, owner_id: OwnerId, article_id: ArticleId)
        -> RepoResult<Option<ArticleId>>;
}

/// SQLite-backed article repository.
pub struct SqliteArticleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteArticleRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(
            conn,
            "articles",
            &["id", "section_id", "name", "expiration", "quantity"],
        )?;
        Ok(Self { conn })
    }
}

impl ArticleRepository for SqliteArticleRepository<'_> {
    fn upsert_articles(&self, drafts: &[ArticleDraft]) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO articles (section_id, name, expiration, quantity)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (section_id, name, expiration)
                 DO UPDATE SET quantity = articles.quantity + excluded.quantity;",
            )?;
            for draft in drafts {
                stmt.execute(params![
                    draft.section_id,
                    draft.name.as_str(),
                    to_storage_key(draft.expiration),
                    draft.quantity,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn get_article(
        &self,
        owner_id: OwnerId,
        article_id: ArticleId,
    ) -> RepoResult<Option<Article>> {
        let mut stmt = self.conn.prepare(&format!(
            "{OWNED_ARTICLE_SELECT_SQL}
             WHERE s.owner_id = ?1
               AND a.id = ?2;"
        ))?;
        let mut rows = stmt.query(params![owner_id, article_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_article_row(row)?));
        }
        Ok(None)
    }

    fn list_articles(
        &self,
        owner_id: OwnerId,
        scope: SectionScope,
        name_filter: &str,
    ) -> RepoResult<Vec<Article>> {
        let mut articles = Vec::new();
        match scope {
            SectionScope::All => {
                let mut stmt = self.conn.prepare(&format!(
                    "{OWNED_ARTICLE_SELECT_SQL}
                     WHERE s.owner_id = ?1
                     ORDER BY a.expiration ASC, a.id ASC;"
                ))?;
                let mut rows = stmt.query([owner_id])?;
                while let Some(row) = rows.next()? {
                    articles.push(parse_article_row(row)?);
                }
            }
            SectionScope::Section(section_id) => {
                let mut stmt = self.conn.prepare(&format!(
                    "{OWNED_ARTICLE_SELECT_SQL}
                     WHERE s.owner_id = ?1
                       AND a.section_id = ?2
                     ORDER BY a.expiration ASC, a.id ASC;"
                ))?;
                let mut rows = stmt.query(params![owner_id, section_id])?;
                while let Some(row) = rows.next()? {
                    articles.push(parse_article_row(row)?);
                }
            }
        }

        if !name_filter.is_empty() {
            let needle = name_filter.to_lowercase();
            articles.retain(|article| article.name.to_lowercase().contains(&needle));
        }
        Ok(articles)
    }

    fn key_taken_by_other(
        &self,
        draft: &ArticleDraft,
        article_id: ArticleId,
    ) -> RepoResult<bool> {
        let taken: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM articles
                WHERE section_id = ?1
                  AND name = ?2
                  AND expiration = ?3
                  AND id != ?4
            );",
            params![
                draft.section_id,
                draft.name.as_str(),
                to_storage_key(draft.expiration),
                article_id,
            ],
            |row| row.get(0),
        )?;
        Ok(taken == 1)
    }

    fn update_article(&self, article_id: ArticleId, draft: &ArticleDraft) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE articles
             SET section_id = ?2,
                 name = ?3,
                 expiration = ?4,
                 quantity = ?5
             WHERE id = ?1;",
            params![
                article_id,
                draft.section_id,
                draft.name.as_str(),
                to_storage_key(draft.expiration),
                draft.quantity,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "article",
                id: article_id,
            });
        }
        Ok(())
    }

    fn neighbors(
        &self,
        owner_id: OwnerId,
        scope: SectionScope,
        article_id: ArticleId,
    ) -> RepoResult<Option<Neighbors>> {
        let Some(anchor) = load_anchor(self.conn, owner_id, article_id)? else {
            return Ok(None);
        };
        if let SectionScope::Section(section_id) = scope {
            if anchor.section_id != section_id {
                return Ok(None);
            }
        }

        Ok(Some(Neighbors {
            prev: find_neighbor(self.conn, owner_id, scope, &anchor, Direction::Prev)?,
            next: find_neighbor(self.conn, owner_id, scope, &anchor, Direction::Next)?,
        }))
    }

    fn delete_article(
        &self,
        owner_id: OwnerId,
        article_id: ArticleId,
    ) -> RepoResult<Option<ArticleId>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let anchor = load_anchor(&tx, owner_id, article_id)?.ok_or(RepoError::NotFound {
            entity: "article",
            id: article_id,
        })?;
        let next = find_neighbor(&tx, owner_id, SectionScope::All, &anchor, Direction::Next)?;

        tx.execute("DELETE FROM articles WHERE id = ?1;", [article_id])?;
        tx.commit()?;
        Ok(next)
    }
}

/// Position of one article in the `(expiration, id)` order.
struct Anchor {
    id: ArticleId,
    section_id: SectionId,
    expiration_key: String,
}

#[derive(Clone, Copy)]
enum Direction {
    Prev,
    Next,
}

fn load_anchor(
    conn: &Connection,
    owner_id: OwnerId,
    article_id: ArticleId,
) -> RepoResult<Option<Anchor>> {
    let anchor = conn
        .query_row(
            "SELECT a.id, a.section_id, a.expiration
             FROM articles a
             INNER JOIN sections s ON s.id = a.section_id
             WHERE s.owner_id = ?1
               AND a.id = ?2;",
            params![owner_id, article_id],
            |row| {
                Ok(Anchor {
                    id: row.get(0)?,
                    section_id: row.get(1)?,
                    expiration_key: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(anchor)
}

fn find_neighbor(
    conn: &Connection,
    owner_id: OwnerId,
    scope: SectionScope,
    anchor: &Anchor,
    direction: Direction,
) -> RepoResult<Option<ArticleId>> {
    let sql = match (scope, direction) {
        (SectionScope::Section(_), Direction::Prev) => {
            "SELECT id
             FROM articles
             WHERE section_id = ?1
               AND (expiration, id) < (?2, ?3)
             ORDER BY expiration DESC, id DESC
             LIMIT 1;"
        }
        (SectionScope::Section(_), Direction::Next) => {
            "SELECT id
             FROM articles
             WHERE section_id = ?1
               AND (expiration, id) > (?2, ?3)
             ORDER BY expiration ASC, id ASC
             LIMIT 1;"
        }
        (SectionScope::All, Direction::Prev) => {
            "SELECT a.id
             FROM articles a
             INNER JOIN sections s ON s.id = a.section_id
             WHERE s.owner_id = ?1
               AND (a.expiration, a.id) < (?2, ?3)
             ORDER BY a.expiration DESC, a.id DESC
             LIMIT 1;"
        }
        (SectionScope::All, Direction::Next) => {
            "SELECT a.id
             FROM articles a
             INNER JOIN sections s ON s.id = a.section_id
             WHERE s.owner_id = ?1
               AND (a.expiration, a.id) > (?2, ?3)
             ORDER BY a.expiration ASC, a.id ASC
             LIMIT 1;"
        }
    };
    let partition = match scope {
        SectionScope::Section(_) => anchor.section_id,
        SectionScope::All => owner_id,
    };

    let neighbor = conn
        .query_row(
            sql,
            params![partition, anchor.expiration_key.as_str(), anchor.id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(neighbor)
}

fn parse_article_row(row: &Row<'_>) -> RepoResult<Article> {
    let expiration_key: String = row.get("expiration")?;
    let expiration = from_storage_key(&expiration_key).map_err(RepoError::InvalidData)?;

    Ok(Article {
        id: row.get("id")?,
        section_id: row.get("section_id")?,
        name: row.get("name")?,
        expiration,
        quantity: row.get("quantity")?,
    })
}
