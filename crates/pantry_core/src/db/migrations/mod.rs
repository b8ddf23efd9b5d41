//! Pantry schema migrations.
//!
//! Each step is one SQL file applied in a single transaction together with
//! the `PRAGMA user_version` bump, so a failed step leaves the store at the
//! last good version.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        version: 2,
        name: "article_order_indexes",
        sql: include_str!("0002_article_order_indexes.sql"),
    },
];

/// Schema version this build writes and expects.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings `conn` up to [`latest_version`].
///
/// Stores written by a newer build are refused rather than downgraded.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > from_version) {
        apply_one(conn, migration).map_err(|source| {
            error!(
                "event=db_migrate module=db status=error version={} name={} error={}",
                migration.version, migration.name, source
            );
            DbError::Migration {
                version: migration.version,
                name: migration.name,
                source,
            }
        })?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    Ok(())
}

fn apply_one(conn: &mut Connection, migration: &Migration) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.pragma_update(None, "user_version", migration.version)?;
    tx.commit()
}
