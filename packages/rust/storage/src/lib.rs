//! Turso Embedded / libSQL storage layer for the poetry catalog.
//!
//! The [`Storage`] struct wraps a libSQL database holding poets, poems,
//! themes, reader activity (favorites, reading history, comments,
//! collections), the import run log, and the AI analysis cache.
//!
//! **Access rules:**
//! - CLI commands that write: read-write via [`Storage::open`]
//! - Browsing commands: read-only via [`Storage::open_readonly`]

mod activity;
mod analytics;
mod cache;
mod catalog;
mod collections;
mod migrations;
mod runs;

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{Connection, Database, params};
use poetryhub_shared::{PoetryHubError, Result};

pub use catalog::{CatalogCounts, PoemQuery};

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

impl Storage {
    /// Open or create a database at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PoetryHubError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(db_err)?;

        let conn = db.connect().map_err(db_err)?;

        let storage = Self {
            db,
            conn,
            readonly: false,
        };
        storage.enable_foreign_keys().await?;
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open a database at `path` in read-only mode.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PoetryHubError::Storage(format!(
                "database not found at {}",
                path.display()
            )));
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(db_err)?;

        let conn = db.connect().map_err(db_err)?;

        Ok(Self {
            db,
            conn,
            readonly: true,
        })
    }

    async fn enable_foreign_keys(&self) -> Result<()> {
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        PoetryHubError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(PoetryHubError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Row helpers
// ---------------------------------------------------------------------------

pub(crate) fn db_err(e: libsql::Error) -> PoetryHubError {
    PoetryHubError::Storage(e.to_string())
}

/// Current time as fixed-width RFC 3339, so text ordering matches time ordering.
pub(crate) fn now_ts() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| PoetryHubError::Storage(format!("invalid date '{s}': {e}")))
}

pub(crate) fn parse_id<T>(s: &str) -> Result<T>
where
    T: FromStr<Err = uuid::Error>,
{
    s.parse()
        .map_err(|e| PoetryHubError::Storage(format!("invalid id '{s}': {e}")))
}

pub(crate) fn get_string(row: &libsql::Row, idx: i32) -> Result<String> {
    row.get::<String>(idx).map_err(db_err)
}

pub(crate) fn get_opt_i32(row: &libsql::Row, idx: i32) -> Option<i32> {
    row.get::<i64>(idx).ok().and_then(|v| i32::try_from(v).ok())
}

/// Build a `LIKE` pattern matching `needle` anywhere, with wildcards escaped.
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.trim().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}


#[cfg(test)]
mod tests {
    use super::test_support::test_storage;
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn open_and_migrate() {
        let storage = test_storage().await;
        let version = storage.get_schema_version().await;
        assert_eq!(version, 3);
    }

    #[tokio::test]
    async fn idempotent_migration() {
        let tmp = std::env::temp_dir().join(format!("ph_test_{}.db", Uuid::now_v7()));
        let _s1 = Storage::open(&tmp).await.expect("first open");
        drop(_s1);
        let s2 = Storage::open(&tmp).await.expect("second open");
        assert_eq!(s2.get_schema_version().await, 3);
        // Seeded themes are not duplicated by a second open
        assert_eq!(s2.list_themes().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn readonly_rejects_writes() {
        let tmp = std::env::temp_dir().join(format!("ph_test_{}.db", Uuid::now_v7()));
        let rw = Storage::open(&tmp).await.unwrap();
        rw.insert_poet(&poetryhub_shared::NewPoet::named("Rumi", None))
            .await
            .unwrap();
        drop(rw);

        let ro = Storage::open_readonly(&tmp).await.unwrap();
        assert!(ro.find_poet_by_name("rumi").await.unwrap().is_some());
        let result = ro
            .insert_poet(&poetryhub_shared::NewPoet::named("Hafez", None))
            .await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("read-only"));
    }

    #[tokio::test]
    async fn readonly_requires_existing_file() {
        let tmp = std::env::temp_dir().join(format!("ph_missing_{}.db", Uuid::now_v7()));
        assert!(Storage::open_readonly(&tmp).await.is_err());
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rose"), "%rose%");
        assert_eq!(like_pattern(" 100%_done "), "%100\\%\\_done%");
    }

    #[test]
    fn timestamps_are_fixed_width() {
        let a = now_ts();
        assert_eq!(a.len(), "2026-01-01T00:00:00.000000Z".len());
        assert!(parse_ts(&a).is_ok());
        assert!(parse_ts("yesterday").is_err());
    }
}
