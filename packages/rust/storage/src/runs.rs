//! Import run log.

use libsql::params;
use poetryhub_shared::{ImportRun, PoetryHubError, Result};
use uuid::Uuid;

use crate::{Storage, db_err, get_string, now_ts, parse_ts};

impl Storage {
    /// Insert a new import run. Returns the generated run ID.
    pub async fn insert_import_run(&self, source: &str) -> Result<String> {
        self.check_writable()?;
        let id = Uuid::now_v7().to_string();
        self.conn
            .execute(
                "INSERT INTO import_runs (id, source, started_at) VALUES (?1, ?2, ?3)",
                params![id.as_str(), source, now_ts()],
            )
            .await
            .map_err(db_err)?;
        Ok(id)
    }

    /// Mark an import run finished and store its summary.
    pub async fn finish_import_run(&self, run_id: &str, summary_json: &str) -> Result<()> {
        self.check_writable()?;
        self.conn
            .execute(
                "UPDATE import_runs SET finished_at = ?1, summary_json = ?2 WHERE id = ?3",
                params![now_ts(), summary_json, run_id],
            )
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// List import runs, most recent first.
    pub async fn list_import_runs(&self, limit: u32) -> Result<Vec<ImportRun>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, source, started_at, finished_at, summary_json FROM import_runs
                 ORDER BY started_at DESC, rowid DESC
                 LIMIT ?1",
                params![i64::from(limit)],
            )
            .await
            .map_err(db_err)?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let finished_at = match row.get::<String>(3).ok() {
                Some(s) => Some(parse_ts(&s)?),
                None => None,
            };
            let summary = match row.get::<String>(4).ok() {
                Some(s) => Some(serde_json::from_str(&s).map_err(|e| {
                    PoetryHubError::Storage(format!("invalid import summary: {e}"))
                })?),
                None => None,
            };
            results.push(ImportRun {
                id: get_string(&row, 0)?,
                source: get_string(&row, 1)?,
                started_at: parse_ts(&get_string(&row, 2)?)?,
                finished_at,
                summary,
            });
        }
        Ok(results)
    }
}
