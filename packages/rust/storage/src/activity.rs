//! Reader activity: favorites, reading history, and comments.
//!
//! Users are opaque identifiers handed out by the auth provider; every
//! query is scoped to the caller's `user_id`.

use libsql::params;
use poetryhub_shared::{
    Comment, FavoriteAction, FavoriteEntry, HistoryEntry, PoemId, PoetryHubError, Result,
};
use uuid::Uuid;

use crate::catalog::{POEM_VIEW_WIDTH, poem_view_columns, row_to_poem_view};
use crate::{Storage, db_err, get_string, now_ts, parse_id, parse_ts};

impl Storage {
    // -----------------------------------------------------------------------
    // Favorites
    // -----------------------------------------------------------------------

    /// Add the poem to the user's favorites, or remove it if already there.
    pub async fn toggle_favorite(&self, user_id: &str, poem_id: &PoemId) -> Result<FavoriteAction> {
        self.check_writable()?;
        self.ensure_poem_exists(poem_id).await?;

        let removed = self
            .conn
            .execute(
                "DELETE FROM favorites WHERE user_id = ?1 AND poem_id = ?2",
                params![user_id, poem_id.to_string()],
            )
            .await
            .map_err(db_err)?;

        if removed > 0 {
            return Ok(FavoriteAction::Removed);
        }

        self.conn
            .execute(
                "INSERT INTO favorites (id, user_id, poem_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    Uuid::now_v7().to_string(),
                    user_id,
                    poem_id.to_string(),
                    now_ts()
                ],
            )
            .await
            .map_err(db_err)?;
        Ok(FavoriteAction::Added)
    }

    /// Whether the poem is in the user's favorites.
    pub async fn is_favorite(&self, user_id: &str, poem_id: &PoemId) -> Result<bool> {
        let mut rows = self
            .conn
            .query(
                "SELECT 1 FROM favorites WHERE user_id = ?1 AND poem_id = ?2",
                params![user_id, poem_id.to_string()],
            )
            .await
            .map_err(db_err)?;

        match rows.next().await {
            Ok(row) => Ok(row.is_some()),
            Err(e) => Err(db_err(e)),
        }
    }

    /// List the user's favorites, most recently added first.
    pub async fn list_favorites(&self, user_id: &str) -> Result<Vec<FavoriteEntry>> {
        let sql = format!(
            "SELECT {}, f.created_at
             FROM favorites f
             JOIN poems p ON p.id = f.poem_id
             JOIN poets po ON po.id = p.poet_id
             WHERE f.user_id = ?1
             ORDER BY f.created_at DESC, f.rowid DESC",
            poem_view_columns()
        );
        let mut rows = self
            .conn
            .query(&sql, params![user_id])
            .await
            .map_err(db_err)?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(FavoriteEntry {
                poem: row_to_poem_view(&row)?,
                favorited_at: parse_ts(&get_string(&row, POEM_VIEW_WIDTH)?)?,
            });
        }
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // Reading history
    // -----------------------------------------------------------------------

    /// Record that the user read a poem: refreshes the history entry and
    /// bumps the poem's view count.
    pub async fn record_read(&self, user_id: &str, poem_id: &PoemId) -> Result<()> {
        self.check_writable()?;
        self.ensure_poem_exists(poem_id).await?;

        self.conn
            .execute(
                "INSERT INTO reading_history (id, user_id, poem_id, read_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id, poem_id) DO UPDATE SET read_at = excluded.read_at",
                params![
                    Uuid::now_v7().to_string(),
                    user_id,
                    poem_id.to_string(),
                    now_ts()
                ],
            )
            .await
            .map_err(db_err)?;

        self.conn
            .execute(
                "UPDATE poems SET views = views + 1 WHERE id = ?1",
                params![poem_id.to_string()],
            )
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// List the user's most recently read poems.
    pub async fn list_history(&self, user_id: &str, limit: u32) -> Result<Vec<HistoryEntry>> {
        let sql = format!(
            "SELECT {}, h.read_at
             FROM reading_history h
             JOIN poems p ON p.id = h.poem_id
             JOIN poets po ON po.id = p.poet_id
             WHERE h.user_id = ?1
             ORDER BY h.read_at DESC
             LIMIT ?2",
            poem_view_columns()
        );
        let mut rows = self
            .conn
            .query(&sql, params![user_id, i64::from(limit)])
            .await
            .map_err(db_err)?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(HistoryEntry {
                poem: row_to_poem_view(&row)?,
                read_at: parse_ts(&get_string(&row, POEM_VIEW_WIDTH)?)?,
            });
        }
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // Comments
    // -----------------------------------------------------------------------

    /// Add a comment to a poem.
    pub async fn add_comment(&self, poem_id: &PoemId, user_id: &str, body: &str) -> Result<Comment> {
        self.check_writable()?;
        let body = body.trim();
        if body.is_empty() {
            return Err(PoetryHubError::validation("comment must not be empty"));
        }
        self.ensure_poem_exists(poem_id).await?;

        let id = Uuid::now_v7().to_string();
        let created_at = now_ts();
        self.conn
            .execute(
                "INSERT INTO comments (id, poem_id, user_id, body, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id.as_str(),
                    poem_id.to_string(),
                    user_id,
                    body,
                    created_at.as_str()
                ],
            )
            .await
            .map_err(db_err)?;

        Ok(Comment {
            id,
            poem_id: poem_id.clone(),
            user_id: user_id.to_string(),
            body: body.to_string(),
            created_at: parse_ts(&created_at)?,
        })
    }

    /// List a poem's comments, newest first.
    pub async fn list_comments(&self, poem_id: &PoemId) -> Result<Vec<Comment>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, poem_id, user_id, body, created_at FROM comments
                 WHERE poem_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
                params![poem_id.to_string()],
            )
            .await
            .map_err(db_err)?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(Comment {
                id: get_string(&row, 0)?,
                poem_id: parse_id(&get_string(&row, 1)?)?,
                user_id: get_string(&row, 2)?,
                body: get_string(&row, 3)?,
                created_at: parse_ts(&get_string(&row, 4)?)?,
            });
        }
        Ok(results)
    }

    /// Delete one of the user's own comments. Returns whether a comment was removed.
    pub async fn delete_comment(&self, comment_id: &str, user_id: &str) -> Result<bool> {
        self.check_writable()?;
        let removed = self
            .conn
            .execute(
                "DELETE FROM comments WHERE id = ?1 AND user_id = ?2",
                params![comment_id, user_id],
            )
            .await
            .map_err(db_err)?;
        Ok(removed > 0)
    }
}
