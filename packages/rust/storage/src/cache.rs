//! Completion result cache for poem analysis.

use libsql::params;
use poetryhub_shared::{PoemId, Result};
use uuid::Uuid;

use crate::{Storage, db_err, get_string, now_ts};

impl Storage {
    /// Get a cached analysis result.
    pub async fn get_ai_cache(
        &self,
        poem_id: &PoemId,
        action: &str,
        prompt_hash: &str,
        model_id: &str,
    ) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT result_text FROM ai_cache
                 WHERE poem_id = ?1 AND action = ?2 AND prompt_hash = ?3 AND model_id = ?4",
                params![poem_id.to_string(), action, prompt_hash, model_id],
            )
            .await
            .map_err(db_err)?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(get_string(&row, 0)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    /// Store an analysis result in the cache (upserts).
    pub async fn set_ai_cache(
        &self,
        poem_id: &PoemId,
        action: &str,
        prompt_hash: &str,
        model_id: &str,
        result_text: &str,
    ) -> Result<()> {
        self.check_writable()?;
        self.conn
            .execute(
                "INSERT INTO ai_cache (id, poem_id, action, prompt_hash, model_id, result_text, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(poem_id, action, prompt_hash, model_id) DO UPDATE SET
                   result_text = excluded.result_text,
                   created_at = excluded.created_at",
                params![
                    Uuid::now_v7().to_string(),
                    poem_id.to_string(),
                    action,
                    prompt_hash,
                    model_id,
                    result_text,
                    now_ts()
                ],
            )
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Drop every cached result for a poem.
    pub async fn invalidate_ai_cache(&self, poem_id: &PoemId) -> Result<()> {
        self.check_writable()?;
        self.conn
            .execute(
                "DELETE FROM ai_cache WHERE poem_id = ?1",
                params![poem_id.to_string()],
            )
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{seed_poem, test_storage};

    #[tokio::test]
    async fn ai_cache_roundtrip() {
        let storage = test_storage().await;
        let (_, poem) = seed_poem(&storage, "Rainer Maria Rilke", "Archaic Torso of Apollo").await;

        // Miss
        let cached = storage
            .get_ai_cache(&poem.id, "analyze", "hash1", "model-a")
            .await
            .expect("get cache miss");
        assert!(cached.is_none());

        // Set, then overwrite
        storage
            .set_ai_cache(&poem.id, "analyze", "hash1", "model-a", "first")
            .await
            .expect("set cache");
        storage
            .set_ai_cache(&poem.id, "analyze", "hash1", "model-a", "second")
            .await
            .expect("overwrite cache");

        let cached = storage
            .get_ai_cache(&poem.id, "analyze", "hash1", "model-a")
            .await
            .expect("get cache hit");
        assert_eq!(cached.as_deref(), Some("second"));

        // Keyed by model too
        assert!(
            storage
                .get_ai_cache(&poem.id, "analyze", "hash1", "model-b")
                .await
                .unwrap()
                .is_none()
        );

        storage.invalidate_ai_cache(&poem.id).await.expect("invalidate");
        assert!(
            storage
                .get_ai_cache(&poem.id, "analyze", "hash1", "model-a")
                .await
                .unwrap()
                .is_none()
        );
    }
}
