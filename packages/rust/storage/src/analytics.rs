//! Per-poet engagement stats built from views, favorites, and comments.

use libsql::params;
use poetryhub_shared::{PoemStats, PoetAnalytics, PoetId, Result};

use crate::{Storage, db_err, get_string, parse_id, parse_ts};

impl Storage {
    /// Engagement totals for a poet's poems, or `None` for an unknown poet.
    pub async fn poet_analytics(&self, poet_id: &PoetId) -> Result<Option<PoetAnalytics>> {
        if self.get_poet(poet_id).await?.is_none() {
            return Ok(None);
        }

        let mut rows = self
            .conn
            .query(
                "SELECT p.id, p.title, p.views, p.created_at,
                        (SELECT COUNT(*) FROM favorites f WHERE f.poem_id = p.id),
                        (SELECT COUNT(*) FROM comments c WHERE c.poem_id = p.id)
                 FROM poems p
                 WHERE p.poet_id = ?1
                 ORDER BY p.created_at DESC, p.rowid DESC",
                params![poet_id.to_string()],
            )
            .await
            .map_err(db_err)?;

        let mut poems = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            poems.push(PoemStats {
                poem_id: parse_id(&get_string(&row, 0)?)?,
                title: get_string(&row, 1)?,
                views: count(&row, 2)?,
                created_at: parse_ts(&get_string(&row, 3)?)?,
                favorites: count(&row, 4)?,
                comments: count(&row, 5)?,
            });
        }

        let total_poems = poems.len() as u64;
        let total_views = poems.iter().map(|p| p.views).sum();
        let total_favorites = poems.iter().map(|p| p.favorites).sum();
        let total_comments = poems.iter().map(|p| p.comments).sum();

        Ok(Some(PoetAnalytics {
            poet_id: poet_id.clone(),
            total_poems,
            total_views,
            total_favorites,
            total_comments,
            average_views: rounded_average(total_views, total_poems),
            average_favorites: rounded_average(total_favorites, total_poems),
            poems,
        }))
    }
}

fn count(row: &libsql::Row, idx: i32) -> Result<u64> {
    Ok(row.get::<i64>(idx).map_err(db_err)?.max(0) as u64)
}

/// `total / n` rounded half up; zero when there is nothing to average.
fn rounded_average(total: u64, n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    (total * 2 + n) / (n * 2)
}

#[cfg(test)]
mod tests {
    use crate::test_support::{seed_poem, test_storage};

    use super::*;

    #[tokio::test]
    async fn totals_and_averages_per_poet() {
        let storage = test_storage().await;
        let (poet, ode) = seed_poem(&storage, "John Keats", "Ode to a Nightingale").await;
        let (_, autumn) = seed_poem(&storage, "John Keats", "To Autumn").await;
        let (_, other) = seed_poem(&storage, "Percy Shelley", "Ozymandias").await;

        for user in ["alice", "bob", "carol"] {
            storage.record_read(user, &ode.id).await.unwrap();
        }
        storage.record_read("alice", &autumn.id).await.unwrap();
        storage.toggle_favorite("alice", &ode.id).await.unwrap();
        storage.toggle_favorite("bob", &ode.id).await.unwrap();
        storage.toggle_favorite("alice", &autumn.id).await.unwrap();
        storage.add_comment(&autumn.id, "bob", "Season of mists").await.unwrap();
        // Activity on another poet's poem is not counted
        storage.record_read("alice", &other.id).await.unwrap();
        storage.add_comment(&other.id, "alice", "Look on my works").await.unwrap();

        let stats = storage
            .poet_analytics(&poet.id)
            .await
            .unwrap()
            .expect("known poet");

        assert_eq!(stats.total_poems, 2);
        assert_eq!(stats.total_views, 4);
        assert_eq!(stats.total_favorites, 3);
        assert_eq!(stats.total_comments, 1);
        assert_eq!(stats.average_views, 2);
        assert_eq!(stats.average_favorites, 2);

        // Newest first
        assert_eq!(stats.poems[0].title, "To Autumn");
        assert_eq!(stats.poems[0].comments, 1);
        assert_eq!(stats.poems[1].views, 3);
        assert_eq!(stats.poems[1].favorites, 2);
    }

    #[tokio::test]
    async fn poet_without_poems_has_zero_stats() {
        let storage = test_storage().await;
        let poet = storage
            .insert_poet(&poetryhub_shared::NewPoet::named("Basho", None))
            .await
            .unwrap();

        let stats = storage.poet_analytics(&poet.id).await.unwrap().unwrap();
        assert_eq!(stats.total_poems, 0);
        assert_eq!(stats.average_views, 0);
        assert!(stats.poems.is_empty());

        assert!(storage.poet_analytics(&PoetId::new()).await.unwrap().is_none());
    }

    #[test]
    fn averages_round_half_up() {
        assert_eq!(rounded_average(0, 0), 0);
        assert_eq!(rounded_average(3, 2), 2);
        assert_eq!(rounded_average(4, 3), 1);
        assert_eq!(rounded_average(5, 3), 2);
    }
}
