//! Reader collections: named, optionally public lists of poems.
//!
//! Only the owner may change a collection. Private collections are visible
//! to their owner alone.

use libsql::params;
use poetryhub_shared::{
    Collection, CollectionEntry, CollectionId, NewCollection, PoemId, PoetryHubError, Result,
};

use crate::catalog::{POEM_VIEW_WIDTH, poem_view_columns, row_to_poem_view};
use crate::{Storage, db_err, get_string, now_ts, parse_id, parse_ts};

const COLLECTION_COLUMNS: &str = "c.id, c.user_id, c.name, c.description, c.is_public, \
     c.created_at, (SELECT COUNT(*) FROM collection_poems cp WHERE cp.collection_id = c.id)";

impl Storage {
    /// Create a collection owned by `user_id`.
    pub async fn create_collection(
        &self,
        user_id: &str,
        collection: &NewCollection,
    ) -> Result<Collection> {
        self.check_writable()?;
        let name = collection.name.trim();
        if name.is_empty() {
            return Err(PoetryHubError::validation("collection name must not be empty"));
        }
        let description = collection
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        let id = CollectionId::new();
        let created_at = now_ts();
        self.conn
            .execute(
                "INSERT INTO collections (id, user_id, name, description, is_public, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id.to_string(),
                    user_id,
                    name,
                    description,
                    i64::from(collection.is_public),
                    created_at.as_str(),
                ],
            )
            .await
            .map_err(db_err)?;

        Ok(Collection {
            id,
            user_id: user_id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            is_public: collection.is_public,
            poem_count: 0,
            created_at: parse_ts(&created_at)?,
        })
    }

    /// Get a collection by ID.
    pub async fn get_collection(&self, id: &CollectionId) -> Result<Option<Collection>> {
        let sql = format!("SELECT {COLLECTION_COLUMNS} FROM collections c WHERE c.id = ?1");
        let mut rows = self
            .conn
            .query(&sql, params![id.to_string()])
            .await
            .map_err(db_err)?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_collection(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    /// List a user's collections, or every public collection when `user_id`
    /// is `None`. Newest first.
    pub async fn list_collections(&self, user_id: Option<&str>) -> Result<Vec<Collection>> {
        let sql = format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections c
             WHERE (?1 IS NULL AND c.is_public = 1) OR c.user_id = ?1
             ORDER BY c.created_at DESC, c.rowid DESC"
        );
        let mut rows = self
            .conn
            .query(&sql, params![user_id])
            .await
            .map_err(db_err)?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_collection(&row)?);
        }
        Ok(results)
    }

    /// Delete one of the user's collections. Returns whether it was removed.
    pub async fn delete_collection(&self, id: &CollectionId, user_id: &str) -> Result<bool> {
        self.check_writable()?;
        let removed = self
            .conn
            .execute(
                "DELETE FROM collections WHERE id = ?1 AND user_id = ?2",
                params![id.to_string(), user_id],
            )
            .await
            .map_err(db_err)?;
        Ok(removed > 0)
    }

    /// Add a poem to one of the user's collections. Returns `false` if it was
    /// already there.
    pub async fn add_to_collection(
        &self,
        id: &CollectionId,
        user_id: &str,
        poem_id: &PoemId,
    ) -> Result<bool> {
        self.check_writable()?;
        self.owned_collection(id, user_id).await?;
        self.ensure_poem_exists(poem_id).await?;

        let added = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO collection_poems (collection_id, poem_id, added_at)
                 VALUES (?1, ?2, ?3)",
                params![id.to_string(), poem_id.to_string(), now_ts()],
            )
            .await
            .map_err(db_err)?;
        Ok(added > 0)
    }

    /// Remove a poem from one of the user's collections. Returns whether it
    /// was there.
    pub async fn remove_from_collection(
        &self,
        id: &CollectionId,
        user_id: &str,
        poem_id: &PoemId,
    ) -> Result<bool> {
        self.check_writable()?;
        self.owned_collection(id, user_id).await?;

        let removed = self
            .conn
            .execute(
                "DELETE FROM collection_poems WHERE collection_id = ?1 AND poem_id = ?2",
                params![id.to_string(), poem_id.to_string()],
            )
            .await
            .map_err(db_err)?;
        Ok(removed > 0)
    }

    /// Poems in a collection, most recently added first.
    ///
    /// `viewer` must own the collection unless it is public.
    pub async fn collection_poems(
        &self,
        id: &CollectionId,
        viewer: Option<&str>,
    ) -> Result<Vec<CollectionEntry>> {
        let collection = self.get_collection(id).await?;
        let visible = collection
            .as_ref()
            .is_some_and(|c| c.is_public || viewer == Some(c.user_id.as_str()));
        if !visible {
            return Err(not_found(id));
        }

        let sql = format!(
            "SELECT {}, cp.added_at
             FROM collection_poems cp
             JOIN poems p ON p.id = cp.poem_id
             JOIN poets po ON po.id = p.poet_id
             WHERE cp.collection_id = ?1
             ORDER BY cp.added_at DESC, cp.rowid DESC",
            poem_view_columns()
        );
        let mut rows = self
            .conn
            .query(&sql, params![id.to_string()])
            .await
            .map_err(db_err)?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(CollectionEntry {
                poem: row_to_poem_view(&row)?,
                added_at: parse_ts(&get_string(&row, POEM_VIEW_WIDTH)?)?,
            });
        }
        Ok(results)
    }

    async fn owned_collection(&self, id: &CollectionId, user_id: &str) -> Result<Collection> {
        match self.get_collection(id).await? {
            Some(collection) if collection.user_id == user_id => Ok(collection),
            _ => Err(not_found(id)),
        }
    }
}

fn not_found(id: &CollectionId) -> PoetryHubError {
    PoetryHubError::validation(format!("collection {id} not found"))
}

fn row_to_collection(row: &libsql::Row) -> Result<Collection> {
    Ok(Collection {
        id: parse_id(&get_string(row, 0)?)?,
        user_id: get_string(row, 1)?,
        name: get_string(row, 2)?,
        description: row.get::<String>(3).ok(),
        is_public: row.get::<i64>(4).map_err(db_err)? != 0,
        created_at: parse_ts(&get_string(row, 5)?)?,
        poem_count: row.get::<i64>(6).map_err(db_err)?.max(0) as u64,
    })
}

#[cfg(test)]
mod tests {
    use crate::test_support::{seed_poem, test_storage};

    use super::*;

    fn named(name: &str, is_public: bool) -> NewCollection {
        NewCollection {
            name: name.into(),
            description: None,
            is_public,
        }
    }

    #[tokio::test]
    async fn create_and_list_by_owner_or_public() {
        let storage = test_storage().await;
        let private = storage
            .create_collection(
                "alice",
                &NewCollection {
                    name: "  Night reading ".into(),
                    description: Some("   ".into()),
                    is_public: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(private.name, "Night reading");
        assert_eq!(private.description, None);

        storage
            .create_collection("alice", &named("Sonnets", true))
            .await
            .unwrap();
        storage
            .create_collection("bob", &named("Haiku", true))
            .await
            .unwrap();

        let mine: Vec<_> = storage
            .list_collections(Some("alice"))
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(mine, vec!["Sonnets", "Night reading"]);

        let public: Vec<_> = storage
            .list_collections(None)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(public, vec!["Haiku", "Sonnets"]);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let storage = test_storage().await;
        let result = storage.create_collection("alice", &named(" ", false)).await;
        assert!(matches!(result, Err(PoetryHubError::Validation { .. })));
    }

    #[tokio::test]
    async fn poems_added_and_removed_by_owner_only() {
        let storage = test_storage().await;
        let (_, first) = seed_poem(&storage, "Matsuo Basho", "Old Pond").await;
        let (_, second) = seed_poem(&storage, "Kobayashi Issa", "Snail").await;
        let collection = storage
            .create_collection("alice", &named("Haiku", false))
            .await
            .unwrap();

        assert!(storage.add_to_collection(&collection.id, "alice", &first.id).await.unwrap());
        assert!(storage.add_to_collection(&collection.id, "alice", &second.id).await.unwrap());
        assert!(!storage.add_to_collection(&collection.id, "alice", &first.id).await.unwrap());

        let other_user = storage.add_to_collection(&collection.id, "bob", &first.id).await;
        assert!(matches!(other_user, Err(PoetryHubError::Validation { .. })));
        let unknown_poem = storage
            .add_to_collection(&collection.id, "alice", &PoemId::new())
            .await;
        assert!(matches!(unknown_poem, Err(PoetryHubError::Validation { .. })));

        let entries = storage
            .collection_poems(&collection.id, Some("alice"))
            .await
            .unwrap();
        let titles: Vec<_> = entries.iter().map(|e| e.poem.poem.title.as_str()).collect();
        assert_eq!(titles, vec!["Snail", "Old Pond"]);
        assert_eq!(
            storage.get_collection(&collection.id).await.unwrap().unwrap().poem_count,
            2
        );

        assert!(
            storage
                .remove_from_collection(&collection.id, "alice", &first.id)
                .await
                .unwrap()
        );
        assert!(
            !storage
                .remove_from_collection(&collection.id, "alice", &first.id)
                .await
                .unwrap()
        );
        assert_eq!(
            storage
                .collection_poems(&collection.id, Some("alice"))
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn private_collection_hidden_from_others() {
        let storage = test_storage().await;
        let private = storage
            .create_collection("alice", &named("Secret", false))
            .await
            .unwrap();
        let public = storage
            .create_collection("alice", &named("Shared", true))
            .await
            .unwrap();

        assert!(storage.collection_poems(&private.id, Some("bob")).await.is_err());
        assert!(storage.collection_poems(&private.id, None).await.is_err());
        assert!(storage.collection_poems(&public.id, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_by_owner_cascades() {
        let storage = test_storage().await;
        let (_, poem) = seed_poem(&storage, "Mary Oliver", "Wild Geese").await;
        let collection = storage
            .create_collection("alice", &named("Keep", true))
            .await
            .unwrap();
        storage
            .add_to_collection(&collection.id, "alice", &poem.id)
            .await
            .unwrap();

        assert!(!storage.delete_collection(&collection.id, "bob").await.unwrap());
        assert!(storage.delete_collection(&collection.id, "alice").await.unwrap());
        assert!(storage.get_collection(&collection.id).await.unwrap().is_none());
        // The poem itself survives
        assert!(storage.get_poem(&poem.id).await.unwrap().is_some());
    }
}
