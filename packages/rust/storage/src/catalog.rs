//! Poets, poems, and themes.

use libsql::params;
use poetryhub_shared::{
    NewPoem, NewPoet, Poem, PoemId, PoemView, Poet, PoetId, PoetSummary, PoetryHubError, Result,
    ThemeSummary, poet_name_key,
};

use crate::{
    Storage, db_err, get_opt_i32, get_string, like_pattern, now_ts, parse_id, parse_ts,
};

/// Columns selected for a [`PoemView`], in the order [`row_to_poem_view`] reads them.
const POEM_VIEW_COLUMNS: &str = "p.id, p.title, p.body, p.poet_id, p.year_published, p.views, \
     p.created_at, po.name, \
     (SELECT GROUP_CONCAT(t.name, '|') FROM poem_themes pt JOIN themes t ON t.id = pt.theme_id \
      WHERE pt.poem_id = p.id)";

/// Number of columns in [`POEM_VIEW_COLUMNS`].
pub(crate) const POEM_VIEW_WIDTH: i32 = 9;

const POET_COLUMNS: &str = "id, name, bio, birth_year, death_year, nationality, created_at";

/// Filters for [`Storage::list_poems`].
#[derive(Debug, Clone, Default)]
pub struct PoemQuery {
    /// Only poems linked to this theme (case-insensitive).
    pub theme: Option<String>,
    /// Case-insensitive title substring.
    pub search: Option<String>,
    /// Maximum number of poems returned.
    pub limit: Option<u32>,
}

/// Row counts for the catalog tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogCounts {
    pub poets: u64,
    pub poems: u64,
}

impl Storage {
    // -----------------------------------------------------------------------
    // Poet operations
    // -----------------------------------------------------------------------

    /// Insert a poet. Fails if a poet with the same case-insensitive name exists.
    pub async fn insert_poet(&self, poet: &NewPoet) -> Result<Poet> {
        self.check_writable()?;
        let name = poet.name.trim();
        if name.is_empty() {
            return Err(PoetryHubError::validation("poet name must not be empty"));
        }

        let id = PoetId::new();
        let created_at = now_ts();
        self.conn
            .execute(
                "INSERT INTO poets (id, name, name_key, bio, birth_year, death_year, nationality, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    id.to_string(),
                    name,
                    poet_name_key(name),
                    poet.bio.as_deref(),
                    poet.birth_year.map(i64::from),
                    poet.death_year.map(i64::from),
                    poet.nationality.as_deref(),
                    created_at.as_str(),
                ],
            )
            .await
            .map_err(db_err)?;

        Ok(Poet {
            id,
            name: name.to_string(),
            bio: poet.bio.clone(),
            birth_year: poet.birth_year,
            death_year: poet.death_year,
            nationality: poet.nationality.clone(),
            created_at: parse_ts(&created_at)?,
        })
    }

    /// Find a poet whose name matches `name` case-insensitively.
    pub async fn find_poet_by_name(&self, name: &str) -> Result<Option<Poet>> {
        let sql = format!("SELECT {POET_COLUMNS} FROM poets WHERE name_key = ?1");
        let mut rows = self
            .conn
            .query(&sql, params![poet_name_key(name)])
            .await
            .map_err(db_err)?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_poet(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    /// Get a poet by ID.
    pub async fn get_poet(&self, id: &PoetId) -> Result<Option<Poet>> {
        let sql = format!("SELECT {POET_COLUMNS} FROM poets WHERE id = ?1");
        let mut rows = self
            .conn
            .query(&sql, params![id.to_string()])
            .await
            .map_err(db_err)?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_poet(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    /// List poets ordered by name, with poem counts.
    pub async fn list_poets(
        &self,
        search: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<PoetSummary>> {
        let pattern = search.map(like_pattern);
        let limit = limit.map(i64::from).unwrap_or(-1);
        let mut rows = self
            .conn
            .query(
                "SELECT po.id, po.name, po.bio, po.birth_year, po.death_year, po.nationality,
                        po.created_at, COUNT(p.id)
                 FROM poets po
                 LEFT JOIN poems p ON p.poet_id = po.id
                 WHERE ?1 IS NULL OR po.name LIKE ?1 ESCAPE '\\'
                 GROUP BY po.id
                 ORDER BY po.name COLLATE NOCASE
                 LIMIT ?2",
                params![pattern.as_deref(), limit],
            )
            .await
            .map_err(db_err)?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(PoetSummary {
                poet: row_to_poet(&row)?,
                poem_count: row.get::<i64>(7).map_err(db_err)?.max(0) as u64,
            });
        }
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // Poem operations
    // -----------------------------------------------------------------------

    /// Insert a poem for an existing poet.
    pub async fn insert_poem(&self, poem: &NewPoem) -> Result<Poem> {
        self.check_writable()?;
        let id = PoemId::new();
        let created_at = now_ts();
        self.conn
            .execute(
                "INSERT INTO poems (id, title, body, poet_id, year_published, views, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
                params![
                    id.to_string(),
                    poem.title.as_str(),
                    poem.body.as_str(),
                    poem.poet_id.to_string(),
                    poem.year_published.map(i64::from),
                    created_at.as_str(),
                ],
            )
            .await
            .map_err(db_err)?;

        Ok(Poem {
            id,
            title: poem.title.clone(),
            body: poem.body.clone(),
            poet_id: poem.poet_id.clone(),
            year_published: poem.year_published,
            views: 0,
            created_at: parse_ts(&created_at)?,
        })
    }

    /// Find a poem by exact title for a given poet.
    pub async fn find_poem_by_title_and_poet(
        &self,
        title: &str,
        poet_id: &PoetId,
    ) -> Result<Option<Poem>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, title, body, poet_id, year_published, views, created_at
                 FROM poems WHERE poet_id = ?1 AND title = ?2
                 LIMIT 1",
                params![poet_id.to_string(), title],
            )
            .await
            .map_err(db_err)?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_poem(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    /// Get a poem with its poet name and themes.
    pub async fn get_poem(&self, id: &PoemId) -> Result<Option<PoemView>> {
        let sql = format!(
            "SELECT {POEM_VIEW_COLUMNS} FROM poems p JOIN poets po ON po.id = p.poet_id
             WHERE p.id = ?1"
        );
        let mut rows = self
            .conn
            .query(&sql, params![id.to_string()])
            .await
            .map_err(db_err)?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_poem_view(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    /// Fail with a validation error unless the poem exists.
    pub(crate) async fn ensure_poem_exists(&self, id: &PoemId) -> Result<()> {
        let mut rows = self
            .conn
            .query("SELECT 1 FROM poems WHERE id = ?1", params![id.to_string()])
            .await
            .map_err(db_err)?;

        match rows.next().await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(PoetryHubError::validation(format!("poem {id} not found"))),
            Err(e) => Err(db_err(e)),
        }
    }

    /// List poems newest first, optionally filtered by theme and title.
    pub async fn list_poems(&self, query: &PoemQuery) -> Result<Vec<PoemView>> {
        let pattern = query.search.as_deref().map(like_pattern);
        let limit = query.limit.map(i64::from).unwrap_or(-1);
        let sql = format!(
            "SELECT {POEM_VIEW_COLUMNS} FROM poems p JOIN poets po ON po.id = p.poet_id
             WHERE (?1 IS NULL OR EXISTS (
                       SELECT 1 FROM poem_themes pt JOIN themes t ON t.id = pt.theme_id
                       WHERE pt.poem_id = p.id AND t.name = ?1 COLLATE NOCASE))
               AND (?2 IS NULL OR p.title LIKE ?2 ESCAPE '\\')
             ORDER BY p.created_at DESC, p.rowid DESC
             LIMIT ?3"
        );
        let mut rows = self
            .conn
            .query(
                &sql,
                params![query.theme.as_deref(), pattern.as_deref(), limit],
            )
            .await
            .map_err(db_err)?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_poem_view(&row)?);
        }
        Ok(results)
    }

    /// List a poet's poems ordered by title.
    pub async fn list_poems_by_poet(&self, poet_id: &PoetId) -> Result<Vec<PoemView>> {
        let sql = format!(
            "SELECT {POEM_VIEW_COLUMNS} FROM poems p JOIN poets po ON po.id = p.poet_id
             WHERE p.poet_id = ?1
             ORDER BY p.title"
        );
        let mut rows = self
            .conn
            .query(&sql, params![poet_id.to_string()])
            .await
            .map_err(db_err)?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_poem_view(&row)?);
        }
        Ok(results)
    }

    /// Count poets and poems.
    pub async fn catalog_counts(&self) -> Result<CatalogCounts> {
        let mut rows = self
            .conn
            .query(
                "SELECT (SELECT COUNT(*) FROM poets), (SELECT COUNT(*) FROM poems)",
                params![],
            )
            .await
            .map_err(db_err)?;

        match rows.next().await {
            Ok(Some(row)) => Ok(CatalogCounts {
                poets: row.get::<i64>(0).map_err(db_err)? as u64,
                poems: row.get::<i64>(1).map_err(db_err)? as u64,
            }),
            Ok(None) => Ok(CatalogCounts { poets: 0, poems: 0 }),
            Err(e) => Err(db_err(e)),
        }
    }

    /// Most-viewed poems, newest first among equal view counts.
    pub async fn featured_poems(&self, limit: u32) -> Result<Vec<PoemView>> {
        let sql = format!(
            "SELECT {POEM_VIEW_COLUMNS} FROM poems p JOIN poets po ON po.id = p.poet_id
             ORDER BY p.views DESC, p.created_at DESC, p.rowid DESC
             LIMIT ?1"
        );
        let mut rows = self
            .conn
            .query(&sql, params![i64::from(limit)])
            .await
            .map_err(db_err)?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_poem_view(&row)?);
        }
        Ok(results)
    }

    /// A poem picked uniformly at random, or `None` when the catalog is empty.
    pub async fn random_poem(&self) -> Result<Option<PoemView>> {
        let sql = format!(
            "SELECT {POEM_VIEW_COLUMNS} FROM poems p JOIN poets po ON po.id = p.poet_id
             ORDER BY p.rowid
             LIMIT 1 OFFSET (SELECT ABS(RANDOM()) % MAX(COUNT(*), 1) FROM poems)"
        );
        let mut rows = self.conn.query(&sql, params![]).await.map_err(db_err)?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_poem_view(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    // -----------------------------------------------------------------------
    // Theme operations
    // -----------------------------------------------------------------------

    /// List themes ordered by name, with poem counts.
    pub async fn list_themes(&self) -> Result<Vec<ThemeSummary>> {
        let mut rows = self
            .conn
            .query(
                "SELECT t.id, t.name, COUNT(pt.poem_id)
                 FROM themes t
                 LEFT JOIN poem_themes pt ON pt.theme_id = t.id
                 GROUP BY t.id
                 ORDER BY t.name",
                params![],
            )
            .await
            .map_err(db_err)?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_theme(&row)?);
        }
        Ok(results)
    }

    /// Find a theme by name, case-insensitively.
    pub async fn find_theme_by_name(&self, name: &str) -> Result<Option<ThemeSummary>> {
        let mut rows = self
            .conn
            .query(
                "SELECT t.id, t.name,
                        (SELECT COUNT(*) FROM poem_themes pt WHERE pt.theme_id = t.id)
                 FROM themes t WHERE t.name = ?1 COLLATE NOCASE",
                params![name.trim()],
            )
            .await
            .map_err(db_err)?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_theme(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    /// Link a poem to a theme. Linking twice is a no-op.
    pub async fn link_poem_theme(&self, poem_id: &PoemId, theme_id: i64) -> Result<()> {
        self.check_writable()?;
        self.conn
            .execute(
                "INSERT OR IGNORE INTO poem_themes (poem_id, theme_id) VALUES (?1, ?2)",
                params![poem_id.to_string(), theme_id],
            )
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Row conversion
// ---------------------------------------------------------------------------

fn row_to_poet(row: &libsql::Row) -> Result<Poet> {
    Ok(Poet {
        id: parse_id(&get_string(row, 0)?)?,
        name: get_string(row, 1)?,
        bio: row.get::<String>(2).ok(),
        birth_year: get_opt_i32(row, 3),
        death_year: get_opt_i32(row, 4),
        nationality: row.get::<String>(5).ok(),
        created_at: parse_ts(&get_string(row, 6)?)?,
    })
}

fn row_to_poem(row: &libsql::Row) -> Result<Poem> {
    Ok(Poem {
        id: parse_id(&get_string(row, 0)?)?,
        title: get_string(row, 1)?,
        body: get_string(row, 2)?,
        poet_id: parse_id(&get_string(row, 3)?)?,
        year_published: get_opt_i32(row, 4),
        views: row.get::<i64>(5).map_err(db_err)?.max(0) as u64,
        created_at: parse_ts(&get_string(row, 6)?)?,
    })
}

/// Convert a row selected with [`POEM_VIEW_COLUMNS`] to a [`PoemView`].
pub(crate) fn row_to_poem_view(row: &libsql::Row) -> Result<PoemView> {
    let mut themes: Vec<String> = row
        .get::<String>(8)
        .ok()
        .map(|joined| joined.split('|').map(str::to_string).collect())
        .unwrap_or_default();
    themes.sort();

    Ok(PoemView {
        poem: row_to_poem(row)?,
        poet_name: get_string(row, 7)?,
        themes,
    })
}

pub(crate) fn poem_view_columns() -> &'static str {
    POEM_VIEW_COLUMNS
}

fn row_to_theme(row: &libsql::Row) -> Result<ThemeSummary> {
    Ok(ThemeSummary {
        id: row.get::<i64>(0).map_err(db_err)?,
        name: get_string(row, 1)?,
        poem_count: row.get::<i64>(2).map_err(db_err)?.max(0) as u64,
    })
}

#[cfg(test)]
mod tests {
    use crate::test_support::{seed_poem, test_storage};

    use super::*;

    #[tokio::test]
    async fn poet_lookup_is_case_insensitive() {
        let storage = test_storage().await;
        let created = storage
            .insert_poet(&NewPoet::named(
                "Emily Dickinson",
                Some("Poet featured in Poetry Foundation collection".into()),
            ))
            .await
            .expect("insert poet");

        let found = storage
            .find_poet_by_name("  emily DICKINSON ")
            .await
            .expect("find poet")
            .expect("poet exists");
        assert_eq!(found.id, created.id);
        assert_eq!(found.name, "Emily Dickinson");
        assert_eq!(
            found.bio.as_deref(),
            Some("Poet featured in Poetry Foundation collection")
        );

        assert!(storage.find_poet_by_name("Emily Brontë").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_poet_key_is_rejected() {
        let storage = test_storage().await;
        storage
            .insert_poet(&NewPoet::named("Walt Whitman", None))
            .await
            .unwrap();
        let second = storage
            .insert_poet(&NewPoet::named("WALT WHITMAN", None))
            .await;
        assert!(second.is_err());
        assert_eq!(storage.catalog_counts().await.unwrap().poets, 1);
    }

    #[tokio::test]
    async fn blank_poet_name_is_rejected() {
        let storage = test_storage().await;
        let result = storage.insert_poet(&NewPoet::named("   ", None)).await;
        assert!(matches!(result, Err(PoetryHubError::Validation { .. })));
    }

    #[tokio::test]
    async fn poem_lookup_uses_exact_title_and_poet() {
        let storage = test_storage().await;
        let (poet, poem) = seed_poem(&storage, "Robert Frost", "The Road Not Taken").await;
        let (other, _) = seed_poem(&storage, "Someone Else", "The Road Not Taken").await;

        let found = storage
            .find_poem_by_title_and_poet("The Road Not Taken", &poet.id)
            .await
            .unwrap()
            .expect("poem exists");
        assert_eq!(found.id, poem.id);

        // Different case or padding is a different title
        assert!(
            storage
                .find_poem_by_title_and_poet("the road not taken", &poet.id)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            storage
                .find_poem_by_title_and_poet("The Road Not Taken ", &poet.id)
                .await
                .unwrap()
                .is_none()
        );

        // Same title under another poet is a separate poem
        let other_found = storage
            .find_poem_by_title_and_poet("The Road Not Taken", &other.id)
            .await
            .unwrap()
            .expect("other poem exists");
        assert_ne!(other_found.id, poem.id);
    }

    #[tokio::test]
    async fn poem_requires_existing_poet() {
        let storage = test_storage().await;
        let result = storage
            .insert_poem(&NewPoem {
                title: "Orphan".into(),
                body: "no poet".into(),
                poet_id: PoetId::new(),
                year_published: None,
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn list_poems_filters_by_theme_and_title() {
        let storage = test_storage().await;
        let (_, rose) = seed_poem(&storage, "Robert Burns", "A Red, Red Rose").await;
        seed_poem(&storage, "Robert Frost", "Fire and Ice").await;
        seed_poem(&storage, "Robert Frost", "100% Frost_").await;

        let love = storage
            .find_theme_by_name("love")
            .await
            .unwrap()
            .expect("seeded theme");
        storage.link_poem_theme(&rose.id, love.id).await.unwrap();
        storage.link_poem_theme(&rose.id, love.id).await.unwrap();

        let all = storage.list_poems(&PoemQuery::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        // Newest first
        assert_eq!(all[0].poem.title, "100% Frost_");

        let loved = storage
            .list_poems(&PoemQuery {
                theme: Some("LOVE".into()),
                ..PoemQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(loved.len(), 1);
        assert_eq!(loved[0].poet_name, "Robert Burns");
        assert_eq!(loved[0].themes, vec!["Love".to_string()]);

        let fire = storage
            .list_poems(&PoemQuery {
                search: Some("FIRE".into()),
                ..PoemQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(fire.len(), 1);

        // Wildcards in user input match literally
        let percent = storage
            .list_poems(&PoemQuery {
                search: Some("0% F".into()),
                ..PoemQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(percent.len(), 1);
        let underscore = storage
            .list_poems(&PoemQuery {
                search: Some("e_".into()),
                ..PoemQuery::default()
            })
            .await
            .unwrap();
        assert!(underscore.is_empty());

        let limited = storage
            .list_poems(&PoemQuery {
                limit: Some(2),
                ..PoemQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn poets_listed_with_counts() {
        let storage = test_storage().await;
        seed_poem(&storage, "William Blake", "The Tyger").await;
        seed_poem(&storage, "William Blake", "London").await;
        seed_poem(&storage, "anna Akhmatova", "Requiem").await;
        storage
            .insert_poet(&NewPoet::named("Basho", None))
            .await
            .unwrap();

        let poets = storage.list_poets(None, None).await.unwrap();
        let names: Vec<_> = poets.iter().map(|p| p.poet.name.as_str()).collect();
        assert_eq!(names, vec!["anna Akhmatova", "Basho", "William Blake"]);
        assert_eq!(poets[0].poem_count, 1);
        assert_eq!(poets[1].poem_count, 0);
        assert_eq!(poets[2].poem_count, 2);

        let blakes = storage.list_poets(Some("blake"), Some(5)).await.unwrap();
        assert_eq!(blakes.len(), 1);

        let by_poet = storage
            .list_poems_by_poet(&blakes[0].poet.id)
            .await
            .unwrap();
        let titles: Vec<_> = by_poet.iter().map(|p| p.poem.title.as_str()).collect();
        assert_eq!(titles, vec!["London", "The Tyger"]);
    }

    #[tokio::test]
    async fn get_poem_and_poet_by_id() {
        let storage = test_storage().await;
        let (poet, poem) = seed_poem(&storage, "Langston Hughes", "Harlem").await;

        let view = storage.get_poem(&poem.id).await.unwrap().expect("poem");
        assert_eq!(view.poet_name, "Langston Hughes");
        assert!(view.themes.is_empty());
        assert_eq!(storage.get_poet(&poet.id).await.unwrap().unwrap().name, "Langston Hughes");

        assert!(storage.get_poem(&PoemId::new()).await.unwrap().is_none());
        assert!(storage.ensure_poem_exists(&PoemId::new()).await.is_err());
    }

    #[tokio::test]
    async fn themes_are_seeded_and_counted() {
        let storage = test_storage().await;
        let themes = storage.list_themes().await.unwrap();
        let names: Vec<_> = themes.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Life & Choices", "Love", "Nature", "Philosophy"]);
        assert!(themes.iter().all(|t| t.poem_count == 0));

        let (_, poem) = seed_poem(&storage, "Mary Oliver", "Wild Geese").await;
        let nature = storage.find_theme_by_name(" nature ").await.unwrap().unwrap();
        storage.link_poem_theme(&poem.id, nature.id).await.unwrap();
        let nature = storage.find_theme_by_name("Nature").await.unwrap().unwrap();
        assert_eq!(nature.poem_count, 1);

        assert!(storage.find_theme_by_name("Sports").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn featured_poems_ordered_by_views() {
        let storage = test_storage().await;
        let (_, quiet) = seed_poem(&storage, "Emily Dickinson", "Quiet").await;
        let (_, popular) = seed_poem(&storage, "Emily Dickinson", "Popular").await;
        let (_, middling) = seed_poem(&storage, "Walt Whitman", "Middling").await;

        for _ in 0..3 {
            storage.record_read("alice", &popular.id).await.unwrap();
        }
        storage.record_read("alice", &middling.id).await.unwrap();
        storage.record_read("bob", &middling.id).await.unwrap();

        let featured = storage.featured_poems(6).await.unwrap();
        let titles: Vec<_> = featured.iter().map(|v| v.poem.title.as_str()).collect();
        assert_eq!(titles, vec!["Popular", "Middling", "Quiet"]);
        assert_eq!(featured[0].poem.views, 3);
        assert_eq!(featured[2].poem.id, quiet.id);

        assert_eq!(storage.featured_poems(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn random_poem_comes_from_catalog() {
        let storage = test_storage().await;
        assert!(storage.random_poem().await.unwrap().is_none());

        seed_poem(&storage, "Rumi", "The Guest House").await;
        seed_poem(&storage, "Hafez", "The Gift").await;

        for _ in 0..10 {
            let view = storage.random_poem().await.unwrap().expect("non-empty catalog");
            assert!(["The Guest House", "The Gift"].contains(&view.poem.title.as_str()));
        }
    }
}
