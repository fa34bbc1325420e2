//! Core domain types for the Poetry Hub catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new time-sortable identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(
    /// A UUID v7 wrapper for poet identifiers.
    PoetId
);

uuid_id!(
    /// A UUID v7 wrapper for poem identifiers.
    PoemId
);

uuid_id!(
    /// A UUID v7 wrapper for collection identifiers.
    CollectionId
);

/// Normalised natural key for poet names: trimmed and lower-cased.
///
/// Two names with the same key are the same poet.
pub fn poet_name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Poets
// ---------------------------------------------------------------------------

/// A persisted poet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poet {
    pub id: PoetId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a poet.
#[derive(Debug, Clone, Default)]
pub struct NewPoet {
    pub name: String,
    pub bio: Option<String>,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
    pub nationality: Option<String>,
}

impl NewPoet {
    /// A poet with only a name and bio.
    pub fn named(name: impl Into<String>, bio: Option<String>) -> Self {
        Self {
            name: name.into(),
            bio,
            ..Self::default()
        }
    }
}

/// A poet with the number of poems attributed to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoetSummary {
    #[serde(flatten)]
    pub poet: Poet,
    pub poem_count: u64,
}

// ---------------------------------------------------------------------------
// Poems
// ---------------------------------------------------------------------------

/// A persisted poem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poem {
    pub id: PoemId,
    pub title: String,
    pub body: String,
    pub poet_id: PoetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_published: Option<i32>,
    pub views: u64,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a poem.
#[derive(Debug, Clone)]
pub struct NewPoem {
    pub title: String,
    pub body: String,
    pub poet_id: PoetId,
    pub year_published: Option<i32>,
}

/// A poem joined with its poet's name and theme names, as shown when browsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoemView {
    #[serde(flatten)]
    pub poem: Poem,
    pub poet_name: String,
    #[serde(default)]
    pub themes: Vec<String>,
}

/// A theme with the number of poems linked to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeSummary {
    pub id: i64,
    pub name: String,
    pub poem_count: u64,
}

// ---------------------------------------------------------------------------
// Reader activity
// ---------------------------------------------------------------------------

/// Outcome of toggling a favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteAction {
    Added,
    Removed,
}

/// A favorited poem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub poem: PoemView,
    pub favorited_at: DateTime<Utc>,
}

/// A poem in a reader's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub poem: PoemView,
    pub read_at: DateTime<Utc>,
}

/// A reader comment on a poem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub poem_id: PoemId,
    pub user_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

/// A reader's named list of poems.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub user_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Visible to every reader, not just the owner.
    pub is_public: bool,
    pub poem_count: u64,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a collection.
#[derive(Debug, Clone, Default)]
pub struct NewCollection {
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
}

/// A poem in a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub poem: PoemView,
    pub added_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// Reader engagement with one poem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoemStats {
    pub poem_id: PoemId,
    pub title: String,
    pub views: u64,
    pub favorites: u64,
    pub comments: u64,
    pub created_at: DateTime<Utc>,
}

/// Engagement totals across a poet's poems. Averages are rounded per poem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoetAnalytics {
    pub poet_id: PoetId,
    pub total_poems: u64,
    pub total_views: u64,
    pub total_favorites: u64,
    pub total_comments: u64,
    pub average_views: u64,
    pub average_favorites: u64,
    /// Newest first.
    pub poems: Vec<PoemStats>,
}

// ---------------------------------------------------------------------------
// Import runs
// ---------------------------------------------------------------------------

/// A recorded bulk import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRun {
    pub id: String,
    /// Archive file name the run was started from.
    pub source: String,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Final summary, as stored JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poet_id_roundtrip() {
        let id = PoetId::new();
        let parsed: PoetId = id.to_string().parse().expect("parse PoetId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn poem_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<PoemId>().is_err());
    }

    #[test]
    fn name_key_ignores_case_and_padding() {
        assert_eq!(poet_name_key("Emily Dickinson"), poet_name_key("emily dickinson"));
        assert_eq!(poet_name_key("  Emily Dickinson \n"), "emily dickinson");
        assert_ne!(poet_name_key("Emily Dickinson"), poet_name_key("Emily Brontë"));
    }

    #[test]
    fn poem_view_flattens_poem() {
        let view = PoemView {
            poem: Poem {
                id: PoemId::new(),
                title: "Hope".into(),
                body: "Hope is the thing with feathers".into(),
                poet_id: PoetId::new(),
                year_published: None,
                views: 3,
                created_at: Utc::now(),
            },
            poet_name: "Emily Dickinson".into(),
            themes: vec!["Life & Choices".into()],
        };

        let json = serde_json::to_value(&view).expect("serialize");
        assert_eq!(json["title"], "Hope");
        assert_eq!(json["poet_name"], "Emily Dickinson");
        assert!(json.get("year_published").is_none());

        let parsed: PoemView = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed.poem.views, 3);
    }
}
