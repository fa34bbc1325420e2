//! Shared types, error model, and configuration for Poetry Hub.
//!
//! This crate is the foundation depended on by all other Poetry Hub crates.
//! It provides:
//! - [`PoetryHubError`]: the unified error type
//! - Domain types ([`Poet`], [`Poem`], [`PoemView`], [`PoetId`], [`PoemId`])
//! - Configuration ([`AppConfig`], [`ImportConfig`], [`AiConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AiConfig, AppConfig, DefaultsConfig, ImportConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from, resolve_database_path, validate_api_key,
};
pub use error::{PoetryHubError, Result};
pub use types::{
    Collection, CollectionEntry, CollectionId, Comment, FavoriteAction, FavoriteEntry,
    HistoryEntry, ImportRun, NewCollection, NewPoem, NewPoet, Poem, PoemId, PoemStats, PoemView,
    Poet, PoetAnalytics, PoetId, PoetSummary, ThemeSummary, poet_name_key,
};
