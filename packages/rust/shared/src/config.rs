//! Application configuration for Poetry Hub.
//!
//! User config lives at `~/.poetryhub/poetryhub.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PoetryHubError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "poetryhub.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".poetryhub";

// ---------------------------------------------------------------------------
// Config structs (matching poetryhub.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Bulk import settings.
    #[serde(default)]
    pub import: ImportConfig,

    /// Completion service settings.
    #[serde(default)]
    pub ai: AiConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Path to the catalog database. A leading `~` is expanded.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Number of entries shown by `history`.
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_database_path() -> String {
    "~/.poetryhub/poetryhub.db".into()
}
fn default_history_limit() -> u32 {
    20
}

/// `[import]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Records per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Name of the tabular file expected inside the archive.
    #[serde(default = "default_archive_entry")]
    pub archive_entry: String,

    /// Bio given to poets created by an import.
    #[serde(default = "default_bio")]
    pub default_bio: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            archive_entry: default_archive_entry(),
            default_bio: default_bio(),
        }
    }
}

fn default_batch_size() -> usize {
    50
}
fn default_archive_entry() -> String {
    "PoetryFoundationData.csv".into()
}
fn default_bio() -> String {
    "Poet featured in Poetry Foundation collection".into()
}

/// `[ai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the OpenAI-compatible completion API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for search and analysis.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            default_model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_model() -> String {
    "google/gemini-2.5-flash".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_timeout_secs() -> u64 {
    60
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.poetryhub/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PoetryHubError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.poetryhub/poetryhub.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PoetryHubError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        PoetryHubError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PoetryHubError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PoetryHubError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PoetryHubError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Resolve the configured database path, expanding a leading `~`.
pub fn resolve_database_path(config: &AppConfig) -> Result<PathBuf> {
    expand_home(&config.defaults.database_path)
}

fn expand_home(raw: &str) -> Result<PathBuf> {
    match raw.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| PoetryHubError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        }
        None if raw == "~" => dirs::home_dir()
            .ok_or_else(|| PoetryHubError::config("could not determine home directory")),
        None => Ok(PathBuf::from(raw)),
    }
}

/// Check that the completion API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.ai.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(PoetryHubError::config(format!(
            "AI API key not found. Set the {var_name} environment variable.\n\
             Get a key at https://openrouter.ai/keys"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("database_path"));
        assert!(toml_str.contains("PoetryFoundationData.csv"));
        assert!(toml_str.contains("OPENROUTER_API_KEY"));
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let toml_str = r#"
[import]
batch_size = 10

[ai]
default_model = "openai/gpt-4o-mini"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.import.batch_size, 10);
        assert_eq!(config.import.archive_entry, "PoetryFoundationData.csv");
        assert_eq!(config.ai.default_model, "openai/gpt-4o-mini");
        assert_eq!(config.ai.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(config.defaults.history_limit, 20);
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!("ph_cfg_{}.toml", uuid::Uuid::now_v7()));
        std::fs::write(&path, "[defaults]\ndatabase_path = \"/tmp/hub.db\"\n").unwrap();
        let config = load_config_from(&path).expect("load");
        assert_eq!(
            resolve_database_path(&config).unwrap(),
            PathBuf::from("/tmp/hub.db")
        );
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn malformed_file_is_config_error() {
        let path = std::env::temp_dir().join(format!("ph_cfg_{}.toml", uuid::Uuid::now_v7()));
        std::fs::write(&path, "[import\nbatch_size = ").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, PoetryHubError::Config { .. }));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn home_relative_database_path_is_expanded() {
        let config = AppConfig::default();
        let path = resolve_database_path(&config).expect("resolve");
        assert!(path.ends_with(".poetryhub/poetryhub.db"));
        assert!(!path.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn api_key_validation() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.ai.api_key_env = "PH_TEST_NONEXISTENT_KEY_12345".into();
        let result = validate_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }
}
