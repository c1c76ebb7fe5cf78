//! Configuration service implementation.
//!
//! Loads `AppConfig` from an explicit path or `~/.config/aeroplan/config.toml`,
//! then applies environment overrides for credentials and endpoints.

use crate::paths::AeroplanPaths;
use aeroplan_core::config::AppConfig;
use aeroplan_core::{AeroError, Result};
use std::path::{Path, PathBuf};

/// Environment variables that override file settings.
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_NEO4J_URI: &str = "NEO4J_URI";
pub const ENV_NEO4J_USERNAME: &str = "NEO4J_USERNAME";
pub const ENV_NEO4J_PASSWORD: &str = "NEO4J_PASSWORD";
pub const ENV_NEO4J_DATABASE: &str = "NEO4J_DATABASE";

/// Configuration service that resolves the effective application config.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
}

impl ConfigService {
    /// Creates a service reading `path`, or the default config file when `None`.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// The file this service reads, if one could be resolved.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.path
            .clone()
            .or_else(|| AeroplanPaths::config_file().ok())
    }

    /// Loads the file (defaults when missing) and applies process env overrides.
    pub async fn load(&self) -> Result<AppConfig> {
        let config = match self.config_path() {
            Some(path) => Self::load_file(&path).await?,
            None => {
                tracing::warn!("[ConfigService] No config directory available, using defaults");
                AppConfig::default()
            }
        };
        Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
    }

    /// Reads a TOML file; a missing or empty file yields defaults.
    async fn load_file(path: &Path) -> Result<AppConfig> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    "[ConfigService] {} not found, using defaults",
                    path.display()
                );
                return Ok(AppConfig::default());
            }
            Err(err) => {
                return Err(AeroError::config(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    err
                )));
            }
        };

        if content.trim().is_empty() {
            return Ok(AppConfig::default());
        }

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| AeroError::config(format!("Invalid {}: {}", path.display(), e)))?;
        tracing::info!("[ConfigService] Loaded configuration from {}", path.display());
        Ok(config)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Overlays non-empty environment values onto `config`.
///
/// `lookup` abstracts the environment so the overlay can be tested without
/// touching process state.
pub fn apply_env_overrides(
    mut config: AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> AppConfig {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(key) = get(ENV_OPENAI_API_KEY) {
        config.llm.api_key = Some(key);
    }
    if let Some(url) = get(ENV_OPENAI_BASE_URL) {
        config.llm.base_url = url;
    }
    if let Some(uri) = get(ENV_NEO4J_URI) {
        config.graph.uri = uri;
    }
    if let Some(username) = get(ENV_NEO4J_USERNAME) {
        config.graph.username = username;
    }
    if let Some(password) = get(ENV_NEO4J_PASSWORD) {
        config.graph.password = Some(password);
    }
    if let Some(database) = get(ENV_NEO4J_DATABASE) {
        config.graph.database = database;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigService::load_file(&temp_dir.path().join("config.toml"))
            .await
            .unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[tokio::test]
    async fn test_file_values_are_loaded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        tokio::fs::write(
            &path,
            "[graph]\nuri = \"http://kg:7474\"\ntop_k = 50\n\n[memory]\nwindow = 4\n",
        )
        .await
        .unwrap();

        let config = ConfigService::load_file(&path).await.unwrap();
        assert_eq!(config.graph.uri, "http://kg:7474");
        assert_eq!(config.graph.top_k, 50);
        assert_eq!(config.memory.window, 4);
        assert_eq!(config.llm.router_model, "gpt-4");
    }

    #[tokio::test]
    async fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        tokio::fs::write(&path, "[graph\nuri = ").await.unwrap();

        let err = ConfigService::load_file(&path).await.unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_env_overrides_replace_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_OPENAI_API_KEY, "sk-test"),
            (ENV_NEO4J_URI, "http://neo4j:7474"),
            (ENV_NEO4J_PASSWORD, "secret"),
            (ENV_NEO4J_DATABASE, "  "),
        ]);

        let config = apply_env_overrides(AppConfig::default(), |key| {
            env.get(key).map(|v| v.to_string())
        });

        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.graph.uri, "http://neo4j:7474");
        assert_eq!(config.graph.password.as_deref(), Some("secret"));
        // Blank values are ignored
        assert_eq!(config.graph.database, "neo4j");
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
    }
}
