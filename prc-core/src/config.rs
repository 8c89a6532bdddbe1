//! Configuration management for gh-comment
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (GH_COMMENT_*)
//! 3. Config file (~/.config/gh-comment/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::comment::CommentType;
use crate::{Error, Result};

/// Default GitHub REST endpoint
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Defaults applied to every command
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Repository as `owner/name`; detected from git when unset
    pub repo: Option<String>,

    /// Comment type when a command or batch entry does not say
    pub comment_type: CommentType,

    /// Expand suggestion markers in comment bodies
    pub expand_suggestions: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            repo: None,
            comment_type: CommentType::Review,
            expand_suggestions: true,
        }
    }
}

/// Batch execution settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Deadline for a whole batch run
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
        }
    }
}

/// GitHub endpoint settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// REST API base URL (GraphQL lives at `{api_base}/graphql`)
    pub api_base: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub defaults: DefaultsConfig,
    pub batch: BatchConfig,
    pub github: GitHubConfig,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub repo: Option<String>,
    pub comment_type: Option<CommentType>,
    pub timeout: Option<Duration>,
    /// `Some(false)` for `--no-expand-suggestions`
    pub expand_suggestions: Option<bool>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/gh-comment/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gh-comment").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - GH_COMMENT_REPO: Repository as owner/name
    /// - GH_COMMENT_TYPE: Default comment type (review or issue)
    /// - GH_COMMENT_EXPAND_SUGGESTIONS: true/false
    /// - GH_COMMENT_TIMEOUT: Batch deadline, e.g. "90s" or "10m"
    /// - GH_COMMENT_API_BASE: GitHub API base URL
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(repo) = var("GH_COMMENT_REPO") {
            self.defaults.repo = Some(repo);
        }

        if let Some(value) = var("GH_COMMENT_TYPE") {
            match value.parse() {
                Ok(comment_type) => self.defaults.comment_type = comment_type,
                Err(e) => warn!(error = %e, "Ignoring GH_COMMENT_TYPE"),
            }
        }

        if let Some(value) = var("GH_COMMENT_EXPAND_SUGGESTIONS") {
            match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.defaults.expand_suggestions = true,
                "0" | "false" | "no" => self.defaults.expand_suggestions = false,
                other => warn!(value = other, "Ignoring GH_COMMENT_EXPAND_SUGGESTIONS"),
            }
        }

        if let Some(value) = var("GH_COMMENT_TIMEOUT") {
            match humantime_serde::re::humantime::parse_duration(&value) {
                Ok(timeout) => self.batch.timeout = timeout,
                Err(e) => warn!(error = %e, "Ignoring GH_COMMENT_TIMEOUT"),
            }
        }

        if let Some(api_base) = var("GH_COMMENT_API_BASE") {
            self.github.api_base = api_base;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: CliOverrides) -> Self {
        if let Some(repo) = overrides.repo {
            self.defaults.repo = Some(repo);
        }

        if let Some(comment_type) = overrides.comment_type {
            self.defaults.comment_type = comment_type;
        }

        if let Some(timeout) = overrides.timeout {
            self.batch.timeout = timeout;
        }

        if let Some(expand) = overrides.expand_suggestions {
            self.defaults.expand_suggestions = expand;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults. `path` replaces the
    /// default config file location.
    pub fn load_with_overrides(path: Option<&Path>, overrides: CliOverrides) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };
        Ok(config.with_env_overrides().with_cli_overrides(overrides))
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.defaults.comment_type, CommentType::Review);
        assert!(config.defaults.expand_suggestions);
        assert_eq!(config.batch.timeout, Duration::from_secs(300));
        assert_eq!(config.github.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default().with_cli_overrides(CliOverrides {
            repo: Some("octo/repo".to_string()),
            comment_type: Some(CommentType::Issue),
            timeout: Some(Duration::from_secs(30)),
            expand_suggestions: Some(false),
        });

        assert_eq!(config.defaults.repo.as_deref(), Some("octo/repo"));
        assert_eq!(config.defaults.comment_type, CommentType::Issue);
        assert_eq!(config.batch.timeout, Duration::from_secs(30));
        assert!(!config.defaults.expand_suggestions);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("GH_COMMENT_REPO", "env/repo"),
            ("GH_COMMENT_TYPE", "issue"),
            ("GH_COMMENT_EXPAND_SUGGESTIONS", "no"),
            ("GH_COMMENT_TIMEOUT", "90s"),
            ("GH_COMMENT_API_BASE", "http://localhost:8080"),
        ]
        .into_iter()
        .collect();

        let config = Config::default()
            .with_overrides_from(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.defaults.repo.as_deref(), Some("env/repo"));
        assert_eq!(config.defaults.comment_type, CommentType::Issue);
        assert!(!config.defaults.expand_suggestions);
        assert_eq!(config.batch.timeout, Duration::from_secs(90));
        assert_eq!(config.github.api_base, "http://localhost:8080");
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let config = Config::default().with_overrides_from(|name| match name {
            "GH_COMMENT_TYPE" => Some("thread".to_string()),
            "GH_COMMENT_TIMEOUT" => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(config.defaults.comment_type, CommentType::Review);
        assert_eq!(config.batch.timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[defaults]
repo = "octo/widgets"
comment_type = "issue"

[batch]
timeout = "2m 30s"

[github]
api_base = "https://github.example.com/api/v3"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.defaults.repo.as_deref(), Some("octo/widgets"));
        assert_eq!(config.defaults.comment_type, CommentType::Issue);
        assert!(config.defaults.expand_suggestions);
        assert_eq!(config.batch.timeout, Duration::from_secs(150));
        assert_eq!(config.github.api_base, "https://github.example.com/api/v3");
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[batch]
timeout = "10m"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        // everything else should use defaults
        assert_eq!(config.batch.timeout, Duration::from_secs(600));
        assert_eq!(config.github.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_load_from_file_and_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[defaults]\nexpand_suggestions = false\n").unwrap();

        let config = Config::load_with_overrides(Some(&path), CliOverrides::default()).unwrap();
        assert!(!config.defaults.expand_suggestions);

        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("timeout = \"5m\""));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[batch]\ntimeout = 5\n").unwrap();
        assert!(matches!(
            Config::load_from_file(&path),
            Err(Error::Config(_))
        ));
    }
}
