//! GitHub token lookup
//!
//! `GITHUB_TOKEN` or `GH_TOKEN` win. Otherwise the token comes from
//! `~/.config/gh-comment/secrets.toml`, which must not be readable by group
//! or others.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Environment variables checked for a token, in order
pub const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

const TEMPLATE: &str = "\
# gh-comment GitHub token; keep this file private (chmod 600)
# Needs the repo scope, or read/write on pull requests for fine-grained tokens
token = \"\"
";

/// Contents of the secrets file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Secrets {
    token: Option<String>,
}

impl Secrets {
    /// `~/.config/gh-comment/secrets.toml`
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gh-comment").join("secrets.toml"))
    }

    /// Read the secrets file; empty when it does not exist
    pub fn load() -> Result<Self> {
        match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        ensure_private(path)?;
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// The token to authenticate with, environment first
    pub fn github_token(&self) -> Option<String> {
        self.token_with(|name| std::env::var(name).ok())
    }

    fn token_with(&self, var: impl Fn(&str) -> Option<String>) -> Option<String> {
        TOKEN_ENV_VARS
            .iter()
            .filter_map(|name| var(name))
            .chain(self.token.clone())
            .map(|token| token.trim().to_string())
            .find(|token| !token.is_empty())
    }

    /// Write an empty secrets file for `config --init-secrets`
    pub fn create_template() -> Result<PathBuf> {
        let path = Self::path()
            .ok_or_else(|| Error::Config("Could not determine the config directory".to_string()))?;
        write_template(&path)?;
        Ok(path)
    }
}

fn write_template(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    std::os::unix::fs::OpenOptionsExt::mode(&mut options, 0o600);

    let mut file = options.open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::AlreadyExists => {
            Error::Config(format!("{} already exists", path.display()))
        }
        _ => Error::Io(e),
    })?;
    file.write_all(TEMPLATE.as_bytes())?;

    warn!(path = %path.display(), "Created secrets template; add your token to it");
    Ok(())
}

#[cfg(unix)]
fn ensure_private(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path)?.permissions().mode() & 0o777;
    if mode & 0o077 != 0 {
        return Err(Error::Config(format!(
            "{} is readable by others (mode {mode:o}); run: chmod 600 {}",
            path.display(),
            path.display()
        )));
    }
    debug!(path = %path.display(), "Secrets file is private");
    Ok(())
}

#[cfg(not(unix))]
fn ensure_private(_path: &Path) -> Result<()> {
    Ok(())
}
