use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::user::{User, UserDirectory};

/// Directory, relative to the project root, holding config and data.
pub const BACKLOG_DIR: &str = ".backlog";

/// Environment variable overriding `[store] dir`.
pub const STORE_DIR_ENV: &str = "BACKLOG_STORE_DIR";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub users: UsersConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store directory. Relative paths resolve against the project root.
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsersConfig {
    /// User signed in when nothing else has been chosen.
    #[serde(default)]
    pub default_user: Option<String>,
    /// Replaces the built-in directory when non-empty.
    #[serde(default)]
    pub directory: Vec<User>,
}

impl UsersConfig {
    #[must_use]
    pub fn user_directory(&self) -> UserDirectory {
        if self.directory.is_empty() {
            UserDirectory::default()
        } else {
            UserDirectory::new(self.directory.clone())
        }
    }
}

impl ProjectConfig {
    /// Absolute store directory for `project_root`, honoring
    /// [`STORE_DIR_ENV`].
    #[must_use]
    pub fn store_dir(&self, project_root: &Path) -> PathBuf {
        let env_dir = std::env::var(STORE_DIR_ENV).ok();
        resolve_store_dir(project_root, &self.store.dir, env_dir.as_deref())
    }
}

fn resolve_store_dir(project_root: &Path, configured: &Path, env_dir: Option<&str>) -> PathBuf {
    let dir = match env_dir.map(str::trim).filter(|d| !d.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => configured.to_path_buf(),
    };
    if dir.is_absolute() {
        dir
    } else {
        project_root.join(dir)
    }
}

#[must_use]
pub fn config_path(project_root: &Path) -> PathBuf {
    project_root.join(BACKLOG_DIR).join("config.toml")
}

#[must_use]
pub fn is_initialized(project_root: &Path) -> bool {
    project_root.join(BACKLOG_DIR).is_dir()
}

pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = config_path(project_root);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn default_store_dir() -> PathBuf {
    PathBuf::from(BACKLOG_DIR).join("store")
}
