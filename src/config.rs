//! Configuration loading and management
//!
//! Handles parsing of `config.toml` in the tasklog data directory and
//! resolution of the data directory itself.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = "config.toml";
pub const HOME_ENV: &str = "TASKLOG_HOME";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Document store backend
    #[serde(default)]
    pub backend: BackendConfig,

    /// Task defaults and categories
    #[serde(default)]
    pub tasks: TasksConfig,
}

/// Which document store to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// File store when credentials are configured, mock otherwise
    #[default]
    Auto,
    Memory,
    File,
}

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    #[serde(default)]
    pub project_id: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub app_id: String,

    /// Populate the mock store with sample users and tasks
    #[serde(default = "default_true")]
    pub seed_sample_data: bool,
}

fn default_true() -> bool {
    true
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Auto,
            project_id: String::new(),
            api_key: String::new(),
            app_id: String::new(),
            seed_sample_data: true,
        }
    }
}

impl BackendConfig {
    /// True when every credential needed for the file backend is set.
    pub fn has_credentials(&self) -> bool {
        [&self.project_id, &self.api_key, &self.app_id]
            .iter()
            .all(|value| !value.trim().is_empty())
    }

    /// Concrete backend: never returns `Auto`.
    pub fn resolve(&self) -> Result<BackendKind> {
        match self.kind {
            BackendKind::Auto if self.has_credentials() => Ok(BackendKind::File),
            BackendKind::Auto => {
                tracing::debug!("backend credentials missing; falling back to mock store");
                Ok(BackendKind::Memory)
            }
            BackendKind::File if !self.has_credentials() => Err(Error::InvalidConfig(
                "backend.kind = \"file\" requires project_id, api_key and app_id".to_string(),
            )),
            kind => Ok(kind),
        }
    }

    /// Location of the file store for this project.
    pub fn database_path(&self, home: &Path) -> PathBuf {
        home.join("db").join(format!("{}.json", self.project_id.trim()))
    }

    fn validate(&self) -> Result<()> {
        let project = self.project_id.trim();
        if !project
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        {
            return Err(Error::InvalidConfig(format!(
                "backend.project_id '{project}' may only contain letters, digits, '-' and '_'"
            )));
        }
        Ok(())
    }
}

/// Tasks configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Allowed categories
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    #[serde(default = "default_category")]
    pub default_category: String,

    #[serde(default = "default_priority")]
    pub default_priority: String,

    #[serde(default = "default_status")]
    pub default_status: String,
}

fn default_categories() -> Vec<String> {
    ["work", "personal", "health", "learning", "other"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_category() -> String {
    "work".to_string()
}

fn default_priority() -> String {
    "medium".to_string()
}

fn default_status() -> String {
    "pending".to_string()
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            default_category: default_category(),
            default_priority: default_priority(),
            default_status: default_status(),
        }
    }
}

impl TasksConfig {
    /// Canonical (lowercase) form of `category` if it is configured.
    pub fn category(&self, category: &str) -> Option<String> {
        let wanted = category.trim().to_lowercase();
        self.categories
            .iter()
            .find(|c| c.trim().to_lowercase() == wanted)
            .map(|_| wanted)
    }

    fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(Error::InvalidConfig(
                "tasks.categories cannot be empty".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for category in &self.categories {
            let normalized = category.trim().to_lowercase();
            if normalized.is_empty() {
                return Err(Error::InvalidConfig(
                    "tasks.categories cannot include empty entries".to_string(),
                ));
            }
            if !seen.insert(normalized.clone()) {
                return Err(Error::InvalidConfig(format!(
                    "tasks.categories has duplicate entry '{normalized}'"
                )));
            }
        }

        if self.category(&self.default_category).is_none() {
            return Err(Error::InvalidConfig(format!(
                "tasks.default_category '{}' not in tasks.categories",
                self.default_category
            )));
        }

        self.default_priority
            .parse::<crate::task::Priority>()
            .map_err(|_| {
                Error::InvalidConfig(format!(
                    "tasks.default_priority '{}' must be low|medium|high",
                    self.default_priority
                ))
            })?;

        self.default_status.parse::<crate::task::Status>().map_err(|_| {
            Error::InvalidConfig(format!(
                "tasks.default_status '{}' must be pending|in-progress|completed",
                self.default_status
            ))
        })?;

        Ok(())
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `config.toml` from the data directory, or return defaults
    pub fn load_or_default(home: &Path) -> Self {
        let config_path = home.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path).unwrap_or_else(|err| {
                tracing::warn!(path = %config_path.display(), error = %err, "ignoring unreadable config");
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.backend.validate()?;
        self.tasks.validate()?;
        Ok(())
    }
}

/// Resolve the data directory: explicit path, `TASKLOG_HOME`, the platform
/// data dir, then `./.tasklog`.
pub fn resolve_home(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(env) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(env);
    }
    directories::ProjectDirs::from("", "", "tasklog")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".tasklog"))
}
