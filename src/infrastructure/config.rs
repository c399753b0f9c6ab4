// src/infrastructure/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::Collection;

/// TOML configuration for the studyshare client
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub collections: CollectionIds,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Appwrite,
    /// In-process store, nothing persists between runs.
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub database_id: String,
    #[serde(default)]
    pub bucket_id: String,
    /// Base URL of the web application, used for share links.
    #[serde(default = "default_app_url")]
    pub app_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CollectionIds {
    #[serde(default = "default_notes")]
    pub notes: String,
    #[serde(default = "default_todos")]
    pub todos: String,
    #[serde(default = "default_comments")]
    pub comments: String,
    #[serde(default = "default_likes")]
    pub likes: String,
    #[serde(default = "default_follows")]
    pub follows: String,
}

// Default value functions
fn default_endpoint() -> String { "https://cloud.appwrite.io/v1".to_string() }
fn default_app_url() -> String { "http://localhost:5173".to_string() }
fn default_notes() -> String { Collection::Notes.name().to_string() }
fn default_todos() -> String { Collection::Todos.name().to_string() }
fn default_comments() -> String { Collection::Comments.name().to_string() }
fn default_likes() -> String { Collection::Likes.name().to_string() }
fn default_follows() -> String { Collection::Follows.name().to_string() }

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            endpoint: default_endpoint(),
            project: String::new(),
            database_id: String::new(),
            bucket_id: String::new(),
            app_url: default_app_url(),
        }
    }
}

impl Default for CollectionIds {
    fn default() -> Self {
        Self {
            notes: default_notes(),
            todos: default_todos(),
            comments: default_comments(),
            likes: default_likes(),
            follows: default_follows(),
        }
    }
}

impl CollectionIds {
    pub fn id(&self, collection: Collection) -> &str {
        match collection {
            Collection::Notes => &self.notes,
            Collection::Todos => &self.todos,
            Collection::Comments => &self.comments,
            Collection::Likes => &self.likes,
            Collection::Follows => &self.follows,
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Load from `path`, or from the default location when it exists, or fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        std::fs::write(path.as_ref(), toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("studyshare").join("config.toml"))
    }

    /// Checks the settings the REST backend cannot work without.
    pub fn validate(&self) -> Result<()> {
        if self.backend.kind == BackendKind::Memory {
            return Ok(());
        }
        let missing: Vec<&str> = [
            ("project", &self.backend.project),
            ("database_id", &self.backend.database_id),
            ("bucket_id", &self.backend.bucket_id),
        ]
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("Missing [backend] settings: {}", missing.join(", "))
        }
    }
}
