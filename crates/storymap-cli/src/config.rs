//! Configuration management for the Storymap CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storymap_core::error::StoryMapError;
use storymap_core::roots::RootPolicy;
use storymap_core::types::DEFAULT_BASE_NODE_SIZE;
use storymap_runtime::memory_store::MemoryStore;
use storymap_runtime::store::GraphStore;

pub const CONFIG_FILE: &str = "storymap.toml";
pub const DATA_DIR: &str = ".storymap";

/// Storymap project configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub story: StoryConfig,
    #[serde(default)]
    pub levels: LevelsConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    /// Project directory: where the config file was found. Relative store
    /// paths resolve against it.
    #[serde(skip)]
    pub root: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Json,
    Sqlite,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: Backend,
    /// Store file; defaults to `.storymap/store.json` or `.storymap/store.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryConfig {
    #[serde(default = "default_user")]
    pub user: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelsConfig {
    #[serde(default)]
    pub policy: RootPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_base_node_size")]
    pub base_node_size: f64,
}

// Default value functions
fn default_user() -> String { "local".to_string() }
fn default_base_node_size() -> f64 { DEFAULT_BASE_NODE_SIZE }

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            base_node_size: default_base_node_size(),
        }
    }
}

impl Config {
    /// Load config from storymap.toml in the current or parent directories.
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        Self::load_from(&cwd)
    }

    /// Load config from storymap.toml in `start` or its ancestors. Without
    /// one, defaults apply with `start` as the project directory.
    pub fn load_from(start: &Path) -> Result<Self> {
        let config = match find_config_file(start) {
            Some(path) => Self::from_file(&path)?,
            None => Config {
                root: start.to_path_buf(),
                ..Config::default()
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let base = self.display.base_node_size;
        if !(base.is_finite() && base > 0.0) {
            return Err(StoryMapError::invalid_config(
                "display.base_node_size",
                base.to_string(),
                "must be a positive number",
            )
            .into());
        }
        check_user("story.user", &self.story.user)
    }

    /// The `--user` override when given, else `story.user`.
    pub fn user<'a>(&'a self, user: Option<&'a str>) -> Result<&'a str> {
        match user {
            Some(user) => {
                check_user("--user", user)?;
                Ok(user)
            }
            None => Ok(&self.story.user),
        }
    }

    /// The project's `.storymap/` directory.
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    /// Resolved store file path.
    pub fn store_path(&self) -> PathBuf {
        match &self.store.path {
            Some(path) => self.root.join(path),
            None => {
                let file = match self.store.backend {
                    Backend::Json => "store.json",
                    Backend::Sqlite => "store.db",
                };
                self.data_dir().join(file)
            }
        }
    }

    /// Open the configured store backend.
    pub fn open_store(&self) -> Result<Arc<dyn GraphStore>> {
        let path = self.store_path();
        match self.store.backend {
            Backend::Json => {
                let store = MemoryStore::open(&path)
                    .with_context(|| format!("Failed to open store: {}", path.display()))?;
                Ok(Arc::new(store))
            }
            #[cfg(feature = "sqlite")]
            Backend::Sqlite => {
                let store = storymap_runtime::sqlite_store::SqliteStore::open(&path)
                    .with_context(|| format!("Failed to open store: {}", path.display()))?;
                Ok(Arc::new(store))
            }
            #[cfg(not(feature = "sqlite"))]
            Backend::Sqlite => anyhow::bail!("This build has no SQLite support; set store.backend = \"json\""),
        }
    }
}

/// User ids become store path segments.
fn check_user(field: &str, user: &str) -> Result<()> {
    if user.trim().is_empty() || user.contains('/') {
        return Err(StoryMapError::invalid_config(
            field,
            user,
            "must be non-empty and contain no '/'",
        )
        .into());
    }
    Ok(())
}

/// Find storymap.toml in `start` or its parent directories.
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.store.backend, Backend::Json);
        assert_eq!(config.story.user, "local");
        assert_eq!(config.levels.policy, RootPolicy::Condensation);
        assert_eq!(config.display.base_node_size, 10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sections_override_defaults() {
        let config: Config = toml::from_str(
            r#"
            [store]
            backend = "sqlite"
            path = "data/story.db"

            [story]
            user = "ada"

            [levels]
            policy = "sources-only"
            "#,
        )
        .unwrap();
        assert_eq!(config.store.backend, Backend::Sqlite);
        assert_eq!(config.store_path(), PathBuf::from("data/story.db"));
        assert_eq!(config.story.user, "ada");
        assert_eq!(config.levels.policy, RootPolicy::SourcesOnly);
    }

    #[test]
    fn bad_values_are_rejected() {
        let config: Config = toml::from_str("[display]\nbase_node_size = 0.0").unwrap();
        assert!(config.validate().is_err());

        let config: Config = toml::from_str("[story]\nuser = \"a/b\"").unwrap();
        assert!(config.validate().is_err());

        let config = Config::default();
        assert!(config.user(Some("a/b")).is_err());
        assert!(config.user(Some(" ")).is_err());
        assert_eq!(config.user(Some("ada")).unwrap(), "ada");
        assert_eq!(config.user(None).unwrap(), "local");

        assert!(toml::from_str::<Config>("[levels]\npolicy = \"random\"").is_err());
    }

    #[test]
    fn store_resolves_against_the_config_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("chapters").join("one");
        std::fs::create_dir_all(&nested).unwrap();
        Config::default().save(&dir.path().join(CONFIG_FILE)).unwrap();

        let config = Config::load_from(&nested).unwrap();
        assert_eq!(config.root, dir.path());
        assert_eq!(
            config.store_path(),
            dir.path().join(DATA_DIR).join("store.json")
        );

        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[store]\nbackend = \"sqlite\"\npath = \"data/story.db\"\n",
        )
        .unwrap();
        let config = Config::load_from(&nested).unwrap();
        assert_eq!(config.store_path(), dir.path().join("data").join("story.db"));
    }

    #[test]
    fn no_config_file_uses_the_start_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.store_path(), dir.path().join(DATA_DIR).join("store.json"));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut config = Config::default();
        config.story.user = "ada".into();
        config.save(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.story.user, "ada");
        assert_eq!(loaded.store.backend, Backend::Json);
    }
}
