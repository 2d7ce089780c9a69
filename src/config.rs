//! Settings: a RON file in the user config directory, environment
//! credentials, and command-line overrides, applied in that order.

use crate::error::ConfigError;
use crate::store::DEFAULT_COLLECTION;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.ron";
pub const API_KEY_VAR: &str = "FIREBASE_API_KEY";
pub const PROJECT_ID_VAR: &str = "FIREBASE_PROJECT_ID";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub store: StoreConfig,
    pub scene: SceneConfig,
    /// `env_logger` filter; `RUST_LOG` wins when set.
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub api_key: String,
    pub project_id: String,
    pub collection: String,
    /// Keep presets in memory for this run instead of a remote store.
    pub offline: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub star_count: usize,
    pub star_seed: u64,
    /// Edge length in pixels of the sphere sprites.
    pub sphere_resolution: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { width: 1400.0, height: 900.0, title: "Solar System".to_string() }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            project_id: String::new(),
            collection: DEFAULT_COLLECTION.to_string(),
            offline: false,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self { star_count: 5000, star_seed: 0x5eed, sphere_resolution: 96 }
    }
}

impl StoreConfig {
    /// Credentials are present and not template placeholders.
    pub fn is_configured(&self) -> bool {
        let usable = |v: &str| !v.trim().is_empty() && !v.contains("YOUR_");
        usable(&self.api_key) && usable(&self.project_id) && !self.collection.trim().is_empty()
    }
}

impl AppConfig {
    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("solar-viz")
    }

    /// Load `config.ron` from `config_dir`, writing defaults if it is missing.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        if path.exists() {
            let text = std::fs::read_to_string(&path).map_err(ConfigError::Read)?;
            ron::from_str(&text).map_err(ConfigError::Parse)
        } else {
            let config = Self::default();
            config.save(config_dir)?;
            Ok(config)
        }
    }

    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::Write)?;
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(ConfigError::Serialize)?;
        std::fs::write(config_dir.join(CONFIG_FILE), text).map_err(ConfigError::Write)
    }

    /// Take store credentials from the environment when set.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_VAR) {
            self.store.api_key = key;
        }
        if let Some(project) = lookup(PROJECT_ID_VAR) {
            self.store.project_id = project;
        }
    }

    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(ref key) = args.api_key {
            self.store.api_key = key.clone();
        }
        if let Some(ref project) = args.project_id {
            self.store.project_id = project.clone();
        }
        if let Some(ref collection) = args.collection {
            self.store.collection = collection.clone();
        }
        if args.offline {
            self.store.offline = true;
        }
        if let Some(ref level) = args.log_level {
            self.log_level = level.clone();
        }
    }

    pub fn log_filter(&self) -> &str {
        if self.log_level.trim().is_empty() {
            "info"
        } else {
            &self.log_level
        }
    }
}

/// Command-line arguments. Values override the settings file and environment.
#[derive(Parser, Debug, Default)]
#[command(name = "solar-viz", about = "Interactive solar system visualizer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<f32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<f32>,

    /// Firestore web API key.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Firestore project id.
    #[arg(long)]
    pub project_id: Option<String>,

    /// Collection holding saved configurations.
    #[arg(long)]
    pub collection: Option<String>,

    /// Keep saved configurations in memory for this run only.
    #[arg(long)]
    pub offline: bool,

    /// Log filter (error, warn, info, debug, trace, or env_logger syntax).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Directory holding config.ron (overrides the default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_persistence_off() {
        let config = AppConfig::default();
        assert!(!config.store.is_configured());
        assert_eq!(config.store.collection, "solarSystemConfigs");
        assert_eq!(config.scene.star_count, 5000);
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn placeholders_do_not_count_as_credentials() {
        let mut store = StoreConfig {
            api_key: "YOUR_API_KEY".to_string(),
            project_id: "demo-project".to_string(),
            ..StoreConfig::default()
        };
        assert!(!store.is_configured());
        store.api_key = "AIzaSyReal".to_string();
        assert!(store.is_configured());
        store.project_id = "   ".to_string();
        assert!(!store.is_configured());
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_create(dir.path()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn saved_file_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.store.project_id = "orrery".to_string();
        config.scene.sphere_resolution = 64;
        config.save(dir.path()).unwrap();
        assert_eq!(AppConfig::load_or_create(dir.path()).unwrap(), config);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "(log_level: \"debug\")").unwrap();
        let config = AppConfig::load_or_create(dir.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn invalid_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "(window: [").unwrap();
        assert!(matches!(AppConfig::load_or_create(dir.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn env_then_cli_take_precedence() {
        let mut config = AppConfig::default();
        config.apply_env(|var| match var {
            API_KEY_VAR => Some("env-key".to_string()),
            PROJECT_ID_VAR => Some("env-project".to_string()),
            _ => None,
        });
        assert_eq!(config.store.api_key, "env-key");

        let args = CliArgs {
            project_id: Some("cli-project".to_string()),
            width: Some(1920.0),
            offline: true,
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.store.api_key, "env-key");
        assert_eq!(config.store.project_id, "cli-project");
        assert_eq!(config.window.width, 1920.0);
        assert_eq!(config.window.height, 900.0);
        assert!(config.store.offline);
    }
}
