//! # Application Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command line (highest priority)                                    │
//! │     inventory --db ./dev.db list                                       │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     INVENTORY_DB_PATH=./dev.db                                         │
//! │     INVENTORY_LOG=debug                                                │
//! │     INVENTORY_DESTRUCTIVE_MIGRATIONS=true                              │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     ~/.config/inventory/inventory.toml (Linux)                         │
//! │     ~/Library/Application Support/com.inventory.app/inventory.toml     │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # inventory.toml
//! database_path = "/var/lib/inventory/inventory.db"
//! search_debounce_ms = 300
//! stop_timeout_ms = 5000
//! log_filter = "info,inventory=debug,sqlx=warn"
//! destructive_migrations = false
//! ```

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use inventory_db::DbConfig;
use inventory_ui::UiConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

/// Default `tracing` filter when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,inventory=debug,sqlx=warn";

/// Longest accepted search debounce.
const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Longest accepted grace period.
const MAX_STOP_TIMEOUT_MS: u64 = 3_600_000;

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Database file; `None` uses the platform data directory.
    pub database_path: Option<PathBuf>,

    /// Quiet period before a search is applied (milliseconds).
    pub search_debounce_ms: u64,

    /// How long unobserved screens keep their queries (milliseconds).
    pub stop_timeout_ms: u64,

    /// `tracing` filter directives.
    pub log_filter: String,

    /// Drop and rebuild the database when its schema history doesn't match.
    pub destructive_migrations: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: None,
            search_debounce_ms: 300,
            stop_timeout_ms: 5_000,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            destructive_migrations: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`inventory.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml_str(&contents)?;
            } else if explicit {
                return Err(AppError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> AppResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `INVENTORY_*` overrides looked up through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("INVENTORY_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some(filter) = lookup("INVENTORY_LOG") {
            self.log_filter = filter;
        }

        if let Some(flag) = lookup("INVENTORY_DESTRUCTIVE_MIGRATIONS") {
            match parse_flag(&flag) {
                Some(enabled) => self.destructive_migrations = enabled,
                None => warn!(value = %flag, "Unknown INVENTORY_DESTRUCTIVE_MIGRATIONS value"),
            }
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(path) = &self.database_path {
            if path.as_os_str().is_empty() {
                return Err(AppError::Config("database_path must not be empty".into()));
            }
        }

        if self.search_debounce_ms > MAX_DEBOUNCE_MS {
            return Err(AppError::Config(format!(
                "search_debounce_ms must be at most {}",
                MAX_DEBOUNCE_MS
            )));
        }

        if self.stop_timeout_ms > MAX_STOP_TIMEOUT_MS {
            return Err(AppError::Config(format!(
                "stop_timeout_ms must be at most {}",
                MAX_STOP_TIMEOUT_MS
            )));
        }

        if self.log_filter.trim().is_empty() {
            return Err(AppError::Config("log_filter must not be empty".into()));
        }

        Ok(())
    }

    /// Database file to open, creating the platform data directory if needed.
    pub fn resolved_database_path(&self) -> AppResult<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        let dirs = Self::project_dirs()
            .ok_or_else(|| AppError::Config("could not determine app data directory".into()))?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(data_dir.join("inventory.db"))
    }

    /// Storage settings derived from this configuration.
    pub fn db_config(&self) -> AppResult<DbConfig> {
        Ok(DbConfig::new(self.resolved_database_path()?)
            .destructive_fallback(self.destructive_migrations))
    }

    /// View-model timing derived from this configuration.
    pub fn ui_config(&self) -> UiConfig {
        UiConfig {
            search_debounce: Duration::from_millis(self.search_debounce_ms),
            stop_timeout: Duration::from_millis(self.stop_timeout_ms),
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "inventory", "app")
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("inventory.toml"))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
