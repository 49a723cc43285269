//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/helpdesk/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/helpdesk/` (~/.config/helpdesk/)
//! - Data: `$XDG_DATA_HOME/helpdesk/` (~/.local/share/helpdesk/)
//! - State/Logs: `$XDG_STATE_HOME/helpdesk/` (~/.local/state/helpdesk/)

use crate::error::{Error, Result};
use crate::query::TicketSort;
use crate::store::TICKETS_KEY;
use crate::types::UserId;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Log files are named `<prefix>.YYYY-MM-DD`, one per day
pub const LOG_FILE_PREFIX: &str = "helpdesk.log";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Where tickets are persisted
    #[serde(default)]
    pub storage: StorageConfig,

    /// Inbox defaults
    #[serde(default)]
    pub inbox: InboxConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Durable storage configuration
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Override for the SQLite file holding the slots
    pub database_path: Option<PathBuf>,

    /// Slot key for the ticket list
    #[serde(default = "default_tickets_key")]
    pub tickets_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            tickets_key: default_tickets_key(),
        }
    }
}

fn default_tickets_key() -> String {
    TICKETS_KEY.to_string()
}

/// Inbox defaults
#[derive(Debug, Deserialize)]
pub struct InboxConfig {
    /// Default sort field (created_at, updated_at, priority, status, subject, id)
    #[serde(default = "default_sort")]
    pub sort: String,

    /// Default sort direction (asc, desc)
    #[serde(default = "default_order")]
    pub order: String,

    /// Team member replies are sent as when no author is given
    #[serde(default = "default_agent_id")]
    pub agent_id: UserId,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            sort: default_sort(),
            order: default_order(),
            agent_id: default_agent_id(),
        }
    }
}

impl InboxConfig {
    /// The configured default sort, validated
    pub fn default_sort(&self) -> Result<TicketSort> {
        TicketSort::parse(&self.sort, &self.order)
    }
}

fn default_sort() -> String {
    "created_at".to_string()
}

fn default_order() -> String {
    "desc".to_string()
}

fn default_agent_id() -> UserId {
    1
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if self.storage.tickets_key.trim().is_empty() {
            return Err(Error::Config(
                "storage.tickets_key must not be empty".to_string(),
            ));
        }
        self.inbox.default_sort()?;
        if self.logging.max_files == 0 {
            return Err(Error::Config(
                "logging.max_files must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Database file to use: the configured override or the XDG default
    pub fn resolved_database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(Self::database_path)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/helpdesk/config.toml` (~/.config/helpdesk/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("helpdesk").join("config.toml")
    }

    /// Returns the data directory path (for the SQLite database)
    ///
    /// `$XDG_DATA_HOME/helpdesk/` (~/.local/share/helpdesk/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("helpdesk")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/helpdesk/` (~/.local/state/helpdesk/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("helpdesk")
    }

    /// Returns the default database file path
    ///
    /// `$XDG_DATA_HOME/helpdesk/helpdesk.db`
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("helpdesk.db")
    }

    /// Returns the log file written on `date` (UTC)
    ///
    /// `$XDG_STATE_HOME/helpdesk/helpdesk.log.YYYY-MM-DD`
    pub fn log_path(date: NaiveDate) -> PathBuf {
        Self::state_dir().join(format!("{}.{}", LOG_FILE_PREFIX, date.format("%Y-%m-%d")))
    }
}
