//! Configuration structures
//!
//! Loaded by `presencesync-infra::config` from environment variables or a
//! TOML/JSON file. Every section except `graph`, `chat` and `database` has
//! usable defaults.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LEAD_TIME_MINUTES, DEFAULT_POLLING_INTERVAL_MINUTES, DEFAULT_PROBE_WINDOW_MINUTES,
};
use crate::{PresenceSyncError, Result};

/// Full application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncConfig,
    pub graph: GraphConfig,
    pub chat: ChatConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.sync.validate()?;
        self.graph.validate()?;
        self.chat.validate()?;
        if self.database.path.trim().is_empty() {
            return Err(PresenceSyncError::Config("database.path must not be empty".into()));
        }
        Ok(())
    }
}

/// Settings consumed by the synchronization engine.
///
/// Passed to the orchestrator at construction so tests can inject arbitrary
/// windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// How often a full sync runs.
    pub polling_interval_minutes: u32,
    /// Width of the availability probe window, also used as slot granularity.
    pub probe_window_minutes: u32,
    /// How far ahead of an event start the reminder should land.
    pub lead_time_minutes: u32,
    /// Chat id of the service's own automation account, excluded from
    /// sync-all runs and used as the sender of direct messages.
    pub bot_user_id: String,
    /// Calendar-side identity the batched schedule lookup is issued as.
    pub caller_identity: String,
    /// Upper bound for one scheduled run.
    pub run_timeout_seconds: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            polling_interval_minutes: DEFAULT_POLLING_INTERVAL_MINUTES,
            probe_window_minutes: DEFAULT_PROBE_WINDOW_MINUTES,
            lead_time_minutes: DEFAULT_LEAD_TIME_MINUTES,
            bot_user_id: String::new(),
            caller_identity: String::new(),
            run_timeout_seconds: 120,
        }
    }
}

/// True when ticks every `minutes` minutes land evenly within each hour.
///
/// The notification window assumes a fixed gap between passes, so the
/// interval has to divide 60.
pub const fn is_even_polling_interval(minutes: u32) -> bool {
    minutes > 0 && minutes <= 30 && 60 % minutes == 0
}

impl SyncConfig {
    /// Reject configurations that would produce empty windows, uneven
    /// polling, or no way to identify the schedule caller.
    pub fn validate(&self) -> Result<()> {
        if self.polling_interval_minutes == 0 {
            return Err(PresenceSyncError::Config(
                "sync.polling_interval_minutes must be greater than zero".into(),
            ));
        }
        if !is_even_polling_interval(self.polling_interval_minutes) {
            return Err(PresenceSyncError::Config(format!(
                "sync.polling_interval_minutes must divide 60 evenly, got {}",
                self.polling_interval_minutes
            )));
        }
        if self.probe_window_minutes == 0 {
            return Err(PresenceSyncError::Config(
                "sync.probe_window_minutes must be greater than zero".into(),
            ));
        }
        if self.caller_identity.trim().is_empty() && self.bot_user_id.trim().is_empty() {
            return Err(PresenceSyncError::Config(
                "sync.caller_identity or sync.bot_user_id must be set".into(),
            ));
        }
        Ok(())
    }
}

/// Microsoft Graph application credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_graph_api_base")]
    pub api_base_url: String,
    #[serde(default = "default_authority_url")]
    pub authority_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl GraphConfig {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("graph.tenant_id", &self.tenant_id),
            ("graph.client_id", &self.client_id),
            ("graph.client_secret", &self.client_secret),
        ] {
            if value.trim().is_empty() {
                return Err(PresenceSyncError::Config(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }
}

/// Chat platform REST settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub base_url: String,
    pub bot_token: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl ChatConfig {
    fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(PresenceSyncError::Config("chat.base_url must not be empty".into()));
        }
        if self.bot_token.trim().is_empty() {
            return Err(PresenceSyncError::Config("chat.bot_token must not be empty".into()));
        }
        Ok(())
    }
}

/// Connected-user directory storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".into(), format: LogFormat::Pretty }
    }
}

/// Log line encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_graph_api_base() -> String {
    "https://graph.microsoft.com/v1.0".into()
}

fn default_authority_url() -> String {
    "https://login.microsoftonline.com".into()
}

const fn default_request_timeout() -> u64 {
    30
}

const fn default_pool_size() -> u32 {
    4
}
