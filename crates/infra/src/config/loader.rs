//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Attempt to load from environment variables
//! 2. If a required variable is missing, fall back to a config file
//! 3. Probe several locations for the file
//! 4. Validate the result before handing it out
//!
//! ## Environment Variables
//! Required:
//! - `PRESENCESYNC_GRAPH_TENANT_ID`, `PRESENCESYNC_GRAPH_CLIENT_ID`,
//!   `PRESENCESYNC_GRAPH_CLIENT_SECRET`: Graph application credentials
//! - `PRESENCESYNC_CHAT_BASE_URL`, `PRESENCESYNC_CHAT_BOT_TOKEN`: chat REST API
//! - `PRESENCESYNC_DB_PATH`: connected-user directory database
//!
//! Optional:
//! - `PRESENCESYNC_GRAPH_API_BASE_URL`, `PRESENCESYNC_GRAPH_AUTHORITY_URL`
//! - `PRESENCESYNC_GRAPH_TIMEOUT_SECONDS`, `PRESENCESYNC_CHAT_TIMEOUT_SECONDS`
//! - `PRESENCESYNC_DB_POOL_SIZE`
//! - `PRESENCESYNC_POLL_INTERVAL_MINUTES`, `PRESENCESYNC_PROBE_WINDOW_MINUTES`,
//!   `PRESENCESYNC_LEAD_TIME_MINUTES`, `PRESENCESYNC_RUN_TIMEOUT_SECONDS`
//! - `PRESENCESYNC_BOT_USER_ID`, `PRESENCESYNC_CALLER_IDENTITY`
//! - `PRESENCESYNC_LOG_LEVEL`, `PRESENCESYNC_LOG_FORMAT` (`pretty` or `json`)
//!
//! ## File Locations
//! `presencesync.{toml,json}` then `config.{toml,json}`, probed in the current
//! directory, its two parents, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use presencesync_domain::{
    ChatConfig, Config, DatabaseConfig, GraphConfig, LogFormat, LoggingConfig, PresenceSyncError,
    Result, SyncConfig,
};

const FILE_NAMES: [&str; 4] =
    ["presencesync.toml", "presencesync.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `PresenceSyncError::Config` if neither source yields a valid
/// configuration.
pub fn load() -> Result<Config> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = %e, "environment incomplete, trying config file");
            load_from_file(None)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `PresenceSyncError::Config` if a required variable is missing or a
/// numeric variable does not parse.
pub fn load_from_env() -> Result<Config> {
    let defaults = SyncConfig::default();
    let sync = SyncConfig {
        polling_interval_minutes: env_parse("PRESENCESYNC_POLL_INTERVAL_MINUTES")?
            .unwrap_or(defaults.polling_interval_minutes),
        probe_window_minutes: env_parse("PRESENCESYNC_PROBE_WINDOW_MINUTES")?
            .unwrap_or(defaults.probe_window_minutes),
        lead_time_minutes: env_parse("PRESENCESYNC_LEAD_TIME_MINUTES")?
            .unwrap_or(defaults.lead_time_minutes),
        bot_user_id: std::env::var("PRESENCESYNC_BOT_USER_ID").unwrap_or_default(),
        caller_identity: std::env::var("PRESENCESYNC_CALLER_IDENTITY").unwrap_or_default(),
        run_timeout_seconds: env_parse("PRESENCESYNC_RUN_TIMEOUT_SECONDS")?
            .unwrap_or(defaults.run_timeout_seconds),
    };

    let mut graph = GraphConfig {
        tenant_id: env_var("PRESENCESYNC_GRAPH_TENANT_ID")?,
        client_id: env_var("PRESENCESYNC_GRAPH_CLIENT_ID")?,
        client_secret: env_var("PRESENCESYNC_GRAPH_CLIENT_SECRET")?,
        api_base_url: "https://graph.microsoft.com/v1.0".into(),
        authority_url: "https://login.microsoftonline.com".into(),
        request_timeout_seconds: env_parse("PRESENCESYNC_GRAPH_TIMEOUT_SECONDS")?.unwrap_or(30),
    };
    if let Ok(url) = std::env::var("PRESENCESYNC_GRAPH_API_BASE_URL") {
        graph.api_base_url = url;
    }
    if let Ok(url) = std::env::var("PRESENCESYNC_GRAPH_AUTHORITY_URL") {
        graph.authority_url = url;
    }

    let chat = ChatConfig {
        base_url: env_var("PRESENCESYNC_CHAT_BASE_URL")?,
        bot_token: env_var("PRESENCESYNC_CHAT_BOT_TOKEN")?,
        request_timeout_seconds: env_parse("PRESENCESYNC_CHAT_TIMEOUT_SECONDS")?.unwrap_or(30),
    };

    let database = DatabaseConfig {
        path: env_var("PRESENCESYNC_DB_PATH")?,
        pool_size: env_parse("PRESENCESYNC_DB_POOL_SIZE")?.unwrap_or(4),
    };

    let mut logging = LoggingConfig::default();
    if let Ok(level) = std::env::var("PRESENCESYNC_LOG_LEVEL") {
        logging.level = level;
    }
    if let Ok(format) = std::env::var("PRESENCESYNC_LOG_FORMAT") {
        logging.format = parse_log_format(&format)?;
    }

    Ok(Config { sync, graph, chat, database, logging })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations via
/// [`probe_config_paths`]. Format is picked by extension.
///
/// # Errors
/// Returns `PresenceSyncError::Config` if no file is found, it cannot be
/// read, or it does not parse.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PresenceSyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PresenceSyncError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PresenceSyncError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PresenceSyncError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PresenceSyncError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(PresenceSyncError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a config file.
///
/// Returns the first candidate that exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        PresenceSyncError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional environment variable; unset yields `None`.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| PresenceSyncError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat> {
    match value.trim().to_ascii_lowercase().as_str() {
        "pretty" | "text" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        other => Err(PresenceSyncError::Config(format!("Unsupported log format: {other}"))),
    }
}
