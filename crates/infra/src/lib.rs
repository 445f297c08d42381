//! # PresenceSync Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - The connected-user directory (SQLite via r2d2)
//! - The Microsoft Graph schedule client
//! - The chat REST client (presence and direct messages)
//! - Configuration loading, logging setup and the cron scheduler
//!
//! ## Architecture
//! - Implements traits defined in `presencesync-core`
//! - Contains all "impure" code (I/O, network, clock-driven scheduling)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod logging;
pub mod scheduling;

// Re-export commonly used items
pub use database::{DbManager, SqliteUserDirectory};
pub use errors::InfraError;
pub use http::HttpClient;
pub use integrations::chat::ChatApiClient;
pub use integrations::graph::GraphScheduleClient;
pub use scheduling::{StatusScheduler, StatusSchedulerConfig};
