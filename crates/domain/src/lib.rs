//! # PresenceSync Domain
//!
//! Business domain types for the calendar-to-presence synchronization engine.
//!
//! This crate contains:
//! - Connected-user records and presence states
//! - Schedule query/result types mirroring the calendar provider's free/busy
//!   payload
//! - Sync outcome and report types
//! - Domain error types and Result definitions
//! - Configuration structures and defaults
//!
//! ## Architecture
//! - No dependencies on other PresenceSync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
