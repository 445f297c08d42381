//! Microsoft Graph integration
//!
//! Batched free/busy lookups through `calendar/getSchedule`, authenticated
//! with an application (client-credentials) token.

pub mod auth;
pub mod client;
pub mod types;

pub use auth::GraphTokenProvider;
pub use client::GraphScheduleClient;
