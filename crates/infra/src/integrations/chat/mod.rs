//! Chat platform REST integration (presence and direct messages)

pub mod client;
pub mod types;

pub use client::ChatApiClient;
