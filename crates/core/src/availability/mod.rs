//! Availability-to-presence synchronization domain

pub mod classifier;
pub mod fetcher;
pub mod notifier;
pub mod ports;
pub mod service;
pub mod window;

pub use ports::*;
pub use service::*;
