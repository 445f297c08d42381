//! Cron-based scheduling of synchronization runs
//!
//! The scheduler follows the same runtime rules everywhere:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Timeout wrapping on all async operations

pub mod error;
pub mod status_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use status_scheduler::{cron_for_interval, StatusScheduler, StatusSchedulerConfig};
