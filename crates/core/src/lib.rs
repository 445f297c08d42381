//! # PresenceSync Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains the availability-to-presence synchronization engine:
//! - Time-window calculation (probe window, notification window, lead time)
//! - Batched schedule fetching through the calendar port
//! - Availability classification into presence decisions
//! - Upcoming-event reminder selection and rendering
//! - The orchestrator that composes them over a batch of users
//!
//! ## Architecture Principles
//! - Only depends on `presencesync-domain`
//! - No database, HTTP, or platform code
//! - All external collaborators via traits in [`availability::ports`]
//! - Stateless across runs: every run works on fresh snapshots

pub mod availability;

// Re-export specific items to avoid ambiguity
pub use availability::classifier::{classify, Classification};
pub use availability::fetcher::ScheduleFetcher;
pub use availability::notifier::{NotificationSelector, Selection};
pub use availability::ports::{
    Clock, DirectMessenger, PresenceService, RemoteCalendarClient, SystemClock, UserDirectory,
};
pub use availability::service::AvailabilityService;
pub use availability::window::{notification_window, TimeWindows};
