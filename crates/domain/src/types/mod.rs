//! Domain types and models

pub mod presence;
pub mod schedule;
pub mod sync;
pub mod user;

pub use presence::{PresenceDecision, PresenceState};
pub use schedule::{
    AvailabilityCode, EventDateTime, ScheduleError, ScheduleItem, ScheduleQuery, ScheduleResult,
    TimeWindow,
};
pub use sync::{
    AnomalyKind, NotificationEvent, SyncAnomaly, SyncReport, SyncSummary, UserOutcome,
};
pub use user::{normalize_mailbox, UserRecord};
