//! Time-window calculator
//!
//! Pure functions over `now` and the sync configuration. The notification
//! window is 90% of the polling interval: an event is "due" during at most one
//! polling pass, and the remaining 10% absorbs clock and scheduling jitter so
//! no event falls between two passes.

use chrono::{DateTime, Duration, Utc};
use presencesync_domain::constants::NOTIFICATION_WINDOW_PERCENT;
use presencesync_domain::{SyncConfig, TimeWindow};

/// Notification tolerance for a given polling interval.
pub fn notification_window(polling_interval_minutes: u32) -> Duration {
    let interval_ms = i64::from(polling_interval_minutes) * 60_000;
    Duration::milliseconds(interval_ms * i64::from(NOTIFICATION_WINDOW_PERCENT) / 100)
}

/// Windows derived from one [`SyncConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindows {
    probe_width: Duration,
    notification_window: Duration,
    lead_time: Duration,
    slot_minutes: u32,
}

impl TimeWindows {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            probe_width: Duration::minutes(i64::from(config.probe_window_minutes)),
            notification_window: notification_window(config.polling_interval_minutes),
            lead_time: Duration::minutes(i64::from(config.lead_time_minutes)),
            slot_minutes: config.probe_window_minutes,
        }
    }

    /// Interval asked about when probing "availability right now".
    pub fn probe_window(&self, now: DateTime<Utc>) -> TimeWindow {
        TimeWindow::starting_at(now, self.probe_width)
    }

    pub const fn notification_window(&self) -> Duration {
        self.notification_window
    }

    /// How far ahead of the event start a reminder should land.
    pub const fn lead_time(&self) -> Duration {
        self.lead_time
    }

    /// Availability view slot size; one slot covers the whole probe window.
    pub const fn slot_minutes(&self) -> u32 {
        self.slot_minutes
    }
}
