//! Application constants
//!
//! Defaults for the sync configuration plus the fixed strings that appear in
//! user-facing summaries and reminders.

// Time-window defaults (minutes)
pub const DEFAULT_POLLING_INTERVAL_MINUTES: u32 = 5;
pub const DEFAULT_PROBE_WINDOW_MINUTES: u32 = 15;
pub const DEFAULT_LEAD_TIME_MINUTES: u32 = 10;

/// Share of the polling interval used as the notification window, in percent.
pub const NOTIFICATION_WINDOW_PERCENT: u32 = 90;

// Informational summaries
pub const SUMMARY_NO_CONNECTED_USERS: &str = "No connected users found";
pub const SUMMARY_NO_SCHEDULE_INFO: &str = "No schedule info found";
pub const SUMMARY_EMPTY_USER_INDEX: &str = "No users found in user index";

// Reminder rendering
pub const REMINDER_HEADER: &str = "You have an upcoming event:";
pub const SUBJECT_PRIVACY_PLACEHOLDER: &str =
    "Not available. Check your privacy settings so we can show you the subject.";
