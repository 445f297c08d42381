//! Outcome types produced by one synchronization run

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::presence::PresenceDecision;
use crate::constants::{
    SUMMARY_EMPTY_USER_INDEX, SUMMARY_NO_CONNECTED_USERS, SUMMARY_NO_SCHEDULE_INFO,
};

/// A reminder that is due in the current run
///
/// Computed fresh on every run; nothing records that it was sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub chat_user_id: String,
    pub schedule_id: String,
    pub starts_at: DateTime<Utc>,
    pub subject: String,
    /// Rendered direct-message text
    pub message: String,
}

/// Why a user or event was skipped or only partially handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// The provider returned an error for this mailbox
    ScheduleError,
    /// The provider returned a mailbox nobody asked for
    UnknownSchedule,
    EmptyAvailabilityView,
    UnrecognizedAvailability,
    InvalidEventTime,
    PresenceUpdateFailed,
    ReminderFailed,
}

/// A non-fatal problem recorded during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncAnomaly {
    pub kind: AnomalyKind,
    pub schedule_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_user_id: Option<String>,
    pub detail: String,
}

/// What happened for one user whose schedule was retrieved successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOutcome {
    pub chat_user_id: String,
    pub schedule_id: String,
    /// Classifier explanation; absent when the user had no known presence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<PresenceDecision>,
    /// True when a presence change was written
    pub presence_updated: bool,
    pub reminders_sent: usize,
}

/// Human-operator-facing summary of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum SyncSummary {
    EmptyUserIndex,
    NoConnectedUsers,
    NoScheduleInfo,
    /// Status line of the last user that was classified
    Status(String),
    /// JSON dump of the raw schedule results when nobody was classified
    RawSchedules(String),
}

impl SyncSummary {
    /// True for the "nothing to do" outcomes.
    pub const fn is_informational(&self) -> bool {
        matches!(self, Self::EmptyUserIndex | Self::NoConnectedUsers | Self::NoScheduleInfo)
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUserIndex => f.write_str(SUMMARY_EMPTY_USER_INDEX),
            Self::NoConnectedUsers => f.write_str(SUMMARY_NO_CONNECTED_USERS),
            Self::NoScheduleInfo => f.write_str(SUMMARY_NO_SCHEDULE_INFO),
            Self::Status(line) => f.write_str(line),
            Self::RawSchedules(dump) => f.write_str(dump),
        }
    }
}

/// Full result of one synchronization run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub summary: SyncSummary,
    /// Per-user outcomes in schedule-result order
    pub outcomes: Vec<UserOutcome>,
    pub anomalies: Vec<SyncAnomaly>,
}

impl SyncReport {
    pub fn informational(summary: SyncSummary) -> Self {
        Self { summary, outcomes: Vec::new(), anomalies: Vec::new() }
    }

    pub fn presence_updates(&self) -> usize {
        self.outcomes.iter().filter(|o| o.presence_updated).count()
    }

    pub fn reminders_sent(&self) -> usize {
        self.outcomes.iter().map(|o| o.reminders_sent).sum()
    }
}
