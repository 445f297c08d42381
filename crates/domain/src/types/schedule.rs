//! Schedule (free/busy) query and result types
//!
//! These mirror what the calendar provider returns for a batched schedule
//! lookup: one [`ScheduleResult`] per queried mailbox, each carrying either an
//! error or an availability view plus the upcoming events in the window.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Provider-reported availability for a single slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvailabilityCode {
    Free,
    Tentative,
    Busy,
    OutOfOffice,
    WorkingElsewhere,
    /// Any code the provider may add later
    Unknown(char),
}

impl AvailabilityCode {
    /// Decode one character of an availability view string.
    pub const fn from_char(code: char) -> Self {
        match code {
            '0' => Self::Free,
            '1' => Self::Tentative,
            '2' => Self::Busy,
            '3' => Self::OutOfOffice,
            '4' => Self::WorkingElsewhere,
            other => Self::Unknown(other),
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            Self::Free => '0',
            Self::Tentative => '1',
            Self::Busy => '2',
            Self::OutOfOffice => '3',
            Self::WorkingElsewhere => '4',
            Self::Unknown(code) => code,
        }
    }

    pub const fn is_recognized(self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for AvailabilityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Half-open UTC interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn starting_at(start: DateTime<Utc>, width: Duration) -> Self {
        Self { start, end: start + width }
    }

    pub fn width(&self) -> Duration {
        self.end - self.start
    }
}

/// One batched schedule lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleQuery {
    /// Identity the lookup is issued as
    pub caller_identity: String,
    /// Mailboxes to look up, in directory order
    pub schedule_ids: Vec<String>,
    pub window: TimeWindow,
    /// Availability view slot size in minutes
    pub slot_minutes: u32,
}

/// Wall-clock time plus the timezone it is expressed in, as sent by the
/// provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDateTime {
    pub date_time: String,
    pub time_zone: String,
}

impl EventDateTime {
    pub fn new(date_time: impl Into<String>, time_zone: impl Into<String>) -> Self {
        Self { date_time: date_time.into(), time_zone: time_zone.into() }
    }
}

/// Summary of one upcoming event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub start: EventDateTime,
    pub end: EventDateTime,
    /// Empty when the owner's privacy settings hide it
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub location: String,
    /// Free/busy status of the event itself (`busy`, `tentative`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

/// Per-mailbox lookup failure reported inside an otherwise successful batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleError {
    pub message: String,
    pub response_code: String,
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.response_code)
    }
}

/// Schedule information for one queried mailbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub schedule_id: String,
    /// One availability code character per slot
    #[serde(default)]
    pub availability_view: String,
    #[serde(default)]
    pub items: Vec<ScheduleItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ScheduleError>,
}

impl ScheduleResult {
    pub fn success(
        schedule_id: impl Into<String>,
        availability_view: impl Into<String>,
        items: Vec<ScheduleItem>,
    ) -> Self {
        Self {
            schedule_id: schedule_id.into(),
            availability_view: availability_view.into(),
            items,
            error: None,
        }
    }

    pub fn failure(schedule_id: impl Into<String>, error: ScheduleError) -> Self {
        Self {
            schedule_id: schedule_id.into(),
            availability_view: String::new(),
            items: Vec::new(),
            error: Some(error),
        }
    }

    /// Availability for the slot starting now. Later slots are ignored.
    pub fn current_availability(&self) -> Option<AvailabilityCode> {
        self.availability_view.chars().next().map(AvailabilityCode::from_char)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_codes_decode_provider_digits() {
        let decoded: Vec<_> = "01234".chars().map(AvailabilityCode::from_char).collect();
        assert_eq!(
            decoded,
            vec![
                AvailabilityCode::Free,
                AvailabilityCode::Tentative,
                AvailabilityCode::Busy,
                AvailabilityCode::OutOfOffice,
                AvailabilityCode::WorkingElsewhere,
            ]
        );
        assert_eq!(AvailabilityCode::from_char('7'), AvailabilityCode::Unknown('7'));
        assert!(!AvailabilityCode::from_char('7').is_recognized());
    }

    #[test]
    fn only_first_slot_is_current() {
        let result = ScheduleResult::success("a@example.com", "302", Vec::new());
        assert_eq!(result.current_availability(), Some(AvailabilityCode::OutOfOffice));
    }

    #[test]
    fn failed_result_has_no_availability() {
        let result = ScheduleResult::failure(
            "a@example.com",
            ScheduleError { message: "mailbox not found".into(), response_code: "404".into() },
        );
        assert_eq!(result.current_availability(), None);
    }
}
