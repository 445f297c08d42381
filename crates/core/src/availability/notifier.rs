//! Upcoming-event reminder selection and rendering
//!
//! Every event is localized in its own timezone before comparison, so two
//! events at the same instant expressed in different zones are treated alike.
//! Selection is stateless: nothing remembers which reminders went out.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use presencesync_domain::constants::{REMINDER_HEADER, SUBJECT_PRIVACY_PLACEHOLDER};
use presencesync_domain::{
    AnomalyKind, EventDateTime, NotificationEvent, ScheduleItem, SyncAnomaly,
};

use super::window::TimeWindows;

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const RENDER_FORMAT: &str = "%H:%M%Z";

/// Events due now plus the events that had to be skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub events: Vec<NotificationEvent>,
    pub anomalies: Vec<SyncAnomaly>,
}

/// Picks the events whose reminder is due in the current polling pass
#[derive(Debug, Clone, Copy)]
pub struct NotificationSelector {
    lead_time: Duration,
    window: Duration,
}

impl NotificationSelector {
    pub fn new(windows: &TimeWindows) -> Self {
        Self { lead_time: windows.lead_time(), window: windows.notification_window() }
    }

    /// Select and render the reminders due at `now` for one user.
    ///
    /// An event is due when `now + lead_time` falls strictly inside
    /// `(start - window, start + window)`.
    pub fn select(
        &self,
        now: DateTime<Utc>,
        chat_user_id: &str,
        schedule_id: &str,
        items: &[ScheduleItem],
    ) -> Selection {
        let mut selection = Selection::default();

        for item in items {
            let start = match localize(&item.start) {
                Ok(start) => start,
                Err(detail) => {
                    selection.anomalies.push(SyncAnomaly {
                        kind: AnomalyKind::InvalidEventTime,
                        schedule_id: schedule_id.to_owned(),
                        chat_user_id: Some(chat_user_id.to_owned()),
                        detail,
                    });
                    continue;
                }
            };

            let notify_at = now.with_timezone(&start.timezone()) + self.lead_time;
            let due = notify_at > start - self.window && notify_at < start + self.window;
            if !due {
                continue;
            }

            let end = localize(&item.end).ok();
            selection.events.push(NotificationEvent {
                chat_user_id: chat_user_id.to_owned(),
                schedule_id: schedule_id.to_owned(),
                starts_at: start.with_timezone(&Utc),
                subject: item.subject.clone(),
                message: render_reminder(item, &start, end.as_ref()),
            });
        }

        selection
    }
}

/// Parse a provider timestamp in the timezone it names.
///
/// Accepts RFC 3339 values with an explicit offset and naive
/// `YYYY-MM-DDTHH:MM:SS[.fffffff]` values interpreted in `time_zone`.
fn localize(value: &EventDateTime) -> Result<DateTime<Tz>, String> {
    let tz: Tz = value
        .time_zone
        .trim()
        .parse()
        .map_err(|_| format!("unknown timezone '{}'", value.time_zone))?;

    let raw = value.date_time.trim();
    if let Ok(fixed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(fixed.with_timezone(&tz));
    }

    let naive = NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT)
        .map_err(|err| format!("unparsable time '{raw}': {err}"))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("time '{raw}' does not exist in {tz}"))
}

fn render_reminder(item: &ScheduleItem, start: &DateTime<Tz>, end: Option<&DateTime<Tz>>) -> String {
    let mut message = String::from(REMINDER_HEADER);

    message.push('\n');
    message.push_str(&start.format(RENDER_FORMAT).to_string());
    if let Some(end) = end {
        message.push('-');
        message.push_str(&end.format(RENDER_FORMAT).to_string());
    }

    let subject = if item.subject.trim().is_empty() {
        SUBJECT_PRIVACY_PLACEHOLDER
    } else {
        item.subject.as_str()
    };
    message.push_str("\nSubject: ");
    message.push_str(subject);

    if !item.location.trim().is_empty() {
        message.push_str("\nLocation: ");
        message.push_str(&item.location);
    }

    message
}
