//! Scripted calendar provider

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use presencesync_core::RemoteCalendarClient;
use presencesync_domain::{
    EventDateTime, PresenceSyncError, Result as DomainResult, ScheduleError, ScheduleItem,
    ScheduleQuery, ScheduleResult,
};

/// Returns one scripted result per requested mailbox and records every query.
///
/// Mailboxes without a script get an all-free view with no events.
#[derive(Default, Clone)]
pub struct MockCalendarClient {
    scripted: Arc<Mutex<HashMap<String, ScheduleResult>>>,
    extra: Arc<Mutex<Vec<ScheduleResult>>>,
    queries: Arc<Mutex<Vec<ScheduleQuery>>>,
    failure: Arc<Mutex<Option<PresenceSyncError>>>,
    empty: Arc<Mutex<bool>>,
}

impl MockCalendarClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(self, mailbox: &str, view: &str) -> Self {
        self.with_result(ScheduleResult::success(mailbox, view, Vec::new()))
    }

    pub fn with_items(self, mailbox: &str, view: &str, items: Vec<ScheduleItem>) -> Self {
        self.with_result(ScheduleResult::success(mailbox, view, items))
    }

    pub fn with_error(self, mailbox: &str, message: &str, code: &str) -> Self {
        self.with_result(ScheduleResult::failure(
            mailbox,
            ScheduleError { message: message.into(), response_code: code.into() },
        ))
    }

    pub fn with_result(self, result: ScheduleResult) -> Self {
        self.scripted.lock().unwrap().insert(result.schedule_id.to_lowercase(), result);
        self
    }

    /// Append a result nobody asked for.
    pub fn with_unrequested(self, result: ScheduleResult) -> Self {
        self.extra.lock().unwrap().push(result);
        self
    }

    /// Respond with an empty result list.
    pub fn returning_nothing(self) -> Self {
        *self.empty.lock().unwrap() = true;
        self
    }

    pub fn failing(self, err: PresenceSyncError) -> Self {
        *self.failure.lock().unwrap() = Some(err);
        self
    }

    pub fn queries(&self) -> Vec<ScheduleQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteCalendarClient for MockCalendarClient {
    async fn get_schedule(&self, query: &ScheduleQuery) -> DomainResult<Vec<ScheduleResult>> {
        self.queries.lock().unwrap().push(query.clone());
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        if *self.empty.lock().unwrap() {
            return Ok(Vec::new());
        }

        let scripted = self.scripted.lock().unwrap();
        let mut results: Vec<ScheduleResult> = query
            .schedule_ids
            .iter()
            .map(|id| {
                scripted
                    .get(&id.to_lowercase())
                    .cloned()
                    .unwrap_or_else(|| ScheduleResult::success(id.clone(), "0", Vec::new()))
            })
            .collect();
        results.extend(self.extra.lock().unwrap().iter().cloned());
        Ok(results)
    }
}

/// Event with naive provider timestamps in `time_zone`.
pub fn item_at(start: &str, end: &str, time_zone: &str, subject: &str) -> ScheduleItem {
    ScheduleItem {
        start: EventDateTime::new(start, time_zone),
        end: EventDateTime::new(end, time_zone),
        subject: subject.to_owned(),
        location: String::new(),
        status: Some("busy".into()),
        is_private: false,
    }
}
