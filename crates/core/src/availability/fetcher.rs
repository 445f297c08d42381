//! Schedule fetcher - one batched lookup per run

use std::sync::Arc;

use presencesync_domain::{PresenceSyncError, Result, ScheduleQuery, ScheduleResult, TimeWindow};
use tracing::{debug, error};

use super::ports::RemoteCalendarClient;

/// Thin wrapper that turns a user batch into a single [`ScheduleQuery`].
///
/// The provider limits users per call and calls per minute, so the whole batch
/// always goes out as one request.
pub struct ScheduleFetcher {
    client: Arc<dyn RemoteCalendarClient>,
}

impl ScheduleFetcher {
    pub fn new(client: Arc<dyn RemoteCalendarClient>) -> Self {
        Self { client }
    }

    /// Fetch schedules for `schedule_ids` over `window`.
    ///
    /// # Errors
    /// Returns `PresenceSyncError::RemoteUnavailable` when the remote call
    /// could not complete. Per-mailbox failures are returned inside the
    /// results instead.
    pub async fn fetch_schedules(
        &self,
        caller_identity: &str,
        schedule_ids: Vec<String>,
        window: TimeWindow,
        slot_minutes: u32,
    ) -> Result<Vec<ScheduleResult>> {
        let query = ScheduleQuery {
            caller_identity: caller_identity.to_owned(),
            schedule_ids,
            window,
            slot_minutes,
        };

        debug!(
            schedules = query.schedule_ids.len(),
            start = %query.window.start,
            end = %query.window.end,
            slot_minutes,
            "requesting schedule batch"
        );

        self.client.get_schedule(&query).await.map_err(|err| {
            error!(error = %err, kind = err.label(), "schedule batch request failed");
            match err {
                PresenceSyncError::RemoteUnavailable(_) => err,
                other => PresenceSyncError::RemoteUnavailable(format!(
                    "schedule lookup failed: {other}"
                )),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    #[derive(Default)]
    struct RecordingClient {
        queries: Mutex<Vec<ScheduleQuery>>,
        fail_with: Option<PresenceSyncError>,
    }

    #[async_trait]
    impl RemoteCalendarClient for RecordingClient {
        async fn get_schedule(&self, query: &ScheduleQuery) -> Result<Vec<ScheduleResult>> {
            self.queries.lock().unwrap().push(query.clone());
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(query
                    .schedule_ids
                    .iter()
                    .map(|id| ScheduleResult::success(id.clone(), "0", Vec::new()))
                    .collect()),
            }
        }
    }

    fn window() -> TimeWindow {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
        TimeWindow::starting_at(start, Duration::minutes(15))
    }

    #[tokio::test]
    async fn issues_one_query_for_the_whole_batch() {
        let client = Arc::new(RecordingClient::default());
        let fetcher = ScheduleFetcher::new(client.clone());

        let results = fetcher
            .fetch_schedules(
                "bot-remote-id",
                vec!["a@example.com".into(), "b@example.com".into()],
                window(),
                15,
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        let queries = client.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].caller_identity, "bot-remote-id");
        assert_eq!(queries[0].slot_minutes, 15);
    }

    #[tokio::test]
    async fn transport_failures_become_remote_unavailable() {
        let client = Arc::new(RecordingClient {
            fail_with: Some(PresenceSyncError::Network("connection reset".into())),
            ..RecordingClient::default()
        });
        let fetcher = ScheduleFetcher::new(client);

        let err = fetcher
            .fetch_schedules("caller", vec!["a@example.com".into()], window(), 15)
            .await
            .unwrap_err();

        match err {
            PresenceSyncError::RemoteUnavailable(msg) => assert!(msg.contains("connection reset")),
            other => panic!("expected remote unavailable, got {other:?}"),
        }
    }
}
