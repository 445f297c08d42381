//! Graph `getSchedule` adapter

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use presencesync_core::RemoteCalendarClient;
use presencesync_domain::{
    GraphConfig, PresenceSyncError, Result, ScheduleQuery, ScheduleResult,
};
use reqwest::Method;
use tracing::{debug, warn};

use super::auth::GraphTokenProvider;
use super::types::{GetScheduleRequest, GetScheduleResponse, GraphDateTime};
use crate::http::HttpClient;

const GRAPH_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const OUTLOOK_TIMEZONE_HEADER: &str = r#"outlook.timezone="UTC""#;

/// [`RemoteCalendarClient`] backed by Microsoft Graph
#[derive(Clone)]
pub struct GraphScheduleClient {
    http: HttpClient,
    tokens: Arc<GraphTokenProvider>,
    api_base_url: String,
}

impl GraphScheduleClient {
    pub fn new(config: &GraphConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;
        Ok(Self::with_http(http, config))
    }

    pub fn with_http(http: HttpClient, config: &GraphConfig) -> Self {
        let tokens = Arc::new(GraphTokenProvider::new(http.clone(), config));
        Self { http, tokens, api_base_url: config.api_base_url.trim_end_matches('/').to_owned() }
    }

    fn schedule_url(&self, caller_identity: &str) -> String {
        format!(
            "{}/users/{}/calendar/getSchedule",
            self.api_base_url,
            urlencoding::encode(caller_identity)
        )
    }

    async fn post_schedule(
        &self,
        url: &str,
        body: &GetScheduleRequest,
    ) -> Result<GetScheduleResponse> {
        let token = self.tokens.access_token().await?;
        let request = self
            .http
            .request(Method::POST, url)
            .bearer_auth(token)
            .header("Prefer", OUTLOOK_TIMEZONE_HEADER)
            .json(body);
        self.http.send_json(request, "getSchedule").await
    }
}

#[async_trait]
impl RemoteCalendarClient for GraphScheduleClient {
    async fn get_schedule(&self, query: &ScheduleQuery) -> Result<Vec<ScheduleResult>> {
        let caller = query.caller_identity.trim();
        if caller.is_empty() {
            return Err(PresenceSyncError::Config(
                "sync.caller_identity is required for schedule lookups".into(),
            ));
        }
        if query.schedule_ids.is_empty() {
            return Ok(Vec::new());
        }

        let body = GetScheduleRequest {
            schedules: query.schedule_ids.clone(),
            start_time: GraphDateTime {
                date_time: query.window.start.format(GRAPH_DATE_FORMAT).to_string(),
                time_zone: "UTC".into(),
            },
            end_time: GraphDateTime {
                date_time: query.window.end.format(GRAPH_DATE_FORMAT).to_string(),
                time_zone: "UTC".into(),
            },
            availability_view_interval: query.slot_minutes,
        };
        let url = self.schedule_url(caller);

        let response = match self.post_schedule(&url, &body).await {
            Err(PresenceSyncError::Auth(msg)) => {
                // token may have been revoked server-side
                warn!(error = %msg, "getSchedule rejected token, retrying with a fresh one");
                self.tokens.invalidate().await;
                self.post_schedule(&url, &body).await?
            }
            other => other?,
        };

        debug!(
            requested = query.schedule_ids.len(),
            returned = response.value.len(),
            "getSchedule completed"
        );

        Ok(response.value.into_iter().map(ScheduleResult::from).collect())
    }
}
