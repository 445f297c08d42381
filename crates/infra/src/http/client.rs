//! Retrying HTTP transport shared by the Graph and chat adapters
//!
//! Graph throttles `getSchedule` with `429` plus a `Retry-After` header and
//! the chat server occasionally answers `502`/`503` during restarts. Both are
//! retried here so adapters only see the final response.

use std::time::Duration;

use presencesync_domain::PresenceSyncError;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::errors::{status_error, InfraError};

const USER_AGENT: &str = concat!("presencesync/", env!("CARGO_PKG_VERSION"));

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RetryPolicy {
    max_attempts: usize,
    base_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based). A server-provided
    /// `Retry-After` wins over the exponential schedule, capped at
    /// `max_backoff`.
    fn delay(&self, retry: usize, retry_after: Option<Duration>) -> Duration {
        let delay = retry_after.unwrap_or_else(|| {
            let shift = u32::try_from(retry.saturating_sub(1).min(8)).unwrap_or(8);
            self.base_backoff.saturating_mul(1u32 << shift)
        });
        delay.min(self.max_backoff)
    }
}

/// Outcome of one attempt
enum Attempt {
    Done(Response),
    Retry { retry_after: Option<Duration> },
    Failed(PresenceSyncError),
}

/// HTTP client with per-request timeout and bounded retries.
///
/// Server errors, `429` and connect/timeout failures are retried; every other
/// response is handed back unchanged.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    retry: RetryPolicy,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send `builder`, retrying transient failures.
    ///
    /// Request bodies must be buffered (`json`, `form`) so they can be replayed.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, PresenceSyncError> {
        let attempts = self.retry.max_attempts;
        let mut attempt = 1;

        loop {
            let replay = builder.try_clone().ok_or_else(|| {
                PresenceSyncError::Internal("streaming request bodies cannot be retried".into())
            })?;
            let last = attempt >= attempts;

            match self.attempt(replay, attempt, last).await? {
                Attempt::Done(response) => return Ok(response),
                Attempt::Failed(err) => return Err(err),
                Attempt::Retry { retry_after } => {
                    let delay = self.retry.delay(attempt, retry_after);
                    debug!(
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "retrying HTTP request"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(
        &self,
        builder: RequestBuilder,
        attempt: usize,
        last: bool,
    ) -> Result<Attempt, PresenceSyncError> {
        let request = builder.build().map_err(into_domain)?;
        let method = request.method().clone();
        let path = request.url().path().to_owned();

        match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status();
                debug!(attempt, %method, %path, %status, "HTTP response");
                if last || !is_transient_status(status) {
                    return Ok(Attempt::Done(response));
                }
                if status == StatusCode::TOO_MANY_REQUESTS {
                    warn!(%method, %path, "throttled by remote service");
                }
                Ok(Attempt::Retry { retry_after: retry_after(&response) })
            }
            Err(err) => {
                debug!(attempt, %method, %path, error = %err, "HTTP request failed");
                if last || !is_transient_error(&err) {
                    return Ok(Attempt::Failed(into_domain(err)));
                }
                Ok(Attempt::Retry { retry_after: None })
            }
        }
    }

    /// Send and decode a JSON body. Non-success statuses become domain errors
    /// prefixed with `context`.
    pub async fn send_json<T>(
        &self,
        builder: RequestBuilder,
        context: &str,
    ) -> Result<T, PresenceSyncError>
    where
        T: DeserializeOwned,
    {
        let response = self.send_success(builder, context).await?;
        response.json::<T>().await.map_err(|err| {
            PresenceSyncError::Network(format!("{context}: failed to decode response: {err}"))
        })
    }

    /// Send and require a 2xx status.
    pub async fn send_success(
        &self,
        builder: RequestBuilder,
        context: &str,
    ) -> Result<Response, PresenceSyncError> {
        let response = self.send(builder).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(context, status, &body))
    }
}

/// Builder for [`HttpClient`]
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    retry: RetryPolicy,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryPolicy {
                max_attempts: 3,
                base_backoff: Duration::from_millis(200),
                max_backoff: Duration::from_secs(30),
            },
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total tries including the first one.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.retry.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.retry.base_backoff = backoff;
        self
    }

    /// Upper bound for any single wait, including `Retry-After`.
    pub fn max_backoff(mut self, backoff: Duration) -> Self {
        self.retry.max_backoff = backoff;
        self
    }

    pub fn build(self) -> Result<HttpClient, PresenceSyncError> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(into_domain)?;

        Ok(HttpClient { client, retry: self.retry })
    }
}

fn into_domain(err: reqwest::Error) -> PresenceSyncError {
    InfraError::from(err).into()
}

fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn is_transient_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

/// `Retry-After` in delta-seconds form; HTTP-date values are ignored.
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
