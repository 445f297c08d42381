//! Application token acquisition (OAuth2 client-credentials grant)

use std::time::{Duration, Instant};

use presencesync_domain::{GraphConfig, PresenceSyncError, Result};
use reqwest::Method;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::types::TokenResponse;
use crate::http::HttpClient;

const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";
/// Refresh this long before the reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Acquires and caches the service-level Graph token.
pub struct GraphTokenProvider {
    http: HttpClient,
    token_url: String,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<CachedToken>>,
}

impl GraphTokenProvider {
    pub fn new(http: HttpClient, config: &GraphConfig) -> Self {
        let token_url = format!(
            "{}/{}/oauth2/v2.0/token",
            config.authority_url.trim_end_matches('/'),
            urlencoding::encode(config.tenant_id.trim())
        );
        Self {
            http,
            token_url,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            cached: Mutex::new(None),
        }
    }

    /// A valid bearer token, fetching a new one when the cached token is
    /// missing or about to expire.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.access_token.clone());
            }
            debug!("cached Graph token expired");
        }

        let token = self.fetch_token().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    /// Drop the cached token so the next call fetches a fresh one.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn fetch_token(&self) -> Result<CachedToken> {
        let request = self.http.request(Method::POST, &self.token_url).form(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", GRAPH_DEFAULT_SCOPE),
            ("grant_type", "client_credentials"),
        ]);

        let response: TokenResponse =
            self.http.send_json(request, "token request").await.map_err(|err| match err {
                PresenceSyncError::RemoteUnavailable(_) => err,
                other => PresenceSyncError::Auth(format!("Graph token request failed: {other}")),
            })?;

        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(EXPIRY_MARGIN);
        info!(expires_in = response.expires_in, "acquired Graph application token");

        Ok(CachedToken { access_token: response.access_token, expires_at: Instant::now() + lifetime })
    }
}
