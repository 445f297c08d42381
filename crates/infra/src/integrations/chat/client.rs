//! Chat REST adapter
//!
//! Implements both presence ports against a Mattermost-compatible `/api/v4`.
//! Direct messages are posted by the bot account into the bot/user direct
//! channel, which the platform creates on first use.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use presencesync_core::{DirectMessenger, PresenceService};
use presencesync_domain::{ChatConfig, PresenceState, PresenceSyncError, Result};
use reqwest::{Method, RequestBuilder};
use tracing::{debug, warn};

use super::types::{Channel, NewPost, StatusUpdate, UserStatus};
use crate::http::HttpClient;

/// [`PresenceService`] and [`DirectMessenger`] over the chat REST API
#[derive(Clone)]
pub struct ChatApiClient {
    http: HttpClient,
    base_url: String,
    bot_token: String,
    bot_user_id: String,
}

impl ChatApiClient {
    pub fn new(config: &ChatConfig, bot_user_id: &str) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;
        Ok(Self::with_http(http, config, bot_user_id))
    }

    pub fn with_http(http: HttpClient, config: &ChatConfig, bot_user_id: &str) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            bot_token: config.bot_token.clone(),
            bot_user_id: bot_user_id.to_owned(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/api/v4{path}", self.base_url))
            .bearer_auth(&self.bot_token)
    }

    async fn direct_channel(&self, chat_user_id: &str) -> Result<String> {
        if self.bot_user_id.is_empty() {
            return Err(PresenceSyncError::Config(
                "sync.bot_user_id is required to send direct messages".into(),
            ));
        }
        let request = self
            .request(Method::POST, "/channels/direct")
            .json(&[self.bot_user_id.as_str(), chat_user_id]);
        let channel: Channel = self.http.send_json(request, "create direct channel").await?;
        Ok(channel.id)
    }
}

#[async_trait]
impl PresenceService for ChatApiClient {
    async fn get_presence_batch(
        &self,
        chat_user_ids: &[String],
    ) -> Result<HashMap<String, PresenceState>> {
        if chat_user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let request = self.request(Method::POST, "/users/status/ids").json(chat_user_ids);
        let statuses: Vec<UserStatus> = self.http.send_json(request, "get statuses").await?;

        let mut presence = HashMap::with_capacity(statuses.len());
        for UserStatus { user_id, status } in statuses {
            match PresenceState::from_str(&status) {
                Ok(state) => {
                    presence.insert(user_id, state);
                }
                Err(_) => {
                    warn!(chat_user_id = %user_id, %status, "ignoring unknown presence value");
                }
            }
        }

        debug!(requested = chat_user_ids.len(), known = presence.len(), "fetched presence batch");
        Ok(presence)
    }

    async fn set_presence(&self, chat_user_id: &str, state: PresenceState) -> Result<()> {
        let path = format!("/users/{}/status", urlencoding::encode(chat_user_id));
        let request = self
            .request(Method::PUT, &path)
            .json(&StatusUpdate { user_id: chat_user_id, status: state.as_str() });
        self.http.send_success(request, "update status").await?;
        Ok(())
    }
}

#[async_trait]
impl DirectMessenger for ChatApiClient {
    async fn send_direct_message(&self, chat_user_id: &str, message: &str) -> Result<()> {
        let channel_id = self.direct_channel(chat_user_id).await?;
        let request = self
            .request(Method::POST, "/posts")
            .json(&NewPost { channel_id: &channel_id, message });
        self.http.send_success(request, "create post").await?;
        debug!(%chat_user_id, "direct message posted");
        Ok(())
    }
}
