//! In-memory chat platform: presence plus direct messages

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use presencesync_core::{DirectMessenger, PresenceService};
use presencesync_domain::{PresenceState, PresenceSyncError, Result as DomainResult};

#[derive(Default, Clone)]
pub struct MockChat {
    presence: Arc<Mutex<HashMap<String, PresenceState>>>,
    updates: Arc<Mutex<Vec<(String, PresenceState)>>>,
    messages: Arc<Mutex<Vec<(String, String)>>>,
    batch_requests: Arc<Mutex<Vec<Vec<String>>>>,
    failing_updates: Arc<Mutex<HashSet<String>>>,
    failing_messages: Arc<Mutex<HashSet<String>>>,
    batch_failure: Arc<Mutex<Option<PresenceSyncError>>>,
}

impl MockChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_presence(self, chat_user_id: &str, state: PresenceState) -> Self {
        self.presence.lock().unwrap().insert(chat_user_id.to_owned(), state);
        self
    }

    pub fn failing_update_for(self, chat_user_id: &str) -> Self {
        self.failing_updates.lock().unwrap().insert(chat_user_id.to_owned());
        self
    }

    pub fn failing_messages_for(self, chat_user_id: &str) -> Self {
        self.failing_messages.lock().unwrap().insert(chat_user_id.to_owned());
        self
    }

    pub fn failing_batch(self, err: PresenceSyncError) -> Self {
        *self.batch_failure.lock().unwrap() = Some(err);
        self
    }

    pub fn presence_of(&self, chat_user_id: &str) -> Option<PresenceState> {
        self.presence.lock().unwrap().get(chat_user_id).copied()
    }

    pub fn updates(&self) -> Vec<(String, PresenceState)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn batch_requests(&self) -> Vec<Vec<String>> {
        self.batch_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PresenceService for MockChat {
    async fn get_presence_batch(
        &self,
        chat_user_ids: &[String],
    ) -> DomainResult<HashMap<String, PresenceState>> {
        self.batch_requests.lock().unwrap().push(chat_user_ids.to_vec());
        if let Some(err) = self.batch_failure.lock().unwrap().clone() {
            return Err(err);
        }
        let presence = self.presence.lock().unwrap();
        Ok(chat_user_ids
            .iter()
            .filter_map(|id| presence.get(id).map(|state| (id.clone(), *state)))
            .collect())
    }

    async fn set_presence(&self, chat_user_id: &str, state: PresenceState) -> DomainResult<()> {
        if self.failing_updates.lock().unwrap().contains(chat_user_id) {
            return Err(PresenceSyncError::Network(format!("status update for {chat_user_id}")));
        }
        self.presence.lock().unwrap().insert(chat_user_id.to_owned(), state);
        self.updates.lock().unwrap().push((chat_user_id.to_owned(), state));
        Ok(())
    }
}

#[async_trait]
impl DirectMessenger for MockChat {
    async fn send_direct_message(&self, chat_user_id: &str, message: &str) -> DomainResult<()> {
        if self.failing_messages.lock().unwrap().contains(chat_user_id) {
            return Err(PresenceSyncError::Network(format!("dm to {chat_user_id}")));
        }
        self.messages.lock().unwrap().push((chat_user_id.to_owned(), message.to_owned()));
        Ok(())
    }
}
