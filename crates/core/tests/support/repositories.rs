//! In-memory user directory

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use presencesync_core::UserDirectory;
use presencesync_domain::{PresenceSyncError, Result as DomainResult, UserRecord};

/// Directory seeded with a fixed, ordered list of users.
///
/// An empty mock behaves like an empty index and returns `NotFound`.
#[derive(Default, Clone)]
pub struct MockUserDirectory {
    users: Arc<Mutex<Vec<UserRecord>>>,
    failure: Arc<Mutex<Option<PresenceSyncError>>>,
    loads: Arc<Mutex<usize>>,
}

impl MockUserDirectory {
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self { users: Arc::new(Mutex::new(users)), ..Self::default() }
    }

    /// Convenience helper: `(chat id, mailbox)` pairs.
    pub fn with_users(pairs: &[(&str, &str)]) -> Self {
        Self::new(pairs.iter().map(|(id, mailbox)| UserRecord::new(*id, *mailbox)).collect())
    }

    /// Make every load fail with `err`.
    pub fn failing(self, err: PresenceSyncError) -> Self {
        *self.failure.lock().unwrap() = Some(err);
        self
    }

    pub fn load_count(&self) -> usize {
        *self.loads.lock().unwrap()
    }
}

#[async_trait]
impl UserDirectory for MockUserDirectory {
    async fn load_all_connected_users(&self) -> DomainResult<Vec<UserRecord>> {
        *self.loads.lock().unwrap() += 1;
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        let users = self.users.lock().unwrap().clone();
        if users.is_empty() {
            return Err(PresenceSyncError::NotFound("user index".into()));
        }
        Ok(users)
    }

    async fn load_user_by_chat_id(&self, chat_user_id: &str) -> DomainResult<UserRecord> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.chat_user_id == chat_user_id)
            .cloned()
            .ok_or_else(|| PresenceSyncError::NotFound(format!("user {chat_user_id}")))
    }
}
