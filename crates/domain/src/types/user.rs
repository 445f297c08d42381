//! Connected-user records
//!
//! Owned by the external user directory; the engine only reads them.

use serde::{Deserialize, Serialize};

/// A chat user whose calendar account has been linked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Chat-platform user id
    pub chat_user_id: String,
    /// Calendar mailbox the schedule is looked up by
    pub mailbox: String,
    /// Calendar-provider object id, when the link flow recorded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_user_id: Option<String>,
}

impl UserRecord {
    pub fn new(chat_user_id: impl Into<String>, mailbox: impl Into<String>) -> Self {
        Self { chat_user_id: chat_user_id.into(), mailbox: mailbox.into(), remote_user_id: None }
    }

    pub fn with_remote_user_id(mut self, remote_user_id: impl Into<String>) -> Self {
        self.remote_user_id = Some(remote_user_id.into());
        self
    }

    /// Key used to match schedule results back to users.
    pub fn mailbox_key(&self) -> String {
        normalize_mailbox(&self.mailbox)
    }
}

/// Case-folded mailbox used on both sides of a schedule match.
///
/// Providers may echo the mailbox with different casing, including
/// non-ASCII letters in the local part.
pub fn normalize_mailbox(mailbox: &str) -> String {
    mailbox.trim().to_lowercase()
}
