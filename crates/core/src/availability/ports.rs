//! Port interfaces for availability synchronization
//!
//! These traits define the boundaries between the engine and the systems it
//! talks to: the connected-user directory, the calendar provider, and the
//! chat platform's presence and messaging APIs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use presencesync_domain::{PresenceState, Result, ScheduleQuery, ScheduleResult, UserRecord};

/// Read access to the users who linked a calendar account
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Load every connected user in directory order.
    ///
    /// Fails with `PresenceSyncError::NotFound` when the directory is empty.
    async fn load_all_connected_users(&self) -> Result<Vec<UserRecord>>;

    /// Load a single user by chat id.
    ///
    /// Fails with `PresenceSyncError::NotFound` when the user is not connected.
    async fn load_user_by_chat_id(&self, chat_user_id: &str) -> Result<UserRecord>;
}

/// Batched free/busy lookup against the calendar provider
///
/// Implementations authenticate with a service-level credential, not with
/// any individual user's token.
#[async_trait]
pub trait RemoteCalendarClient: Send + Sync {
    /// Look up every mailbox in `query` with a single remote call.
    ///
    /// A failure for one mailbox is reported in that entry's `error` field;
    /// only a call that cannot complete at all returns `Err`.
    async fn get_schedule(&self, query: &ScheduleQuery) -> Result<Vec<ScheduleResult>>;
}

/// Chat platform presence
#[async_trait]
pub trait PresenceService: Send + Sync {
    /// Current presence for each requested user that the platform knows.
    ///
    /// Users with no known presence are absent from the map.
    async fn get_presence_batch(
        &self,
        chat_user_ids: &[String],
    ) -> Result<HashMap<String, PresenceState>>;

    async fn set_presence(&self, chat_user_id: &str, state: PresenceState) -> Result<()>;
}

/// Chat platform direct messages sent by the service's bot account
#[async_trait]
pub trait DirectMessenger: Send + Sync {
    async fn send_direct_message(&self, chat_user_id: &str, message: &str) -> Result<()>;
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
