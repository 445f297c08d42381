//! Shared test helpers for `presencesync-core` integration tests.
//!
//! In-memory port implementations plus a fixed clock, so orchestrator tests
//! can focus on behaviour instead of wiring.

#![allow(dead_code)]

pub mod calendar;
pub mod chat;
pub mod repositories;

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use presencesync_core::{AvailabilityService, Clock};
use presencesync_domain::SyncConfig;

pub use calendar::{item_at, MockCalendarClient};
pub use chat::MockChat;
pub use repositories::MockUserDirectory;

pub const BOT_ID: &str = "bot";

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Monday 2024-03-04 08:00:00 UTC
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap()
}

pub fn sync_config() -> SyncConfig {
    SyncConfig {
        polling_interval_minutes: 10,
        bot_user_id: BOT_ID.to_owned(),
        caller_identity: "bot-remote-id".to_owned(),
        ..SyncConfig::default()
    }
}

/// Everything a test needs to drive and inspect one service.
pub struct Harness {
    pub directory: MockUserDirectory,
    pub calendar: MockCalendarClient,
    pub chat: MockChat,
    pub service: AvailabilityService,
}

impl Harness {
    pub fn new(
        directory: MockUserDirectory,
        calendar: MockCalendarClient,
        chat: MockChat,
    ) -> Self {
        Self::with_config(sync_config(), directory, calendar, chat)
    }

    pub fn with_config(
        config: SyncConfig,
        directory: MockUserDirectory,
        calendar: MockCalendarClient,
        chat: MockChat,
    ) -> Self {
        let service = AvailabilityService::new(
            config,
            Arc::new(directory.clone()),
            Arc::new(calendar.clone()),
            Arc::new(chat.clone()),
            Arc::new(chat.clone()),
        )
        .with_clock(Arc::new(FixedClock(fixed_now())));

        Self { directory, calendar, chat, service }
    }
}
