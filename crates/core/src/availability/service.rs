//! Synchronization orchestrator
//!
//! One run resolves the requested users, fetches their schedules in a single
//! batch, takes one presence snapshot, then walks the results in order:
//! reminders first, then the presence decision. Per-user problems become
//! [`SyncAnomaly`] entries; only directory, schedule-fetch and presence-batch
//! failures abort the run.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use presencesync_domain::{
    normalize_mailbox, AnomalyKind, PresenceState, PresenceSyncError, Result, ScheduleResult,
    SyncAnomaly, SyncConfig, SyncReport, SyncSummary, UserOutcome, UserRecord,
};
use tracing::{debug, error, info, instrument, warn};

use super::classifier::classify;
use super::fetcher::ScheduleFetcher;
use super::notifier::NotificationSelector;
use super::ports::{
    Clock, DirectMessenger, PresenceService, RemoteCalendarClient, SystemClock, UserDirectory,
};
use super::window::TimeWindows;

/// Availability-to-presence synchronization service
pub struct AvailabilityService {
    config: SyncConfig,
    windows: TimeWindows,
    directory: Arc<dyn UserDirectory>,
    fetcher: ScheduleFetcher,
    presence: Arc<dyn PresenceService>,
    messenger: Arc<dyn DirectMessenger>,
    clock: Arc<dyn Clock>,
}

impl AvailabilityService {
    pub fn new(
        config: SyncConfig,
        directory: Arc<dyn UserDirectory>,
        calendar: Arc<dyn RemoteCalendarClient>,
        presence: Arc<dyn PresenceService>,
        messenger: Arc<dyn DirectMessenger>,
    ) -> Self {
        Self {
            windows: TimeWindows::from_config(&config),
            config,
            directory,
            fetcher: ScheduleFetcher::new(calendar),
            presence,
            messenger,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the wall clock, mainly for tests.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Sync a single chat user.
    pub async fn sync_status(&self, chat_user_id: &str) -> Result<SyncReport> {
        self.sync_status_users(&[chat_user_id.to_owned()]).await
    }

    /// Sync every connected user except the service's own bot account.
    #[instrument(skip(self))]
    pub async fn sync_status_all(&self) -> Result<SyncReport> {
        let Some(users) = self.load_user_index().await? else {
            return Ok(SyncReport::informational(SyncSummary::EmptyUserIndex));
        };

        let targets: Vec<UserRecord> = users
            .into_iter()
            .filter(|user| user.chat_user_id != self.config.bot_user_id)
            .collect();

        self.run(targets).await
    }

    /// Sync the given chat users.
    ///
    /// Ids without a directory entry are dropped; the rest keep request order.
    #[instrument(skip(self, chat_user_ids), fields(requested = chat_user_ids.len()))]
    pub async fn sync_status_users(&self, chat_user_ids: &[String]) -> Result<SyncReport> {
        if chat_user_ids.is_empty() {
            return Ok(SyncReport::informational(SyncSummary::NoConnectedUsers));
        }

        let Some(users) = self.load_user_index().await? else {
            return Ok(SyncReport::informational(SyncSummary::EmptyUserIndex));
        };

        let mut by_chat_id: HashMap<String, UserRecord> =
            users.into_iter().map(|user| (user.chat_user_id.clone(), user)).collect();

        let targets: Vec<UserRecord> =
            chat_user_ids.iter().filter_map(|id| by_chat_id.remove(id)).collect();

        self.run(targets).await
    }

    /// `None` when the directory is empty.
    async fn load_user_index(&self) -> Result<Option<Vec<UserRecord>>> {
        match self.directory.load_all_connected_users().await {
            Ok(users) => Ok(Some(users)),
            Err(PresenceSyncError::NotFound(_)) => {
                info!("user index is empty");
                Ok(None)
            }
            Err(err) => {
                error!(error = %err, "failed to load user index");
                Err(err)
            }
        }
    }

    /// Identity the schedule batch is issued as.
    ///
    /// `sync.caller_identity` when set, otherwise the remote object id recorded
    /// for the bot account when it was connected.
    async fn caller_identity(&self) -> Result<String> {
        let configured = self.config.caller_identity.trim();
        if !configured.is_empty() {
            return Ok(configured.to_owned());
        }

        let bot = self.config.bot_user_id.trim();
        if bot.is_empty() {
            return Err(PresenceSyncError::Config(
                "sync.caller_identity or sync.bot_user_id must be set".into(),
            ));
        }

        let record = self.directory.load_user_by_chat_id(bot).await.map_err(|err| match err {
            PresenceSyncError::NotFound(_) => PresenceSyncError::Config(format!(
                "bot account {bot} is not connected and sync.caller_identity is unset"
            )),
            other => other,
        })?;

        record.remote_user_id.filter(|id| !id.trim().is_empty()).ok_or_else(|| {
            PresenceSyncError::Config(format!(
                "bot account {bot} has no remote user id and sync.caller_identity is unset"
            ))
        })
    }

    async fn run(&self, users: Vec<UserRecord>) -> Result<SyncReport> {
        if users.is_empty() {
            info!("no connected users to sync");
            return Ok(SyncReport::informational(SyncSummary::NoConnectedUsers));
        }

        let caller = self.caller_identity().await.map_err(|err| {
            error!(error = %err, "cannot resolve schedule caller identity");
            err
        })?;

        let now = self.clock.now();
        let window = self.windows.probe_window(now);
        let schedule_ids: Vec<String> = users.iter().map(|u| u.mailbox.clone()).collect();

        let results = self
            .fetcher
            .fetch_schedules(
                &caller,
                schedule_ids,
                window,
                self.windows.slot_minutes(),
            )
            .await?;

        if results.is_empty() {
            info!(users = users.len(), "provider returned no schedule info");
            return Ok(SyncReport::informational(SyncSummary::NoScheduleInfo));
        }

        let chat_ids: Vec<String> = users.iter().map(|u| u.chat_user_id.clone()).collect();
        let presence = self.presence.get_presence_batch(&chat_ids).await.map_err(|err| {
            error!(error = %err, users = chat_ids.len(), "failed to fetch presence batch");
            err
        })?;

        let report = self.apply(now, &users, &results, &presence).await;
        info!(
            users = users.len(),
            schedules = results.len(),
            presence_updates = report.presence_updates(),
            reminders_sent = report.reminders_sent(),
            anomalies = report.anomalies.len(),
            "sync run complete"
        );
        Ok(report)
    }

    async fn apply(
        &self,
        now: DateTime<Utc>,
        users: &[UserRecord],
        results: &[ScheduleResult],
        presence: &HashMap<String, PresenceState>,
    ) -> SyncReport {
        let by_mailbox: HashMap<String, &UserRecord> =
            users.iter().map(|user| (user.mailbox_key(), user)).collect();
        let selector = NotificationSelector::new(&self.windows);

        let mut outcomes = Vec::with_capacity(results.len());
        let mut anomalies = Vec::new();
        let mut seen = HashSet::new();

        for result in results {
            let key = normalize_mailbox(&result.schedule_id);
            let Some(user) = by_mailbox.get(&key).copied() else {
                anomalies.push(record(
                    AnomalyKind::UnknownSchedule,
                    result,
                    None,
                    "schedule does not belong to any requested user".to_owned(),
                ));
                continue;
            };
            if !seen.insert(key) {
                debug!(schedule_id = %result.schedule_id, "duplicate schedule result ignored");
                continue;
            }

            if let Some(schedule_error) = &result.error {
                anomalies.push(record(
                    AnomalyKind::ScheduleError,
                    result,
                    Some(user),
                    schedule_error.to_string(),
                ));
                continue;
            }

            let mut outcome = UserOutcome {
                chat_user_id: user.chat_user_id.clone(),
                schedule_id: result.schedule_id.clone(),
                status_line: None,
                decision: None,
                presence_updated: false,
                reminders_sent: 0,
            };

            let selection =
                selector.select(now, &user.chat_user_id, &result.schedule_id, &result.items);
            for anomaly in selection.anomalies {
                warn!(
                    chat_user_id = %user.chat_user_id,
                    schedule_id = %result.schedule_id,
                    detail = %anomaly.detail,
                    "skipping event with invalid time"
                );
                anomalies.push(anomaly);
            }
            // reminders go out even when presence is unknown
            for event in selection.events {
                match self.messenger.send_direct_message(&user.chat_user_id, &event.message).await
                {
                    Ok(()) => {
                        debug!(chat_user_id = %user.chat_user_id, starts_at = %event.starts_at, "reminder sent");
                        outcome.reminders_sent += 1;
                    }
                    Err(err) => anomalies.push(record(
                        AnomalyKind::ReminderFailed,
                        result,
                        Some(user),
                        err.to_string(),
                    )),
                }
            }

            if let Some(current) = presence.get(&user.chat_user_id).copied() {
                self.apply_presence(result, user, current, &mut outcome, &mut anomalies).await;
            } else {
                debug!(chat_user_id = %user.chat_user_id, "no known presence, leaving untouched");
            }

            outcomes.push(outcome);
        }

        let summary = outcomes
            .iter()
            .rev()
            .find_map(|o| o.status_line.clone())
            .map(SyncSummary::Status)
            .unwrap_or_else(|| SyncSummary::RawSchedules(json_block(results)));

        SyncReport { summary, outcomes, anomalies }
    }

    async fn apply_presence(
        &self,
        result: &ScheduleResult,
        user: &UserRecord,
        current: PresenceState,
        outcome: &mut UserOutcome,
        anomalies: &mut Vec<SyncAnomaly>,
    ) {
        let Some(code) = result.current_availability() else {
            anomalies.push(record(
                AnomalyKind::EmptyAvailabilityView,
                result,
                Some(user),
                "availability view is empty".to_owned(),
            ));
            return;
        };

        let classification = classify(code, current);
        if !code.is_recognized() {
            anomalies.push(record(
                AnomalyKind::UnrecognizedAvailability,
                result,
                Some(user),
                classification.message.clone(),
            ));
        }

        if let Some(target) = classification.decision.target_state() {
            match self.presence.set_presence(&user.chat_user_id, target).await {
                Ok(()) => {
                    info!(
                        chat_user_id = %user.chat_user_id,
                        decision = %classification.decision,
                        from = %current,
                        to = %target,
                        "presence updated"
                    );
                    outcome.presence_updated = true;
                }
                Err(err) => anomalies.push(record(
                    AnomalyKind::PresenceUpdateFailed,
                    result,
                    Some(user),
                    err.to_string(),
                )),
            }
        }

        outcome.decision = Some(classification.decision);
        outcome.status_line = Some(classification.message);
    }
}

fn record(
    kind: AnomalyKind,
    result: &ScheduleResult,
    user: Option<&UserRecord>,
    detail: String,
) -> SyncAnomaly {
    warn!(
        kind = ?kind,
        schedule_id = %result.schedule_id,
        chat_user_id = user.map(|u| u.chat_user_id.as_str()),
        detail = %detail,
        "sync anomaly"
    );
    SyncAnomaly {
        kind,
        schedule_id: result.schedule_id.clone(),
        chat_user_id: user.map(|u| u.chat_user_id.clone()),
        detail,
    }
}

/// Pretty JSON wrapped in a markdown code fence.
fn json_block(results: &[ScheduleResult]) -> String {
    let body = serde_json::to_string_pretty(results).unwrap_or_else(|err| err.to_string());
    format!("```json\n{body}\n```")
}
