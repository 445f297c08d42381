//! Periodic presence synchronization
//!
//! Fires [`AvailabilityService::sync_status_all`] every polling interval.
//! Runs are stateless, so an overlapping tick is harmless; each run is bounded
//! by the configured timeout.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use presencesync_core::AvailabilityService;
//! use presencesync_infra::scheduling::{SchedulerResult, StatusScheduler, StatusSchedulerConfig};
//!
//! # async fn example(service: Arc<AvailabilityService>) -> SchedulerResult<()> {
//! let config = StatusSchedulerConfig::from_sync_config(service.config())?;
//! let mut scheduler = StatusScheduler::new(config, service);
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use presencesync_core::AvailabilityService;
use presencesync_domain::{is_even_polling_interval, PresenceSyncError, SyncConfig, SyncReport};
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Cron expression (with seconds) firing every `minutes` minutes.
///
/// Only intervals that divide the hour are accepted; `*/7` would fire at :56
/// and again at :00.
pub fn cron_for_interval(minutes: u32) -> SchedulerResult<String> {
    if !is_even_polling_interval(minutes) {
        return Err(SchedulerError::InvalidInterval(minutes));
    }
    Ok(format!("0 */{minutes} * * * *"))
}

/// Configuration for the status scheduler.
#[derive(Debug, Clone)]
pub struct StatusSchedulerConfig {
    /// Cron expression describing the execution schedule.
    pub cron_expression: String,
    /// Timeout applied to a single sync run.
    pub job_timeout: Duration,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
}

impl Default for StatusSchedulerConfig {
    fn default() -> Self {
        Self {
            cron_expression: "0 */5 * * * *".into(),
            job_timeout: Duration::from_secs(120),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
        }
    }
}

impl StatusSchedulerConfig {
    /// Derive the cron schedule and run timeout from the sync settings.
    pub fn from_sync_config(sync: &SyncConfig) -> SchedulerResult<Self> {
        Ok(Self {
            cron_expression: cron_for_interval(sync.polling_interval_minutes)?,
            job_timeout: Duration::from_secs(sync.run_timeout_seconds.max(1)),
            ..Self::default()
        })
    }
}

/// Presence sync scheduler with explicit lifecycle management.
pub struct StatusScheduler {
    scheduler: Option<JobScheduler>,
    config: StatusSchedulerConfig,
    cancellation: CancellationToken,
    service: Arc<AvailabilityService>,
}

impl StatusScheduler {
    pub fn new(config: StatusSchedulerConfig, service: Arc<AvailabilityService>) -> Self {
        Self {
            scheduler: None,
            config,
            cancellation: CancellationToken::new(),
            service,
        }
    }

    /// Run one sync of every connected user right now, bounded by the job
    /// timeout.
    pub async fn run_once(&self) -> Result<SyncReport, PresenceSyncError> {
        Self::run_sync(&self.service, self.config.job_timeout).await
    }

    /// Start the cron job.
    #[instrument(skip(self), fields(cron = %self.config.cron_expression))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler_instance = self.build_scheduler().await?;
        let start_timeout = self.config.start_timeout;

        tokio::time::timeout(start_timeout, scheduler_instance.start())
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: start_timeout.as_secs() })?
            .map_err(|err| SchedulerError::StartFailed(err.to_string()))?;

        self.scheduler = Some(scheduler_instance);

        info!("status scheduler started");
        Ok(())
    }

    /// Stop the cron job; ticks already in flight see the cancellation.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        let Some(mut scheduler) = self.scheduler.take() else {
            return Err(SchedulerError::NotRunning);
        };

        self.cancellation.cancel();

        let stop_timeout = self.config.stop_timeout;
        tokio::time::timeout(stop_timeout, async move { scheduler.shutdown().await })
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: stop_timeout.as_secs() })?
            .map_err(|err| SchedulerError::StopFailed(err.to_string()))?;

        info!("status scheduler stopped");
        self.cancellation = CancellationToken::new();
        Ok(())
    }

    /// Returns true when a scheduler instance is active.
    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    async fn build_scheduler(&self) -> SchedulerResult<JobScheduler> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|err| SchedulerError::CreationFailed(err.to_string()))?;
        let service = Arc::clone(&self.service);
        let job_timeout = self.config.job_timeout;
        let cancel = self.cancellation.clone();

        let job = Job::new_async(self.config.cron_expression.as_str(), move |_id, _lock| {
            let service = Arc::clone(&service);
            let cancel = cancel.clone();

            Box::pin(async move {
                if cancel.is_cancelled() {
                    debug!("scheduler cancelled, skipping tick");
                    return;
                }
                // errors are already logged inside run_sync
                let _ = Self::run_sync(&service, job_timeout).await;
            })
        })
        .map_err(|err| SchedulerError::JobRegistrationFailed(err.to_string()))?;

        let job_id = scheduler
            .add(job)
            .await
            .map_err(|err| SchedulerError::JobRegistrationFailed(err.to_string()))?;

        debug!(cron = %self.config.cron_expression, %job_id, "registered status sync job");
        Ok(scheduler)
    }

    async fn run_sync(
        service: &AvailabilityService,
        job_timeout: Duration,
    ) -> Result<SyncReport, PresenceSyncError> {
        let started = Instant::now();

        match tokio::time::timeout(job_timeout, service.sync_status_all()).await {
            Ok(Ok(report)) if report.summary.is_informational() => {
                debug!(summary = %report.summary, "status sync had nothing to do");
                Ok(report)
            }
            Ok(Ok(report)) => {
                info!(
                    duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                    summary = %summary_line(&report),
                    outcomes = report.outcomes.len(),
                    anomalies = report.anomalies.len(),
                    "status sync finished"
                );
                Ok(report)
            }
            Ok(Err(err)) => {
                error!(error = %err, kind = err.label(), "status sync failed");
                Err(err)
            }
            Err(_) => {
                warn!(timeout_secs = job_timeout.as_secs(), "status sync timed out");
                Err(PresenceSyncError::RemoteUnavailable(format!(
                    "sync run exceeded {}s",
                    job_timeout.as_secs()
                )))
            }
        }
    }

}

/// First line of the summary; raw schedule dumps are multi-line.
fn summary_line(report: &SyncReport) -> String {
    report.summary.to_string().lines().next().unwrap_or_default().to_owned()
}

impl Drop for StatusScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("StatusScheduler dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}
