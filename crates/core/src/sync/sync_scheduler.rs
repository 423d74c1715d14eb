//! Periodic and manual triggering of synchronization passes.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::{SyncReport, SyncServiceTrait, SyncTrigger};
use crate::errors::{Result, SyncError};

/// Default pass cadence: once a day.
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 60 * 60 * 24;

/// Longest accepted pass cadence: one year.
pub const MAX_SYNC_INTERVAL_SECS: u64 = 60 * 60 * 24 * 365;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub interval: Duration,
    /// Fire the first pass immediately instead of one interval after start.
    pub run_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
            run_on_start: false,
        }
    }
}

/// Result of a manual trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A pass was started in the background.
    Accepted,
    /// A pass is in progress; nothing was started.
    AlreadyRunning,
}

/// Runs passes on a fixed interval and on demand, never two at a time.
pub struct SyncScheduler {
    sync_service: Arc<dyn SyncServiceTrait>,
    config: SchedulerConfig,
    pass_guard: Arc<Mutex<()>>,
    background_task: Mutex<Option<JoinHandle<()>>>,
}

impl SyncScheduler {
    pub fn new(sync_service: Arc<dyn SyncServiceTrait>) -> Self {
        Self {
            sync_service,
            config: SchedulerConfig::default(),
            pass_guard: Arc::new(Mutex::new(())),
            background_task: Mutex::new(None),
        }
    }

    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Starts the interval task. Calling it again while the task is alive
    /// does nothing.
    pub async fn start(&self) {
        let mut guard = self.background_task.lock().await;
        if let Some(handle) = guard.as_ref() {
            if !handle.is_finished() {
                return;
            }
            guard.take();
        }

        let period = self.config.interval.clamp(
            Duration::from_secs(1),
            Duration::from_secs(MAX_SYNC_INTERVAL_SECS),
        );
        let first_tick = if self.config.run_on_start {
            Instant::now()
        } else {
            Instant::now() + period
        };
        let run_on_start = self.config.run_on_start;
        let sync_service = Arc::clone(&self.sync_service);
        let pass_guard = Arc::clone(&self.pass_guard);

        info!(
            "[Scheduler] Started, interval {}s, run on start: {}",
            period.as_secs(),
            self.config.run_on_start
        );

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut first = true;
            loop {
                ticker.tick().await;
                let trigger = if first && run_on_start {
                    SyncTrigger::Startup
                } else {
                    SyncTrigger::Periodic
                };
                first = false;

                let Ok(_pass) = pass_guard.try_lock() else {
                    info!("[Scheduler] Pass already running, skipping scheduled tick");
                    continue;
                };
                run_pass(sync_service.as_ref(), trigger).await;
            }
        });
        *guard = Some(handle);
    }

    /// Aborts the interval task. Manually triggered passes are not affected.
    pub async fn stop(&self) {
        let mut guard = self.background_task.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
            info!("[Scheduler] Stopped");
        }
    }

    /// True while a pass holds the guard.
    pub fn is_running(&self) -> bool {
        self.pass_guard.try_lock().is_err()
    }

    /// Starts a pass in the background unless one is already running.
    pub fn trigger(&self) -> TriggerOutcome {
        let Ok(pass) = Arc::clone(&self.pass_guard).try_lock_owned() else {
            info!("[Scheduler] Manual trigger ignored, pass already running");
            return TriggerOutcome::AlreadyRunning;
        };

        let sync_service = Arc::clone(&self.sync_service);
        tokio::spawn(async move {
            let _pass = pass;
            run_pass(sync_service.as_ref(), SyncTrigger::Manual).await;
        });
        TriggerOutcome::Accepted
    }

    /// Runs a pass on the caller's task under the same guard as `trigger`.
    pub async fn run_exclusive(&self) -> Result<SyncReport> {
        let Ok(_pass) = self.pass_guard.try_lock() else {
            return Err(SyncError::AlreadyRunning.into());
        };
        debug!("[Scheduler] Running pass inline");
        self.sync_service.perform_sync().await
    }
}

async fn run_pass(sync_service: &dyn SyncServiceTrait, trigger: SyncTrigger) {
    debug!("[Scheduler] Running {:?} pass", trigger);
    match sync_service.perform_sync().await {
        Ok(report) => info!("[Scheduler] {:?} pass finished: {}", trigger, report.summary()),
        Err(err) => warn!("[Scheduler] {:?} pass failed: {}", trigger, err),
    }
}
