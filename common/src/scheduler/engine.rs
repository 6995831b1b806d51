// Scheduler engine implementation

use crate::config::SchedulerConfig;
use crate::errors::StoreError;
use crate::models::{Timer, TimerFilter, TimerUpdate};
use crate::notify::{expiry_message, NotificationChannel};
use crate::store::TimerStore;
use crate::telemetry;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

/// Counts gathered during one scheduler cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Timers returned by the due query
    pub due: usize,
    /// Timers marked notified in this cycle
    pub notified: usize,
    /// Follow-up timers created for repeating timers
    pub repeated: usize,
    /// Timers left pending because delivery or a store write failed
    pub failed: usize,
}

enum TimerOutcome {
    Notified { repeated: bool },
    Undelivered,
    /// Deleted while the cycle was running
    Vanished,
}

/// Periodically notifies channels about expired timers.
///
/// A timer is marked notified only after at least one channel accepted the
/// message, and the mark is committed before the next timer is handled. A
/// crash mid-cycle therefore re-sends at most the timer in flight.
pub struct NotificationScheduler {
    config: SchedulerConfig,
    store: Arc<dyn TimerStore>,
    channels: Vec<Arc<dyn NotificationChannel>>,
    shutdown_tx: watch::Sender<bool>,
}

impl NotificationScheduler {
    pub fn new(
        config: SchedulerConfig,
        store: Arc<dyn TimerStore>,
        channels: Vec<Arc<dyn NotificationChannel>>,
    ) -> Self {
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);

        Self {
            config,
            store,
            channels,
            shutdown_tx,
        }
    }

    /// Run the polling loop until [`stop`](Self::stop) is called.
    ///
    /// Each cycle finishes before the next tick is awaited, so cycles never
    /// overlap. Cycle errors are logged and the loop continues.
    #[instrument(skip(self))]
    pub async fn start(&self) {
        info!(
            poll_interval_seconds = self.config.poll_interval_seconds,
            channels = self.channels.len(),
            "Starting notification scheduler"
        );

        let mut poll_interval = interval(Duration::from_secs(self.config.poll_interval_seconds));
        poll_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            tokio::select! {
                _ = poll_interval.tick() => {
                    match self.process_due_timers().await {
                        Ok(report) if report.due > 0 => {
                            info!(
                                due = report.due,
                                notified = report.notified,
                                repeated = report.repeated,
                                failed = report.failed,
                                "Processed due timers"
                            );
                        }
                        Ok(_) => debug!("No timers due"),
                        Err(e) => error!(error = %e, "Error polling due timers"),
                    }
                }
                _ = shutdown_rx.changed() => {
                    info!("Shutdown signal received, stopping scheduler");
                    break;
                }
            }
        }

        info!("Notification scheduler stopped");
    }

    /// Signal the polling loop to exit after the cycle in progress
    pub fn stop(&self) {
        info!("Stopping notification scheduler");
        self.shutdown_tx.send_replace(true);
    }

    pub async fn process_due_timers(&self) -> Result<CycleReport, StoreError> {
        self.process_due_timers_at(Utc::now()).await
    }

    /// Run a single cycle as of `now`.
    ///
    /// Only a failure of the due query is returned; per-timer failures are
    /// logged and counted in the report.
    #[instrument(skip(self))]
    pub async fn process_due_timers_at(&self, now: DateTime<Utc>) -> Result<CycleReport, StoreError> {
        let started = Instant::now();

        let due = self.store.list(TimerFilter::Due { now }).await?;
        telemetry::update_due_timers(due.len());

        let mut report = CycleReport {
            due: due.len(),
            ..Default::default()
        };

        for timer in &due {
            match self.process_timer(timer, now).await {
                Ok(TimerOutcome::Notified { repeated }) => {
                    report.notified += 1;
                    if repeated {
                        report.repeated += 1;
                    }
                }
                Ok(TimerOutcome::Undelivered) => report.failed += 1,
                Ok(TimerOutcome::Vanished) => {}
                Err(e) => {
                    error!(
                        timer_id = %timer.id,
                        timer_name = %timer.name,
                        error = %e,
                        "Failed to commit notification"
                    );
                    report.failed += 1;
                }
            }
        }

        telemetry::record_cycle_duration(started.elapsed().as_secs_f64());
        Ok(report)
    }

    #[instrument(skip(self, timer), fields(timer_id = %timer.id, timer_name = %timer.name))]
    async fn process_timer(&self, timer: &Timer, now: DateTime<Utc>) -> Result<TimerOutcome, StoreError> {
        let message = expiry_message(&timer.name);

        if !self.broadcast(&message).await {
            warn!("No channel accepted the notification, will retry next cycle");
            return Ok(TimerOutcome::Undelivered);
        }

        match self.store.update(timer.id, TimerUpdate::notified()).await {
            Ok(_) => {}
            Err(StoreError::NotFound(_)) => {
                debug!("Timer deleted during cycle, skipping commit");
                return Ok(TimerOutcome::Vanished);
            }
            Err(e) => return Err(e),
        }

        if !timer.is_repeating {
            return Ok(TimerOutcome::Notified { repeated: false });
        }

        match self.store.create(timer.next_repeat(now)).await {
            Ok(next) => {
                telemetry::record_timer_repeated();
                info!(next_timer_id = %next.id, end_time = %next.end_time, "Repeating timer rescheduled");
                Ok(TimerOutcome::Notified { repeated: true })
            }
            Err(e) => {
                error!(error = %e, "Failed to create follow-up for repeating timer");
                Ok(TimerOutcome::Notified { repeated: false })
            }
        }
    }

    /// Send to every channel concurrently; true when any succeeded
    async fn broadcast(&self, message: &str) -> bool {
        let results = join_all(
            self.channels
                .iter()
                .map(|channel| async move { (channel.name(), channel.send(message).await) }),
        )
        .await;

        let mut delivered = false;
        for (name, ok) in results {
            if ok {
                telemetry::record_notification_sent(name);
                delivered = true;
            } else {
                telemetry::record_notification_failed(name);
            }
        }
        delivered
    }
}
