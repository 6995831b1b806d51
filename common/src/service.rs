// Timer service: the user-facing entry points over store, OCR and extractor

use crate::duration::parse_duration;
use crate::errors::{ServiceError, StoreError, ValidationError};
use crate::models::{AdjustSummary, ImportSummary, NewTimer, Timer, TimerFilter, TimerUpdate};
use crate::ocr::{OcrProvider, TimerExtractor};
use crate::store::TimerStore;
use crate::telemetry;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Request to create a timer by hand
#[derive(Debug, Clone, Default)]
pub struct CreateTimer {
    pub name: String,
    /// Duration text, e.g. `90` (minutes) or `1d 2h 30m`
    pub duration: String,
    pub category: Option<String>,
    pub is_repeating: bool,
}

#[derive(Clone)]
pub struct TimerService {
    store: Arc<dyn TimerStore>,
    ocr: Arc<dyn OcrProvider>,
    extractor: TimerExtractor,
}

impl TimerService {
    pub fn new(store: Arc<dyn TimerStore>, ocr: Arc<dyn OcrProvider>, extractor: TimerExtractor) -> Self {
        Self {
            store,
            ocr,
            extractor,
        }
    }

    pub fn store(&self) -> &Arc<dyn TimerStore> {
        &self.store
    }

    /// Create a timer from a name and a duration string
    #[instrument(skip(self, request), fields(timer_name = %request.name))]
    pub async fn create_timer(&self, request: CreateTimer, now: DateTime<Utc>) -> Result<Timer, ServiceError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        let seconds = parse_duration(&request.duration)?;

        let timer = self
            .store
            .create(NewTimer::starting_at(
                name,
                request.category.unwrap_or_default(),
                seconds,
                request.is_repeating,
                now,
            ))
            .await?;

        telemetry::record_timers_created("manual", 1);
        info!(timer_id = %timer.id, duration_seconds = seconds, "Timer created");
        Ok(timer)
    }

    /// Timers not cleared by the user, soonest first
    pub async fn list_active(&self) -> Result<Vec<Timer>, ServiceError> {
        Ok(self.store.list(TimerFilter::Active).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Timer, ServiceError> {
        Ok(self.store.get(id).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        Ok(self.store.delete(id).await?)
    }

    /// Hide a timer from the active list without deleting it
    #[instrument(skip(self))]
    pub async fn clear(&self, id: Uuid) -> Result<Timer, ServiceError> {
        Ok(self.store.update(id, TimerUpdate::cleared()).await?)
    }

    /// Clear every active timer that has already expired; returns their ids
    #[instrument(skip(self))]
    pub async fn clear_finished(&self, now: DateTime<Utc>) -> Result<Vec<Uuid>, ServiceError> {
        let mut cleared = Vec::new();
        for timer in self.store.list(TimerFilter::Active).await? {
            if !timer.is_expired(now) {
                continue;
            }
            match self.store.update(timer.id, TimerUpdate::cleared()).await {
                Ok(_) => cleared.push(timer.id),
                // Deleted concurrently: nothing left to clear
                Err(StoreError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        info!(cleared = cleared.len(), "Cleared finished timers");
        Ok(cleared)
    }

    /// Shift the end time of every still-running timer in `ids` by `minutes`.
    ///
    /// All ids are resolved before anything is written, so an unknown id
    /// leaves every timer untouched. Expired timers are reported as skipped.
    #[instrument(skip(self, ids), fields(id_count = ids.len()))]
    pub async fn adjust(&self, ids: &[Uuid], minutes: i64, now: DateTime<Utc>) -> Result<AdjustSummary, ServiceError> {
        if ids.is_empty() {
            return Err(ValidationError::MissingField("ids".to_string()).into());
        }
        let delta = Duration::try_minutes(minutes).ok_or_else(|| ValidationError::InvalidFieldValue {
            field: "minutes".to_string(),
            reason: "out of range".to_string(),
        })?;

        let mut timers = Vec::with_capacity(ids.len());
        for id in ids {
            timers.push(self.store.get(*id).await?);
        }

        let mut summary = AdjustSummary::default();
        for timer in timers {
            if timer.is_expired(now) {
                summary.skipped.push(timer.id);
                continue;
            }
            let end_time = timer
                .end_time
                .checked_add_signed(delta)
                .ok_or_else(|| ValidationError::InvalidFieldValue {
                    field: "minutes".to_string(),
                    reason: "end time out of range".to_string(),
                })?;
            self.store.update(timer.id, TimerUpdate::end_time(end_time)).await?;
            summary.adjusted.push(timer.id);
        }

        info!(
            adjusted = summary.adjusted.len(),
            skipped = summary.skipped.len(),
            minutes,
            "Adjusted timers"
        );
        Ok(summary)
    }

    /// Recognize a screenshot and create a timer for every extracted line.
    ///
    /// Recognition completes before any write, so a provider failure leaves
    /// the store unchanged.
    #[instrument(skip(self, image), fields(image_bytes = image.len()))]
    pub async fn import_screenshot(&self, image: &[u8], now: DateTime<Utc>) -> Result<ImportSummary, ServiceError> {
        if image.is_empty() {
            return Err(ValidationError::MissingField("image".to_string()).into());
        }
        let tokens = self.ocr.recognize(image).await?;
        let names = self.extractor.extract(&tokens, self.store.as_ref(), now).await?;
        Ok(ImportSummary::from(names))
    }
}
