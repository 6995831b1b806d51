//! In-memory timer store.
//!
//! Thread-safe backend for tests and single-process deployments. Data is not
//! persisted across restarts.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use super::TimerStore;
use crate::errors::StoreError;
use crate::models::{NewTimer, Timer, TimerFilter, TimerUpdate};

/// Timer records held in a `RwLock`ed map
#[derive(Default)]
pub struct InMemoryTimerStore {
    timers: RwLock<HashMap<Uuid, Timer>>,
}

impl InMemoryTimerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TimerStore for InMemoryTimerStore {
    async fn create(&self, timer: NewTimer) -> Result<Timer, StoreError> {
        let record = Timer {
            id: Uuid::new_v4(),
            name: timer.name,
            category: timer.category,
            start_time: timer.start_time,
            end_time: timer.end_time,
            duration_seconds: timer.duration_seconds,
            notified: false,
            cleared_by_user: false,
            is_repeating: timer.is_repeating,
            created_at: Utc::now(),
        };

        let mut timers = self.timers.write().map_err(|_| StoreError::LockPoisoned)?;
        timers.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list(&self, filter: TimerFilter) -> Result<Vec<Timer>, StoreError> {
        let timers = self.timers.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut result: Vec<Timer> = timers
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        result.sort_by(|a, b| {
            a.end_time
                .cmp(&b.end_time)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(result)
    }

    async fn get(&self, id: Uuid) -> Result<Timer, StoreError> {
        let timers = self.timers.read().map_err(|_| StoreError::LockPoisoned)?;
        timers.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: Uuid, update: TimerUpdate) -> Result<Timer, StoreError> {
        let mut timers = self.timers.write().map_err(|_| StoreError::LockPoisoned)?;
        let timer = timers.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        update.apply(timer);
        Ok(timer.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut timers = self.timers.write().map_err(|_| StoreError::LockPoisoned)?;
        timers.remove(&id).ok_or(StoreError::NotFound(id))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_timer(name: &str, seconds: i64) -> NewTimer {
        NewTimer::starting_at(name, "", seconds, false, Utc::now())
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = InMemoryTimerStore::new();
        let timer = store.create(new_timer("Barracks", 60)).await.unwrap();
        assert!(!timer.notified);
        assert!(!timer.cleared_by_user);
        assert_eq!(store.get(timer.id).await.unwrap(), timer);
    }

    #[tokio::test]
    async fn test_list_active_sorted_and_excludes_cleared() {
        let store = InMemoryTimerStore::new();
        let late = store.create(new_timer("late", 600)).await.unwrap();
        let early = store.create(new_timer("early", 60)).await.unwrap();
        let hidden = store.create(new_timer("hidden", 30)).await.unwrap();
        store.update(hidden.id, TimerUpdate::cleared()).await.unwrap();

        let active = store.list(TimerFilter::Active).await.unwrap();
        let ids: Vec<Uuid> = active.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![early.id, late.id]);

        assert_eq!(store.list(TimerFilter::All).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_list_due() {
        let store = InMemoryTimerStore::new();
        let timer = store.create(new_timer("soon", 60)).await.unwrap();

        let before = store
            .list(TimerFilter::Due { now: Utc::now() })
            .await
            .unwrap();
        assert!(before.is_empty());

        let after = store
            .list(TimerFilter::Due {
                now: timer.end_time + Duration::seconds(1),
            })
            .await
            .unwrap();
        assert_eq!(after.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let store = InMemoryTimerStore::new();
        let id = Uuid::new_v4();
        assert!(store.get(id).await.unwrap_err().is_not_found());
        assert!(store
            .update(id, TimerUpdate::notified())
            .await
            .unwrap_err()
            .is_not_found());
        assert!(store.delete(id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let store = InMemoryTimerStore::new();
        let timer = store.create(new_timer("gone", 60)).await.unwrap();
        store.delete(timer.id).await.unwrap();
        assert!(store.list(TimerFilter::All).await.unwrap().is_empty());
    }
}
