use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Category used when none is supplied
pub const DEFAULT_CATEGORY: &str = "general";

// ============================================================================
// Timer Models
// ============================================================================

/// Timer is a countdown that notifies channels once it expires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Timer {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: i64,
    pub notified: bool,
    pub cleared_by_user: bool,
    pub is_repeating: bool,
    pub created_at: DateTime<Utc>,
}

impl Timer {
    /// Whole seconds left before expiry, never negative
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.end_time - now).num_seconds().max(0)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.end_time <= now
    }

    /// Fields for the fresh instance spawned when a repeating timer fires
    pub fn next_repeat(&self, now: DateTime<Utc>) -> NewTimer {
        NewTimer::starting_at(
            self.name.clone(),
            self.category.clone(),
            self.duration_seconds,
            true,
            now,
        )
    }
}

/// Fields required to create a timer record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTimer {
    pub name: String,
    pub category: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: i64,
    pub is_repeating: bool,
}

impl NewTimer {
    /// Build a timer that starts at `now` and ends `duration_seconds` later.
    ///
    /// A blank category falls back to [`DEFAULT_CATEGORY`]. An end past the
    /// calendar range saturates at the latest representable instant.
    pub fn starting_at(
        name: impl Into<String>,
        category: impl Into<String>,
        duration_seconds: i64,
        is_repeating: bool,
        now: DateTime<Utc>,
    ) -> Self {
        let category = category.into();
        let category = if category.trim().is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            category.trim().to_string()
        };

        Self {
            name: name.into(),
            category,
            start_time: now,
            end_time: Duration::try_seconds(duration_seconds)
                .and_then(|d| now.checked_add_signed(d))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            duration_seconds,
            is_repeating,
        }
    }
}

/// Mutations a store applies to an existing timer.
///
/// `notified` and `cleared_by_user` are monotone, so they can only be set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimerUpdate {
    pub mark_notified: bool,
    pub mark_cleared: bool,
    pub end_time: Option<DateTime<Utc>>,
}

impl TimerUpdate {
    pub fn notified() -> Self {
        Self {
            mark_notified: true,
            ..Default::default()
        }
    }

    pub fn cleared() -> Self {
        Self {
            mark_cleared: true,
            ..Default::default()
        }
    }

    pub fn end_time(end_time: DateTime<Utc>) -> Self {
        Self {
            end_time: Some(end_time),
            ..Default::default()
        }
    }

    /// Apply this update to an in-memory record
    pub fn apply(&self, timer: &mut Timer) {
        if self.mark_notified {
            timer.notified = true;
        }
        if self.mark_cleared {
            timer.cleared_by_user = true;
        }
        if let Some(end_time) = self.end_time {
            timer.end_time = end_time;
        }
    }
}

/// Query filters supported by timer stores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerFilter {
    /// Not cleared by the user, ordered by end time ascending
    Active,
    /// Not yet notified and expired at `now`, ordered by end time ascending
    Due { now: DateTime<Utc> },
    /// Every record, ordered by end time ascending
    All,
}

impl TimerFilter {
    pub fn matches(&self, timer: &Timer) -> bool {
        match self {
            TimerFilter::Active => !timer.cleared_by_user,
            TimerFilter::Due { now } => !timer.notified && timer.end_time <= *now,
            TimerFilter::All => true,
        }
    }
}

/// Result of a bulk screenshot import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub count: usize,
    pub names: Vec<String>,
}

impl From<Vec<String>> for ImportSummary {
    fn from(names: Vec<String>) -> Self {
        Self {
            count: names.len(),
            names,
        }
    }
}

/// Result of a bulk end-time adjustment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustSummary {
    pub adjusted: Vec<Uuid>,
    /// Timers left untouched because they had already expired
    pub skipped: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_timer(now: DateTime<Utc>) -> Timer {
        let new = NewTimer::starting_at("Barracks", "", 5400, false, now);
        Timer {
            id: Uuid::new_v4(),
            name: new.name,
            category: new.category,
            start_time: new.start_time,
            end_time: new.end_time,
            duration_seconds: new.duration_seconds,
            notified: false,
            cleared_by_user: false,
            is_repeating: new.is_repeating,
            created_at: now,
        }
    }

    #[test]
    fn test_new_timer_end_time_invariant() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let timer = NewTimer::starting_at("Armory", "army", 2700, false, now);
        assert_eq!(timer.end_time - timer.start_time, Duration::seconds(2700));
        assert_eq!(timer.category, "army");
    }

    #[test]
    fn test_end_time_saturates_instead_of_overflowing() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let timer = NewTimer::starting_at("Armory", "", 12_000_000_000_000, false, now);
        assert_eq!(timer.end_time, DateTime::<Utc>::MAX_UTC);
        assert_eq!(timer.start_time, now);
    }

    #[test]
    fn test_blank_category_defaults() {
        let now = Utc::now();
        let timer = NewTimer::starting_at("Armory", "   ", 60, false, now);
        assert_eq!(timer.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn test_remaining_seconds_clamped() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let timer = sample_timer(now);
        assert_eq!(timer.remaining_seconds(now), 5400);
        assert_eq!(timer.remaining_seconds(now + Duration::hours(3)), 0);
    }

    #[test]
    fn test_due_filter() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let mut timer = sample_timer(now);
        assert!(!TimerFilter::Due { now }.matches(&timer));
        assert!(TimerFilter::Due { now: timer.end_time }.matches(&timer));

        timer.notified = true;
        assert!(!TimerFilter::Due { now: timer.end_time }.matches(&timer));
    }

    #[test]
    fn test_update_is_monotone() {
        let now = Utc::now();
        let mut timer = sample_timer(now);
        TimerUpdate::notified().apply(&mut timer);
        TimerUpdate::default().apply(&mut timer);
        assert!(timer.notified);
        assert!(!timer.cleared_by_user);
    }

    #[test]
    fn test_next_repeat_copies_identity_fields() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let timer = sample_timer(now);
        let later = now + Duration::hours(2);
        let next = timer.next_repeat(later);
        assert_eq!(next.name, timer.name);
        assert_eq!(next.category, timer.category);
        assert_eq!(next.duration_seconds, timer.duration_seconds);
        assert_eq!(next.start_time, later);
        assert_eq!(next.end_time, later + Duration::seconds(5400));
        assert!(next.is_repeating);
    }
}
