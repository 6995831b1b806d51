// Scheduler module for expiry detection and notification

pub mod engine;

pub use engine::{CycleReport, NotificationScheduler};
