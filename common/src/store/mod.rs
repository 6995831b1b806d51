//! Timer persistence behind a narrow trait.
//!
//! Business logic only talks to [`TimerStore`]; the backend (PostgreSQL or
//! in-memory) is chosen at startup.

mod memory;
mod postgres;

pub use memory::InMemoryTimerStore;
pub use postgres::PgTimerStore;

use crate::errors::StoreError;
use crate::models::{NewTimer, Timer, TimerFilter, TimerUpdate};
use async_trait::async_trait;
use uuid::Uuid;

/// Create/query/update/delete access to timer records.
///
/// Implementations must serialise conflicting writes to the same record:
/// an update or delete against a missing id returns [`StoreError::NotFound`]
/// rather than corrupting state.
#[async_trait]
pub trait TimerStore: Send + Sync {
    /// Insert a new record; the store assigns the id
    async fn create(&self, timer: NewTimer) -> Result<Timer, StoreError>;

    /// Records matching `filter`, ordered by end time ascending
    async fn list(&self, filter: TimerFilter) -> Result<Vec<Timer>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Timer, StoreError>;

    async fn update(&self, id: Uuid, update: TimerUpdate) -> Result<Timer, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Cheap round-trip used by health checks
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
