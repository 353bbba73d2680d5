//! Seams to the portal's external collaborators: identity, wall clock,
//! reverse geocoding, and the leave-request ledger. The state machine and
//! aggregation engine receive these explicitly at construction; there is no
//! ambient global state.

use crate::errors::AppResult;
use crate::models::leave::LeaveRequest;
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate};

/// Identity context handed in by the session provider after login.
#[derive(Debug, Clone)]
pub struct Session {
    pub owner_id: String,
}

impl Session {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
        }
    }
}

/// Wall-clock source. Injected so guards and the monitor can be exercised
/// at fixed instants in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The process-local system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Best-effort reverse geocoding. A failure never blocks a sign-in; the
/// machine degrades to a placeholder string.
#[async_trait]
pub trait LocationResolver: Send + Sync {
    async fn resolve(&self) -> AppResult<String>;
}

/// Resolver for deployments without a geocoding collaborator.
#[derive(Debug, Clone, Default)]
pub struct UnresolvedLocation;

#[async_trait]
impl LocationResolver for UnresolvedLocation {
    async fn resolve(&self) -> AppResult<String> {
        Ok("Not available".to_string())
    }
}

/// Read-only view of the external leave-request ledger. Returns requests
/// whose `start_date` falls inside `[start, end]`, ascending by start date.
#[async_trait]
pub trait LeaveLedger: Send + Sync {
    async fn leaves_in_range(
        &self,
        owner_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<LeaveRequest>>;
}
