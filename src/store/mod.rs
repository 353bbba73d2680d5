//! Attendance record store contract.
//!
//! The portal persists one document per `(owner_id, date)`. This module
//! defines the async contract the state machine and aggregation engine are
//! written against, plus the subscription hub both bundled implementations
//! share. Merge-writes are last-write-wins; a write either applies in full
//! or fails without touching the record.

pub mod memory;
pub mod sqlite;

use crate::errors::{AppError, AppResult};
use crate::models::record::{AttendanceDayRecord, RecordPatch};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::watch;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Live view of one `(owner_id, date)` record. Holds the latest post-merge
/// snapshot; dropping the receiver releases the subscription.
pub type RecordWatch = watch::Receiver<Option<AttendanceDayRecord>>;

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Point read. `Ok(None)` when the owner has no record for that date.
    async fn get(
        &self,
        owner_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<AttendanceDayRecord>>;

    /// Merge-write one patch, creating the record on first write. Stamps
    /// `updated_at` and publishes the post-merge snapshot to watchers.
    async fn merge(&self, patch: RecordPatch) -> AppResult<AttendanceDayRecord>;

    /// Records for one owner, ascending by date. `None` bounds mean full
    /// history; `Some((start, end))` is inclusive on both ends.
    async fn query(
        &self,
        owner_id: &str,
        bounds: Option<(NaiveDate, NaiveDate)>,
    ) -> AppResult<Vec<AttendanceDayRecord>>;

    /// Subscribe to one record's snapshots.
    async fn watch(&self, owner_id: &str, date: NaiveDate) -> AppResult<RecordWatch>;
}

type WatchKey = (String, NaiveDate);

/// Fan-out of post-merge snapshots to record watchers. Senders with no
/// remaining receivers are pruned on the next publish.
#[derive(Default)]
pub(crate) struct WatchHub {
    senders: Mutex<HashMap<WatchKey, watch::Sender<Option<AttendanceDayRecord>>>>,
}

impl WatchHub {
    pub(crate) fn subscribe(
        &self,
        owner_id: &str,
        date: NaiveDate,
        current: Option<AttendanceDayRecord>,
    ) -> AppResult<RecordWatch> {
        let mut senders = self.lock()?;
        let rx = senders
            .entry((owner_id.to_string(), date))
            .or_insert_with(|| watch::channel(current).0)
            .subscribe();
        Ok(rx)
    }

    pub(crate) fn publish(&self, record: &AttendanceDayRecord) -> AppResult<()> {
        let mut senders = self.lock()?;
        senders.retain(|_, tx| tx.receiver_count() > 0);
        if let Some(tx) = senders.get(&(record.owner_id.clone(), record.date)) {
            tx.send_replace(Some(record.clone()));
        }
        Ok(())
    }

    fn lock(
        &self,
    ) -> AppResult<std::sync::MutexGuard<'_, HashMap<WatchKey, watch::Sender<Option<AttendanceDayRecord>>>>>
    {
        self.senders
            .lock()
            .map_err(|_| AppError::Persistence("watch hub lock poisoned".to_string()))
    }
}
