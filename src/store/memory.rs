//! In-memory store: the default for tests and embedded use.

use super::{AttendanceStore, RecordWatch, WatchHub};
use crate::errors::AppResult;
use crate::models::record::{AttendanceDayRecord, RecordPatch};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<(String, NaiveDate), AttendanceDayRecord>>,
    hub: WatchHub,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn get(
        &self,
        owner_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<AttendanceDayRecord>> {
        let records = self.records.read().await;
        Ok(records.get(&(owner_id.to_string(), date)).cloned())
    }

    async fn merge(&self, patch: RecordPatch) -> AppResult<AttendanceDayRecord> {
        let key = (patch.owner_id.clone(), patch.date);
        let merged = {
            let mut records = self.records.write().await;
            let base = records
                .get(&key)
                .cloned()
                .unwrap_or_else(|| AttendanceDayRecord::empty(&patch.owner_id, patch.date));
            let mut merged = patch.merged_into(&base);
            merged.updated_at = Some(Utc::now());
            records.insert(key, merged.clone());
            merged
        };
        self.hub.publish(&merged)?;
        Ok(merged)
    }

    async fn query(
        &self,
        owner_id: &str,
        bounds: Option<(NaiveDate, NaiveDate)>,
    ) -> AppResult<Vec<AttendanceDayRecord>> {
        let records = self.records.read().await;
        let mut out: Vec<AttendanceDayRecord> = records
            .values()
            .filter(|r| r.owner_id == owner_id)
            .filter(|r| match bounds {
                Some((start, end)) => r.date >= start && r.date <= end,
                None => true,
            })
            .cloned()
            .collect();
        out.sort_by_key(|r| r.date);
        Ok(out)
    }

    async fn watch(&self, owner_id: &str, date: NaiveDate) -> AppResult<RecordWatch> {
        let current = self.get(owner_id, date).await?;
        self.hub.subscribe(owner_id, date, current)
    }
}
