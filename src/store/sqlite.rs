//! SQLite adapter of the store contract, for deployments without a hosted
//! document store. One `attendance` table keyed `(owner_id, date)`;
//! rusqlite work runs on the blocking pool.

use super::{AttendanceStore, RecordWatch, WatchHub};
use crate::errors::{AppError, AppResult};
use crate::models::record::{AttendanceDayRecord, RecordPatch};
use crate::models::work_mode::WorkMode;
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::{Arc, Mutex};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS attendance (
    owner_id            TEXT NOT NULL,
    date                TEXT NOT NULL,
    sign_in_at          TEXT,
    sign_out_at         TEXT,
    break_in_at         TEXT,
    break_out_at        TEXT,
    cumulative_break_ms INTEGER NOT NULL DEFAULT 0,
    total_hours_worked  REAL NOT NULL DEFAULT 0,
    work_mode           TEXT,
    location            TEXT NOT NULL DEFAULT '',
    updated_at          TEXT,
    PRIMARY KEY (owner_id, date)
)";

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    hub: WatchHub,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> AppResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> AppResult<Self> {
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            hub: WatchHub::default(),
        })
    }

    async fn run_blocking<T, F>(&self, func: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> AppResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| AppError::Persistence("store connection lock poisoned".to_string()))?;
            func(&conn)
        })
        .await
        .map_err(|e| AppError::Persistence(format!("store task failed: {e}")))?
    }
}

#[async_trait]
impl AttendanceStore for SqliteStore {
    async fn get(
        &self,
        owner_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<AttendanceDayRecord>> {
        let owner = owner_id.to_string();
        self.run_blocking(move |conn| select_one(conn, &owner, date))
            .await
    }

    async fn merge(&self, patch: RecordPatch) -> AppResult<AttendanceDayRecord> {
        let merged = self
            .run_blocking(move |conn| {
                let base = select_one(conn, &patch.owner_id, patch.date)?
                    .unwrap_or_else(|| AttendanceDayRecord::empty(&patch.owner_id, patch.date));
                let mut merged = patch.merged_into(&base);
                merged.updated_at = Some(Utc::now());
                upsert(conn, &merged)?;
                Ok(merged)
            })
            .await?;
        self.hub.publish(&merged)?;
        Ok(merged)
    }

    async fn query(
        &self,
        owner_id: &str,
        bounds: Option<(NaiveDate, NaiveDate)>,
    ) -> AppResult<Vec<AttendanceDayRecord>> {
        let owner = owner_id.to_string();
        self.run_blocking(move |conn| {
            let mut out = Vec::new();
            match bounds {
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT * FROM attendance
                         WHERE owner_id = ?1
                         ORDER BY date ASC",
                    )?;
                    let rows = stmt.query_map(params![owner], map_row)?;
                    for r in rows {
                        out.push(r?);
                    }
                }
                Some((start, end)) => {
                    let mut stmt = conn.prepare(
                        "SELECT * FROM attendance
                         WHERE owner_id = ?1 AND date BETWEEN ?2 AND ?3
                         ORDER BY date ASC",
                    )?;
                    let rows = stmt.query_map(
                        params![owner, date_str(start), date_str(end)],
                        map_row,
                    )?;
                    for r in rows {
                        out.push(r?);
                    }
                }
            }
            Ok(out)
        })
        .await
    }

    async fn watch(&self, owner_id: &str, date: NaiveDate) -> AppResult<RecordWatch> {
        let current = self.get(owner_id, date).await?;
        self.hub.subscribe(owner_id, date, current)
    }
}

fn select_one(
    conn: &Connection,
    owner_id: &str,
    date: NaiveDate,
) -> AppResult<Option<AttendanceDayRecord>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM attendance
         WHERE owner_id = ?1 AND date = ?2",
    )?;
    let record = stmt
        .query_row(params![owner_id, date_str(date)], map_row)
        .optional()?;
    Ok(record)
}

fn upsert(conn: &Connection, rec: &AttendanceDayRecord) -> AppResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO attendance
         (owner_id, date, sign_in_at, sign_out_at, break_in_at, break_out_at,
          cumulative_break_ms, total_hours_worked, work_mode, location, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            rec.owner_id,
            date_str(rec.date),
            rec.sign_in_at.map(|t| t.to_rfc3339()),
            rec.sign_out_at.map(|t| t.to_rfc3339()),
            rec.break_in_at.map(|t| t.to_rfc3339()),
            rec.break_out_at.map(|t| t.to_rfc3339()),
            rec.cumulative_break_duration_ms,
            rec.total_hours_worked,
            rec.work_mode.map(|m| m.to_db_str()),
            rec.location,
            rec.updated_at.map(|t| t.to_rfc3339()),
        ],
    )?;
    Ok(())
}

fn map_row(row: &Row) -> rusqlite::Result<AttendanceDayRecord> {
    let date_text: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d").map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidDate(date_text.clone())),
        )
    })?;

    // Malformed optional fields degrade to absent/zero rather than failing
    // the whole read; projections treat such records as zero-valued.
    Ok(AttendanceDayRecord {
        owner_id: row.get("owner_id")?,
        date,
        sign_in_at: local_ts(row, "sign_in_at")?,
        sign_out_at: local_ts(row, "sign_out_at")?,
        break_in_at: local_ts(row, "break_in_at")?,
        break_out_at: local_ts(row, "break_out_at")?,
        cumulative_break_duration_ms: row
            .get::<_, Option<i64>>("cumulative_break_ms")?
            .unwrap_or(0)
            .max(0),
        total_hours_worked: row
            .get::<_, Option<f64>>("total_hours_worked")?
            .unwrap_or(0.0)
            .max(0.0),
        work_mode: row
            .get::<_, Option<String>>("work_mode")?
            .as_deref()
            .and_then(WorkMode::from_db_str),
        location: row.get::<_, Option<String>>("location")?.unwrap_or_default(),
        updated_at: row
            .get::<_, Option<String>>("updated_at")?
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc)),
    })
}

fn local_ts(row: &Row, column: &str) -> rusqlite::Result<Option<DateTime<Local>>> {
    Ok(row
        .get::<_, Option<String>>(column)?
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Local)))
}

fn date_str(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}
