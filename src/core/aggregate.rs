//! Read-side projections over one owner's attendance history.
//!
//! Nothing here mutates a record: every projection is recomputed from the
//! store on each call. Records with missing or malformed fields contribute
//! zeros instead of aborting a projection.

use crate::config::Policy;
use crate::errors::{AppError, AppResult};
use crate::models::leave::LeaveType;
use crate::models::record::AttendanceDayRecord;
use crate::models::work_mode::WorkMode;
use crate::providers::{Clock, LeaveLedger, Session};
use crate::store::AttendanceStore;
use crate::utils::date::{all_days_of_month, first_of_month, last_of_month, working_days_between};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// One calendar day of the monthly chart series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailySlot {
    pub day: u32,
    pub worked_hours: f64,
    pub break_hours: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Date window of a history projection; the relative variants resolve
/// against the engine's clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryRange {
    #[default]
    All,
    ThisMonth,
    LastMonth,
    Custom(NaiveDate, NaiveDate),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryFilter {
    pub range: HistoryRange,
    pub work_mode: Option<WorkMode>,
}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Positional serial number after filtering and sorting, 1-based.
    pub serial: usize,
    pub record: AttendanceDayRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub total_working_days: i64,
    pub days_attended: i64,
    /// `total_working_days - days_attended`; negative when attendance
    /// includes weekend dates. Documented edge case, not an error.
    pub leaves_taken: i64,
}

#[derive(Debug, Clone)]
pub struct HistoryReport {
    pub entries: Vec<HistoryEntry>,
    pub summary: HistorySummary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LeaveHoursByType {
    pub medical: f64,
    pub casual: f64,
    pub extra: f64,
}

impl LeaveHoursByType {
    pub fn total(&self) -> f64 {
        self.medical + self.casual + self.extra
    }
}

/// Partition of one month's working-hour budget into time worked and time
/// on leave, per leave type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBreakdown {
    pub working_hours: f64,
    pub leave_hours: LeaveHoursByType,
}

pub struct AggregationEngine {
    session: Session,
    store: Arc<dyn AttendanceStore>,
    ledger: Arc<dyn LeaveLedger>,
    clock: Arc<dyn Clock>,
    policy: Policy,
}

impl AggregationEngine {
    pub fn new(
        session: Session,
        store: Arc<dyn AttendanceStore>,
        ledger: Arc<dyn LeaveLedger>,
        clock: Arc<dyn Clock>,
        policy: Policy,
    ) -> Self {
        Self {
            session,
            store,
            ledger,
            clock,
            policy,
        }
    }

    /// One entry per calendar day of the month, ascending by day number.
    /// Days without a record yield zeros; the sequence length always equals
    /// the number of days in the month.
    pub async fn daily_series(&self, year: i32, month: u32) -> AppResult<Vec<DailySlot>> {
        let days = all_days_of_month(year, month);
        let Some((&first, &last)) = days.first().zip(days.last()) else {
            return Err(AppError::InvalidDate(format!("{year}-{month:02}")));
        };

        let records = self
            .store
            .query(&self.session.owner_id, Some((first, last)))
            .await?;

        let mut by_date: HashMap<NaiveDate, (f64, f64)> = HashMap::new();
        for rec in &records {
            let slot = by_date.entry(rec.date).or_default();
            slot.0 += rec.total_hours_worked.max(0.0);
            slot.1 += rec.break_hours();
        }

        Ok(days
            .iter()
            .map(|d| {
                let (worked, on_break) = by_date.get(d).copied().unwrap_or_default();
                DailySlot {
                    day: d.day(),
                    worked_hours: worked,
                    break_hours: on_break,
                }
            })
            .collect())
    }

    /// Count of Monday-Friday dates in `[start, end]`; weekends never count
    /// regardless of attendance.
    pub fn working_days_count(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        working_days_between(start, end)
    }

    /// Filtered, sorted history with positional serial numbers and the
    /// trailing summary block.
    pub async fn history_export(
        &self,
        filter: &HistoryFilter,
        sort: SortOrder,
    ) -> AppResult<HistoryReport> {
        let bounds = self.resolve_bounds(filter.range)?;
        let mut records = self.store.query(&self.session.owner_id, bounds).await?;

        if let Some(mode) = filter.work_mode {
            records.retain(|r| r.work_mode == Some(mode));
        }
        match sort {
            SortOrder::Ascending => records.sort_by_key(|r| r.date),
            SortOrder::Descending => {
                records.sort_by_key(|r| std::cmp::Reverse(r.date));
            }
        }

        // The summary spans min..max of the matched dates, independent of
        // the presentation sort order.
        let dates: BTreeSet<NaiveDate> = records.iter().map(|r| r.date).collect();
        let summary = match (dates.first(), dates.last()) {
            (Some(&min), Some(&max)) => {
                let total_working_days = working_days_between(min, max) as i64;
                let days_attended = dates.len() as i64;
                HistorySummary {
                    total_working_days,
                    days_attended,
                    leaves_taken: total_working_days - days_attended,
                }
            }
            _ => HistorySummary {
                total_working_days: 0,
                days_attended: 0,
                leaves_taken: 0,
            },
        };

        let entries = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| HistoryEntry {
                serial: i + 1,
                record,
            })
            .collect();

        Ok(HistoryReport { entries, summary })
    }

    /// Joins the leave ledger: the month's working-hour budget minus summed
    /// leave hours per type, floored at zero. Unrecognized leave types
    /// bucket into the extra category.
    pub async fn leave_breakdown(&self, year: i32, month: u32) -> AppResult<LeaveBreakdown> {
        let (Some(first), Some(last)) = (first_of_month(year, month), last_of_month(year, month))
        else {
            return Err(AppError::InvalidDate(format!("{year}-{month:02}")));
        };

        let leaves = self
            .ledger
            .leaves_in_range(&self.session.owner_id, first, last)
            .await?;

        let mut hours = LeaveHoursByType::default();
        for leave in &leaves {
            let taken = leave.hours_taken.max(0.0);
            match leave.leave_type() {
                LeaveType::Medical => hours.medical += taken,
                LeaveType::Casual => hours.casual += taken,
                LeaveType::Extra => hours.extra += taken,
            }
        }

        let budget = working_days_between(first, last) as f64 * self.policy.workday_hours;
        Ok(LeaveBreakdown {
            working_hours: (budget - hours.total()).max(0.0),
            leave_hours: hours,
        })
    }

    fn resolve_bounds(
        &self,
        range: HistoryRange,
    ) -> AppResult<Option<(NaiveDate, NaiveDate)>> {
        let today = self.clock.now().date_naive();
        let month_bounds = |year: i32, month: u32| {
            first_of_month(year, month)
                .zip(last_of_month(year, month))
                .ok_or_else(|| AppError::InvalidDate(format!("{year}-{month:02}")))
        };

        match range {
            HistoryRange::All => Ok(None),
            HistoryRange::ThisMonth => month_bounds(today.year(), today.month()).map(Some),
            HistoryRange::LastMonth => {
                let (year, month) = if today.month() == 1 {
                    (today.year() - 1, 12)
                } else {
                    (today.year(), today.month() - 1)
                };
                month_bounds(year, month).map(Some)
            }
            HistoryRange::Custom(start, end) => Ok(Some((start, end))),
        }
    }
}
