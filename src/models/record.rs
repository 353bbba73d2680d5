use super::work_mode::WorkMode;
use crate::utils::time::{MS_PER_HOUR, ms_to_hours};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One attendance document per `(owner_id, date)`. Created by the first
/// sign-in of the day, merged into by every later transition, never deleted.
///
/// Timestamp fields are genuinely absent-or-present: all state logic
/// pattern-matches the `Option` instead of testing sentinel values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDayRecord {
    pub owner_id: String,
    pub date: NaiveDate, // local calendar day, "YYYY-MM-DD" on the wire
    #[serde(default)]
    pub sign_in_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub sign_out_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub break_in_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub break_out_at: Option<DateTime<Local>>,
    /// Sum of completed break durations, non-decreasing within the day.
    #[serde(default)]
    pub cumulative_break_duration_ms: i64,
    /// Derived once, at the transition that sets `sign_out_at`.
    #[serde(default)]
    pub total_hours_worked: f64,
    #[serde(default)]
    pub work_mode: Option<WorkMode>,
    #[serde(default)]
    pub location: String,
    /// Store-assigned on every merge; last-write-wins ordering only.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AttendanceDayRecord {
    /// Empty per-day document, the base a first merge-write lands on.
    pub fn empty(owner_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            owner_id: owner_id.into(),
            date,
            sign_in_at: None,
            sign_out_at: None,
            break_in_at: None,
            break_out_at: None,
            cumulative_break_duration_ms: 0,
            total_hours_worked: 0.0,
            work_mode: None,
            location: String::new(),
            updated_at: None,
        }
    }

    /// Signed in and not yet signed out.
    pub fn is_open(&self) -> bool {
        self.sign_in_at.is_some() && self.sign_out_at.is_none()
    }

    pub fn is_on_break(&self) -> bool {
        self.break_in_at.is_some() && self.break_out_at.is_none()
    }

    /// Signed out; no further break or sign-out transitions apply.
    pub fn is_closed(&self) -> bool {
        self.sign_out_at.is_some()
    }

    pub fn break_hours(&self) -> f64 {
        ms_to_hours(self.cumulative_break_duration_ms)
    }

    /// Worked hours for a closure at `sign_out`, floored at zero:
    /// `(sign_out - sign_in - cumulative_break) / 3_600_000`.
    pub fn worked_hours_at(&self, sign_out: DateTime<Local>) -> f64 {
        let Some(sign_in) = self.sign_in_at else {
            return 0.0;
        };
        let worked_ms =
            (sign_out - sign_in).num_milliseconds() - self.cumulative_break_duration_ms;
        if worked_ms > 0 {
            worked_ms as f64 / MS_PER_HOUR
        } else {
            0.0
        }
    }
}

/// Lifecycle position of one owner's day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DayState {
    Idle,
    SignedIn,
    OnBreak,
    Closed,
}

impl DayState {
    pub fn of(record: Option<&AttendanceDayRecord>) -> Self {
        match record {
            None => DayState::Idle,
            Some(r) if r.is_closed() => DayState::Closed,
            Some(r) if r.sign_in_at.is_none() => DayState::Idle,
            Some(r) if r.is_on_break() => DayState::OnBreak,
            Some(_) => DayState::SignedIn,
        }
    }
}

/// Merge instruction for a single optional field.
///
/// `Keep` leaves the stored value, `Clear` removes it, `Set` overwrites it.
/// Distinct from `Option` so "not mentioned in this patch" and "explicitly
/// cleared" cannot be conflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch<T> {
    Keep,
    Clear,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T> Patch<T> {
    pub fn apply(self, slot: &mut Option<T>) {
        match self {
            Patch::Keep => {}
            Patch::Clear => *slot = None,
            Patch::Set(v) => *slot = Some(v),
        }
    }
}

/// One atomic merge-write against the store. Each state-machine transition
/// produces exactly one patch; a failed write leaves the record untouched.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub owner_id: String,
    pub date: NaiveDate,
    pub sign_in_at: Patch<DateTime<Local>>,
    pub sign_out_at: Patch<DateTime<Local>>,
    pub break_in_at: Patch<DateTime<Local>>,
    pub break_out_at: Patch<DateTime<Local>>,
    pub cumulative_break_duration_ms: Option<i64>,
    pub total_hours_worked: Option<f64>,
    pub work_mode: Option<WorkMode>,
    pub location: Option<String>,
}

impl RecordPatch {
    pub fn new(owner_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            owner_id: owner_id.into(),
            date,
            ..Self::default()
        }
    }

    /// Fold this patch into `base`, returning the post-merge snapshot.
    /// `updated_at` is left for the store to stamp.
    pub fn merged_into(&self, base: &AttendanceDayRecord) -> AttendanceDayRecord {
        let mut rec = base.clone();
        self.sign_in_at.apply(&mut rec.sign_in_at);
        self.sign_out_at.apply(&mut rec.sign_out_at);
        self.break_in_at.apply(&mut rec.break_in_at);
        self.break_out_at.apply(&mut rec.break_out_at);
        if let Some(ms) = self.cumulative_break_duration_ms {
            rec.cumulative_break_duration_ms = ms;
        }
        if let Some(hours) = self.total_hours_worked {
            rec.total_hours_worked = hours;
        }
        if let Some(mode) = self.work_mode {
            rec.work_mode = Some(mode);
        }
        if let Some(location) = &self.location {
            rec.location = location.clone();
        }
        rec
    }
}
