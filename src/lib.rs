//! attendlog library root.
//!
//! Attendance-day lifecycle core for an employee time-tracking portal: a
//! per-user per-day state machine with timing guards, a cooperative
//! auto-closure monitor, and read-side aggregation and export projections.
//! Page routing, identity resolution and UI are external collaborators; this
//! crate owns the record lifecycle between them and the store.

pub mod config;
pub mod core;
pub mod errors;
pub mod export;
pub mod models;
pub mod providers;
pub mod store;
pub mod utils;

pub use crate::config::Policy;
pub use crate::core::aggregate::{
    AggregationEngine, DailySlot, HistoryEntry, HistoryFilter, HistoryRange, HistoryReport,
    HistorySummary, LeaveBreakdown, LeaveHoursByType, SortOrder,
};
pub use crate::core::guards::GuardViolation;
pub use crate::core::machine::AttendanceStateMachine;
pub use crate::core::monitor::{AutoCloseMonitor, due_for_closure, sweep_once};
pub use crate::errors::{AppError, AppResult};
pub use crate::export::{ExportFormat, ExportOptions, export_history};
pub use crate::models::{
    AttendanceDayRecord, DayState, LeaveRequest, LeaveType, Patch, RecordPatch, WorkMode,
};
pub use crate::providers::{
    Clock, LeaveLedger, LocationResolver, Session, SystemClock, UnresolvedLocation,
};
pub use crate::store::{AttendanceStore, MemoryStore, RecordWatch, SqliteStore};
