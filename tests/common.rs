#![allow(dead_code)]

use async_trait::async_trait;
use attendlog::{
    AppError, AppResult, AttendanceDayRecord, AttendanceStateMachine, AttendanceStore, Clock,
    LeaveLedger, LeaveRequest, LocationResolver, MemoryStore, Patch, Policy, RecordPatch, Session,
    WorkMode,
};
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};
use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Test clock pinned to an explicit instant; tests move it forward by hand.
pub struct ManualClock {
    now: Mutex<DateTime<Local>>,
}

impl ManualClock {
    pub fn at(start: DateTime<Local>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(start),
        })
    }

    pub fn set(&self, t: DateTime<Local>) {
        *self.now.lock().unwrap() = t;
    }

    pub fn advance(&self, d: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += d;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap()
    }
}

pub struct FixedResolver(pub &'static str);

#[async_trait]
impl LocationResolver for FixedResolver {
    async fn resolve(&self) -> AppResult<String> {
        Ok(self.0.to_string())
    }
}

pub struct FailingResolver;

#[async_trait]
impl LocationResolver for FailingResolver {
    async fn resolve(&self) -> AppResult<String> {
        Err(AppError::Other("geocoder unreachable".to_string()))
    }
}

/// Ledger stub returning the requests whose start date falls in range.
pub struct StaticLedger(pub Vec<LeaveRequest>);

#[async_trait]
impl LeaveLedger for StaticLedger {
    async fn leaves_in_range(
        &self,
        owner_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<LeaveRequest>> {
        Ok(self
            .0
            .iter()
            .filter(|l| l.owner_id == owner_id && l.start_date >= start && l.start_date <= end)
            .cloned()
            .collect())
    }
}

pub fn local_dt(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("unambiguous local time")
}

pub fn day(year: i32, month: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, d).expect("valid date")
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub machine: Arc<AttendanceStateMachine>,
    pub clock: Arc<ManualClock>,
}

/// Machine over an in-memory store with a manual clock and a fixed resolver.
pub fn harness(owner: &str, start: DateTime<Local>) -> Harness {
    harness_with_policy(owner, start, Policy::default())
}

/// Best-effort tracing for test debugging; RUST_LOG selects the filter.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

pub fn harness_with_policy(owner: &str, start: DateTime<Local>, policy: Policy) -> Harness {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let clock = ManualClock::at(start);
    let machine = Arc::new(AttendanceStateMachine::new(
        Session::new(owner),
        store.clone(),
        Arc::new(FixedResolver("1 Main Street, Springfield")),
        clock.clone(),
        policy,
    ));
    Harness {
        store,
        machine,
        clock,
    }
}

/// Seed one closed day record directly through the store, bypassing guards.
pub async fn seed_closed_day(
    store: &dyn AttendanceStore,
    owner: &str,
    date: NaiveDate,
    sign_in: DateTime<Local>,
    sign_out: DateTime<Local>,
    break_ms: i64,
    mode: WorkMode,
) -> AttendanceDayRecord {
    let mut patch = RecordPatch::new(owner, date);
    patch.sign_in_at = Patch::Set(sign_in);
    patch.sign_out_at = Patch::Set(sign_out);
    patch.cumulative_break_duration_ms = Some(break_ms);
    patch.total_hours_worked =
        Some(((sign_out - sign_in).num_milliseconds() - break_ms).max(0) as f64 / 3_600_000.0);
    patch.work_mode = Some(mode);
    patch.location = Some("Seeded".to_string());
    store.merge(patch).await.expect("seed merge")
}

pub fn leave(owner: &str, start: NaiveDate, leave_type: &str, hours: f64) -> LeaveRequest {
    LeaveRequest {
        owner_id: owner.to_string(),
        start_date: start,
        end_date: start,
        leave_type: leave_type.to_string(),
        hours_taken: hours,
    }
}

/// Unique output path inside the system temp dir, any stale copy removed.
pub fn temp_out(name: &str, ext: &str) -> PathBuf {
    let mut path = env::temp_dir();
    path.push(format!("{name}_attendlog.{ext}"));
    std::fs::remove_file(&path).ok();
    path
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
