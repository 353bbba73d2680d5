mod common;

use attendlog::{
    AppError, AttendanceStore, AutoCloseMonitor, GuardViolation, Policy, WorkMode,
    due_for_closure, sweep_once,
};
use chrono::Duration;
use common::*;
use std::time::Duration as StdDuration;

#[tokio::test]
async fn sweep_closes_a_session_past_the_ceiling() {
    // signIn 05:00, 16 hours elapse, monitor ticks
    let h = harness("ada", local_dt(2025, 9, 1, 5, 0));
    h.machine.sign_in(WorkMode::Office).await.unwrap();

    h.clock.set(local_dt(2025, 9, 1, 21, 0));
    let closed = sweep_once(&h.machine).await.unwrap();
    assert_eq!(closed, 1);

    let rec = h.machine.today_record().await.unwrap().unwrap();
    assert!(rec.is_closed());
    assert_eq!(rec.sign_out_at, Some(local_dt(2025, 9, 1, 21, 0)));
    assert!(rec.sign_out_at >= rec.sign_in_at);
    assert_close(rec.total_hours_worked, 16.0);

    // no further transitions until the sign-in gap is satisfied
    let err = h.machine.break_in().await.unwrap_err();
    assert!(matches!(err, AppError::Guard(GuardViolation::NotSignedIn)));
    let err = h.machine.sign_in(WorkMode::Office).await.unwrap_err();
    assert!(matches!(err, AppError::Guard(GuardViolation::SignInTooSoon)));
}

#[tokio::test]
async fn sweep_leaves_fresh_sessions_open() {
    let h = harness("ada", local_dt(2025, 9, 1, 9, 0));
    h.machine.sign_in(WorkMode::Office).await.unwrap();

    h.clock.advance(Duration::hours(3));
    let closed = sweep_once(&h.machine).await.unwrap();
    assert_eq!(closed, 0);
    assert!(h.machine.today_record().await.unwrap().unwrap().is_open());
}

#[tokio::test]
async fn midnight_window_closes_yesterdays_open_record() {
    let h = harness("ada", local_dt(2025, 9, 1, 20, 0));
    h.machine.sign_in(WorkMode::RemoteHome).await.unwrap();

    // 00:01 next day: inside the window, well under the 12h ceiling
    h.clock.set(local_dt(2025, 9, 2, 0, 1));
    let closed = sweep_once(&h.machine).await.unwrap();
    assert_eq!(closed, 1);

    let rec = h
        .store
        .get("ada", day(2025, 9, 1))
        .await
        .unwrap()
        .unwrap();
    assert!(rec.is_closed());
    assert_eq!(rec.sign_out_at, Some(local_dt(2025, 9, 2, 0, 1)));
    assert!(rec.sign_out_at >= rec.sign_in_at);
}

#[tokio::test]
async fn midnight_window_spares_a_fresh_post_midnight_sign_in() {
    let h = harness("ada", local_dt(2025, 9, 2, 0, 1));
    h.machine.sign_in(WorkMode::Office).await.unwrap();

    let closed = sweep_once(&h.machine).await.unwrap();
    assert_eq!(closed, 0);
    assert!(h.machine.today_record().await.unwrap().unwrap().is_open());
}

#[tokio::test]
async fn forced_closure_does_not_credit_an_open_break() {
    let h = harness("ada", local_dt(2025, 9, 1, 9, 0));
    h.machine.sign_in(WorkMode::Office).await.unwrap();

    h.clock.set(local_dt(2025, 9, 1, 12, 0));
    h.machine.break_in().await.unwrap();

    // 12.5h after sign-in, still on break
    h.clock.set(local_dt(2025, 9, 1, 21, 30));
    let closed = sweep_once(&h.machine).await.unwrap();
    assert_eq!(closed, 1);

    let rec = h.machine.today_record().await.unwrap().unwrap();
    assert!(rec.is_closed());
    assert_eq!(rec.cumulative_break_duration_ms, 0);
    assert!(rec.break_in_at.is_none());
    assert_close(rec.total_hours_worked, 12.5);
}

#[test]
fn due_for_closure_is_a_pure_predicate() {
    use attendlog::{AttendanceDayRecord, Patch, RecordPatch};

    let policy = Policy::default();
    let mut patch = RecordPatch::new("ada", day(2025, 9, 1));
    patch.sign_in_at = Patch::Set(local_dt(2025, 9, 1, 9, 0));
    let rec = patch.merged_into(&AttendanceDayRecord::empty("ada", day(2025, 9, 1)));

    assert!(!due_for_closure(&rec, local_dt(2025, 9, 1, 20, 59), &policy));
    assert!(due_for_closure(&rec, local_dt(2025, 9, 1, 21, 0), &policy));

    // a record opened just before midnight hits the window, not the ceiling
    let mut patch = RecordPatch::new("ada", day(2025, 9, 1));
    patch.sign_in_at = Patch::Set(local_dt(2025, 9, 1, 23, 0));
    let late = patch.merged_into(&AttendanceDayRecord::empty("ada", day(2025, 9, 1)));

    assert!(due_for_closure(&late, local_dt(2025, 9, 2, 0, 1), &policy));
    // outside the two-minute window and under the ceiling
    assert!(!due_for_closure(&late, local_dt(2025, 9, 2, 0, 2), &policy));
}

#[tokio::test(start_paused = true)]
async fn monitor_task_sweeps_on_its_interval_until_stopped() {
    let h = harness("ada", local_dt(2025, 9, 1, 5, 0));
    h.machine.sign_in(WorkMode::Office).await.unwrap();
    h.clock.set(local_dt(2025, 9, 1, 21, 0));

    let monitor = AutoCloseMonitor::start(h.machine.clone());

    // paused tokio time auto-advances through the first tick
    let mut closed = false;
    for _ in 0..50 {
        tokio::time::sleep(StdDuration::from_millis(100)).await;
        if h.machine.today_record().await.unwrap().unwrap().is_closed() {
            closed = true;
            break;
        }
    }
    assert!(closed, "monitor never closed the stale record");

    monitor.stop();
}
