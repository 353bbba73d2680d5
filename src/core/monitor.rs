//! Cooperative auto-closure monitor.
//!
//! One cancellable periodic task per active session. Each tick sweeps the
//! open records this client can see (yesterday's and today's for the session
//! owner) and force-closes any that has outlived the session ceiling or
//! crossed local midnight. Closure goes through the same transition
//! vocabulary as a manual sign-out. The monitor only runs while its session
//! polls; a stale record nobody observes stays open until the next session
//! sweeps or the owner signs out manually.

use crate::config::Policy;
use crate::core::machine::AttendanceStateMachine;
use crate::errors::AppResult;
use crate::models::record::AttendanceDayRecord;
use crate::utils::time::in_midnight_window;
use chrono::{DateTime, Duration, Local};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, warn};

pub struct AutoCloseMonitor {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl AutoCloseMonitor {
    /// Spawn the periodic sweep for one machine. The task stops on `stop()`
    /// or when the monitor is dropped with its session.
    pub fn start(machine: Arc<AttendanceStateMachine>) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let tick_secs = machine.policy().monitor_tick_secs.max(1);

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(StdDuration::from_secs(tick_secs));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(owner = machine.owner_id(), tick_secs, "auto-close monitor started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(err) = sweep_once(&machine).await {
                            error!(owner = machine.owner_id(), %err, "auto-close sweep failed");
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        info!(owner = machine.owner_id(), "auto-close monitor stopped");
                        break;
                    }
                }
            }
        });

        Self { shutdown, handle }
    }

    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }
}

impl Drop for AutoCloseMonitor {
    fn drop(&mut self) {
        self.stop();
        self.handle.abort();
    }
}

/// True when an open record must be force-closed: its session has outlived
/// the policy ceiling, or the local clock sits in the post-midnight window
/// and the record belongs to an earlier day. The date check keeps a fresh
/// post-midnight sign-in from being closed on the spot.
pub fn due_for_closure(
    record: &AttendanceDayRecord,
    now: DateTime<Local>,
    policy: &Policy,
) -> bool {
    if !record.is_open() {
        return false;
    }
    let Some(sign_in) = record.sign_in_at else {
        return false;
    };
    if now - sign_in >= Duration::hours(policy.max_session_hours) {
        return true;
    }
    in_midnight_window(now, policy.midnight_window_minutes) && record.date < now.date_naive()
}

/// One sweep over the records the session can see. Returns the number of
/// records closed. Individual closure failures are logged and skipped so a
/// single bad record cannot stall the sweep.
pub async fn sweep_once(machine: &AttendanceStateMachine) -> AppResult<usize> {
    let now = machine.clock().now();
    let today = now.date_naive();
    let start = today.pred_opt().unwrap_or(today);

    let open = machine.open_records_between(start, today).await?;
    let mut closed = 0;

    for record in open {
        if !due_for_closure(&record, now, machine.policy()) {
            continue;
        }
        match machine.auto_sign_out(record.date).await {
            Ok(_) => closed += 1,
            Err(err) => {
                warn!(owner = machine.owner_id(), date = %record.date, %err, "auto-close failed");
            }
        }
    }

    Ok(closed)
}
