//! The per-session attendance state machine.
//!
//! Every transition reads the owner's day record, runs the matching guard,
//! and persists exactly one merge-write. A failed guard returns the
//! violation without touching the store; a failed write surfaces to the
//! caller and is never retried here.

use crate::config::Policy;
use crate::core::guards::{self, GuardViolation};
use crate::errors::AppResult;
use crate::models::record::{AttendanceDayRecord, DayState, Patch, RecordPatch};
use crate::models::work_mode::WorkMode;
use crate::providers::{Clock, LocationResolver, Session};
use crate::store::{AttendanceStore, RecordWatch};
use chrono::{DateTime, Local, NaiveDate};
use std::sync::Arc;
use tracing::{info, warn};

/// Placeholder recorded when the geocoding collaborator fails; the sign-in
/// itself proceeds.
pub const LOCATION_FETCH_FAILED: &str = "Location fetch failed";

pub struct AttendanceStateMachine {
    session: Session,
    store: Arc<dyn AttendanceStore>,
    resolver: Arc<dyn LocationResolver>,
    clock: Arc<dyn Clock>,
    policy: Policy,
}

impl AttendanceStateMachine {
    pub fn new(
        session: Session,
        store: Arc<dyn AttendanceStore>,
        resolver: Arc<dyn LocationResolver>,
        clock: Arc<dyn Clock>,
        policy: Policy,
    ) -> Self {
        Self {
            session,
            store,
            resolver,
            clock,
            policy,
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.session.owner_id
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Today's record for the session owner, if any.
    pub async fn today_record(&self) -> AppResult<Option<AttendanceDayRecord>> {
        let today = self.clock.now().date_naive();
        self.store.get(&self.session.owner_id, today).await
    }

    /// Lifecycle position of today's record.
    pub async fn day_state(&self) -> AppResult<DayState> {
        Ok(DayState::of(self.today_record().await?.as_ref()))
    }

    /// Live subscription to today's record. Dropping the receiver releases
    /// the subscription.
    pub async fn watch_today(&self) -> AppResult<RecordWatch> {
        let today = self.clock.now().date_naive();
        self.store.watch(&self.session.owner_id, today).await
    }

    /// Idle → SignedIn. Creates today's record, resolving a best-effort
    /// location; resolver failure degrades to a placeholder.
    pub async fn sign_in(&self, work_mode: WorkMode) -> AppResult<AttendanceDayRecord> {
        let now = self.clock.now();
        let today = now.date_naive();
        let current = self.store.get(&self.session.owner_id, today).await?;
        guards::can_sign_in(current.as_ref(), now, &self.policy)?;

        let location = match self.resolver.resolve().await {
            Ok(location) => location,
            Err(err) => {
                warn!(owner = %self.session.owner_id, %err, "location lookup failed");
                LOCATION_FETCH_FAILED.to_string()
            }
        };

        let mut patch = RecordPatch::new(&self.session.owner_id, today);
        patch.sign_in_at = Patch::Set(now);
        patch.sign_out_at = Patch::Clear;
        patch.break_in_at = Patch::Clear;
        patch.break_out_at = Patch::Clear;
        patch.cumulative_break_duration_ms = Some(0);
        patch.total_hours_worked = Some(0.0);
        patch.work_mode = Some(work_mode);
        patch.location = Some(location);

        let record = self.store.merge(patch).await?;
        info!(owner = %self.session.owner_id, date = %today, mode = work_mode.to_db_str(), "signed in");
        Ok(record)
    }

    /// SignedIn → OnBreak.
    pub async fn break_in(&self) -> AppResult<AttendanceDayRecord> {
        let now = self.clock.now();
        let today = now.date_naive();
        let current = self.store.get(&self.session.owner_id, today).await?;
        guards::can_break_in(current.as_ref())?;

        let mut patch = RecordPatch::new(&self.session.owner_id, today);
        patch.break_in_at = Patch::Set(now);
        patch.break_out_at = Patch::Clear;

        let record = self.store.merge(patch).await?;
        info!(owner = %self.session.owner_id, date = %today, "break started");
        Ok(record)
    }

    /// OnBreak → SignedIn. Credits the just-completed break to the day's
    /// cumulative break duration.
    pub async fn break_out(&self) -> AppResult<AttendanceDayRecord> {
        let now = self.clock.now();
        let today = now.date_naive();
        let current = self.store.get(&self.session.owner_id, today).await?;
        let rec = guards::can_break_out(current.as_ref())?;

        let Some(break_in) = rec.break_in_at else {
            return Err(GuardViolation::NotOnBreak.into());
        };
        let this_break_ms = (now - break_in).num_milliseconds().max(0);

        let mut patch = RecordPatch::new(&self.session.owner_id, today);
        patch.break_out_at = Patch::Set(now);
        patch.break_in_at = Patch::Clear;
        patch.cumulative_break_duration_ms =
            Some(rec.cumulative_break_duration_ms + this_break_ms);

        let record = self.store.merge(patch).await?;
        info!(owner = %self.session.owner_id, date = %today, break_ms = this_break_ms, "break ended");
        Ok(record)
    }

    /// SignedIn → Closed. Computes the day's worked hours and clears any
    /// stray break markers.
    pub async fn sign_out(&self) -> AppResult<AttendanceDayRecord> {
        let now = self.clock.now();
        let today = now.date_naive();
        let current = self.store.get(&self.session.owner_id, today).await?;
        let rec = guards::can_sign_out(current.as_ref(), now, &self.policy)?;

        let record = self.close(rec, today, now).await?;
        info!(owner = %self.session.owner_id, date = %today, hours = record.total_hours_worked, "signed out");
        Ok(record)
    }

    /// Forced closure for the monitor: same effect as `sign_out`, but legal
    /// from `OnBreak` and exempt from the minimum-duration policy. A break
    /// still running at closure is not credited to the cumulative total.
    pub async fn auto_sign_out(&self, date: NaiveDate) -> AppResult<AttendanceDayRecord> {
        let now = self.clock.now();
        let current = self.store.get(&self.session.owner_id, date).await?;
        let rec = guards::can_auto_sign_out(current.as_ref())?;

        let record = self.close(rec, date, now).await?;
        info!(owner = %self.session.owner_id, date = %date, hours = record.total_hours_worked, "auto-closed open session");
        Ok(record)
    }

    async fn close(
        &self,
        rec: &AttendanceDayRecord,
        date: NaiveDate,
        now: DateTime<Local>,
    ) -> AppResult<AttendanceDayRecord> {
        let mut patch = RecordPatch::new(&self.session.owner_id, date);
        patch.sign_out_at = Patch::Set(now);
        patch.total_hours_worked = Some(rec.worked_hours_at(now));
        patch.break_in_at = Patch::Clear;
        patch.break_out_at = Patch::Clear;

        self.store.merge(patch).await
    }

    /// Open records for the session owner in `[start, end]`, the set a
    /// monitor sweep evaluates.
    pub async fn open_records_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<AttendanceDayRecord>> {
        let records = self
            .store
            .query(&self.session.owner_id, Some((start, end)))
            .await?;
        Ok(records.into_iter().filter(|r| r.is_open()).collect())
    }
}
