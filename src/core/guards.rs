//! Pure transition predicates over `(record, now)`.
//!
//! A guard never mutates state and performs no I/O; a violation carries a
//! machine-readable reason the portal UI turns into an explanatory message.
//! The caller can retry once conditions change.

use crate::config::Policy;
use crate::models::record::AttendanceDayRecord;
use chrono::{DateTime, Duration, Local};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GuardViolation {
    #[error("already signed in for today")]
    AlreadySignedIn,
    #[error("minimum gap since the last sign-out has not elapsed")]
    SignInTooSoon,
    #[error("not signed in")]
    NotSignedIn,
    #[error("already on break")]
    AlreadyOnBreak,
    #[error("not on break")]
    NotOnBreak,
    #[error("minimum work duration not met")]
    MinDurationNotMet,
}

impl GuardViolation {
    pub fn code(&self) -> &'static str {
        match self {
            GuardViolation::AlreadySignedIn => "ALREADY_SIGNED_IN",
            GuardViolation::SignInTooSoon => "SIGN_IN_TOO_SOON",
            GuardViolation::NotSignedIn => "NOT_SIGNED_IN",
            GuardViolation::AlreadyOnBreak => "ALREADY_ON_BREAK",
            GuardViolation::NotOnBreak => "NOT_ON_BREAK",
            GuardViolation::MinDurationNotMet => "MIN_DURATION_NOT_MET",
        }
    }
}

/// Sign-in is blocked by an open record, and after a sign-out until the
/// minimum gap has elapsed.
pub fn can_sign_in(
    record: Option<&AttendanceDayRecord>,
    now: DateTime<Local>,
    policy: &Policy,
) -> Result<(), GuardViolation> {
    let Some(rec) = record else {
        return Ok(());
    };
    if rec.is_open() {
        return Err(GuardViolation::AlreadySignedIn);
    }
    if let Some(sign_out) = rec.sign_out_at
        && now - sign_out < Duration::hours(policy.min_sign_in_gap_hours)
    {
        return Err(GuardViolation::SignInTooSoon);
    }
    Ok(())
}

/// Manual sign-out needs an open record, no running break, and the policy's
/// minimum elapsed duration since sign-in. Passing guards hand back the
/// validated record so callers never re-check presence.
pub fn can_sign_out<'a>(
    record: Option<&'a AttendanceDayRecord>,
    now: DateTime<Local>,
    policy: &Policy,
) -> Result<&'a AttendanceDayRecord, GuardViolation> {
    let rec = open_record(record)?;
    if rec.is_on_break() {
        return Err(GuardViolation::AlreadyOnBreak);
    }
    if let Some(sign_in) = rec.sign_in_at
        && now - sign_in < Duration::minutes(policy.min_sign_out_minutes)
    {
        return Err(GuardViolation::MinDurationNotMet);
    }
    Ok(rec)
}

pub fn can_break_in<'a>(
    record: Option<&'a AttendanceDayRecord>,
) -> Result<&'a AttendanceDayRecord, GuardViolation> {
    let rec = open_record(record)?;
    if rec.is_on_break() {
        return Err(GuardViolation::AlreadyOnBreak);
    }
    Ok(rec)
}

pub fn can_break_out<'a>(
    record: Option<&'a AttendanceDayRecord>,
) -> Result<&'a AttendanceDayRecord, GuardViolation> {
    let rec = open_record(record)?;
    if !rec.is_on_break() {
        return Err(GuardViolation::NotOnBreak);
    }
    Ok(rec)
}

/// Forced closure only needs an open record; the minimum-duration policy
/// does not apply.
pub fn can_auto_sign_out<'a>(
    record: Option<&'a AttendanceDayRecord>,
) -> Result<&'a AttendanceDayRecord, GuardViolation> {
    open_record(record)
}

fn open_record(
    record: Option<&AttendanceDayRecord>,
) -> Result<&AttendanceDayRecord, GuardViolation> {
    match record {
        Some(rec) if rec.is_open() => Ok(rec),
        _ => Err(GuardViolation::NotSignedIn),
    }
}
