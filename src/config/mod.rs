//! Attendance policy configuration.
//!
//! The timing constants the guards and the monitor consult live here as one
//! serializable struct, loaded from a per-user YAML file or falling back to
//! the canonical defaults.

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Minimum elapsed time between sign-in and a manual sign-out.
    /// 0 disables the check.
    #[serde(default = "default_min_sign_out_minutes")]
    pub min_sign_out_minutes: i64,
    /// Minimum gap between a sign-out and the next sign-in on the same
    /// day record.
    #[serde(default = "default_min_sign_in_gap_hours")]
    pub min_sign_in_gap_hours: i64,
    /// Session ceiling after which the monitor force-closes an open record.
    #[serde(default = "default_max_session_hours")]
    pub max_session_hours: i64,
    /// Monitor tick interval.
    #[serde(default = "default_monitor_tick_secs")]
    pub monitor_tick_secs: u64,
    /// Width of the once-a-day post-midnight closure window, in minutes.
    #[serde(default = "default_midnight_window_minutes")]
    pub midnight_window_minutes: u32,
    /// Nominal hours per working day, the leave-breakdown budget unit.
    #[serde(default = "default_workday_hours")]
    pub workday_hours: f64,
}

fn default_min_sign_out_minutes() -> i64 {
    15
}
fn default_min_sign_in_gap_hours() -> i64 {
    12
}
fn default_max_session_hours() -> i64 {
    12
}
fn default_monitor_tick_secs() -> u64 {
    60
}
fn default_midnight_window_minutes() -> u32 {
    2
}
fn default_workday_hours() -> f64 {
    8.0
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            min_sign_out_minutes: default_min_sign_out_minutes(),
            min_sign_in_gap_hours: default_min_sign_in_gap_hours(),
            max_session_hours: default_max_session_hours(),
            monitor_tick_secs: default_monitor_tick_secs(),
            midnight_window_minutes: default_midnight_window_minutes(),
            workday_hours: default_workday_hours(),
        }
    }
}

impl Policy {
    /// Standard configuration directory depending on the platform.
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".attendlog")
    }

    /// Full path of the policy file.
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("attendlog.conf")
    }

    /// Load the policy from the standard location, or return defaults when
    /// the file is missing or unreadable.
    pub fn load() -> Self {
        let path = Self::config_file();
        match Self::load_from(&path) {
            Ok(policy) => policy,
            Err(AppError::NotFound(_)) => Self::default(),
            Err(err) => {
                warn!(path = %path.display(), %err, "falling back to default policy");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Err(AppError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn save(&self) -> AppResult<()> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;
        let yaml = serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))?;
        fs::write(Self::config_file(), yaml)?;
        Ok(())
    }
}
