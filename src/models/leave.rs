use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One approved time-off request from the external leave ledger.
/// Read-only to this crate; consumed by the leave breakdown projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub owner_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: String,
    #[serde(default)]
    pub hours_taken: f64,
}

impl LeaveRequest {
    pub fn leave_type(&self) -> LeaveType {
        LeaveType::from_label(&self.leave_type)
    }
}

/// Leave categories carried by the breakdown projection. Ledger entries with
/// an unrecognized type bucket into `Extra` rather than being dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum LeaveType {
    Medical,
    Casual,
    Extra,
}

impl LeaveType {
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "medical" | "sick" | "sick leave" => LeaveType::Medical,
            "casual" | "casual leave" => LeaveType::Casual,
            _ => LeaveType::Extra,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LeaveType::Medical => "Medical",
            LeaveType::Casual => "Casual",
            LeaveType::Extra => "Extra",
        }
    }
}
