use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkMode {
    Office,
    RemoteHome,
    Hybrid,
}

impl WorkMode {
    /// Convert enum → wire/storage string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            WorkMode::Office => "Office",
            WorkMode::RemoteHome => "RemoteHome",
            WorkMode::Hybrid => "Hybrid",
        }
    }

    /// Convert wire/storage string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "Office" => Some(WorkMode::Office),
            "RemoteHome" => Some(WorkMode::RemoteHome),
            "Hybrid" => Some(WorkMode::Hybrid),
            _ => None,
        }
    }

    /// Label shown in tables and exports.
    pub fn label(&self) -> &'static str {
        match self {
            WorkMode::Office => "Office",
            WorkMode::RemoteHome => "Work From Home",
            WorkMode::Hybrid => "Hybrid",
        }
    }
}

impl std::fmt::Display for WorkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for WorkMode {
    type Err = crate::errors::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s).ok_or_else(|| crate::errors::AppError::InvalidWorkMode(s.to_string()))
    }
}
