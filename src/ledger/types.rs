use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub const PREDICT_TASK_TYPE: &str = "predict_house_price";
pub const STATUS_OK: &str = "OK";
pub const STATUS_NOK_PREFIX: &str = "NOK";

/// Builds the failure status carried by both the response and the ledger row.
pub fn nok_status(message: impl std::fmt::Display) -> String {
    format!("{STATUS_NOK_PREFIX}/{message}")
}

/// One audit row: a single prediction attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: String,
    pub task_type: String,
    pub status: String,
    pub start_date: DateTime<FixedOffset>,
    pub end_date: DateTime<FixedOffset>,
    pub messages: String,
}

impl TaskRecord {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}
