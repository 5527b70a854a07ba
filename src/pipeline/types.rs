use crate::{
    error::PredictError,
    ledger::{STATUS_OK, nok_status},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub status: String,
    pub prediction: f64,
}

impl PredictionResult {
    pub fn ok(prediction: f64) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            prediction,
        }
    }

    /// Failed attempts report 0 with the error text in the status.
    pub fn failed(error: &PredictError) -> Self {
        Self {
            status: nok_status(error),
            prediction: 0.0,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Response body of the predict operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEnvelope {
    pub predictions: Vec<PredictionResult>,
}

/// An envelope together with the task id it was audited under.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    pub task_id: String,
    pub envelope: PredictionEnvelope,
}
