use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Reference table error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("Invalid state transition: {current} -> {requested}")]
    InvalidTransition { current: String, requested: String },

    #[error("Task not found: {task_id}")]
    TaskNotFound { task_id: String },
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn ledger(msg: impl Into<String>) -> Self {
        Self::Ledger(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }
}

/// Failures scoped to a single prediction request.
///
/// These never escape the orchestrator: they are rendered into the
/// `NOK/<message>` status of the response envelope and the ledger row.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("inference failure: {0}")]
    InferenceFailure(String),

    #[error("inference deadline of {millis} ms exceeded")]
    DeadlineExceeded { millis: u64 },
}

impl PredictError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRequest(msg.into())
    }

    pub fn inference(msg: impl Into<String>) -> Self {
        Self::InferenceFailure(msg.into())
    }
}
