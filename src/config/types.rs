use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Serialized model artifact, overridden by `MODEL`.
    #[serde(default)]
    pub path: String,
    /// Training table used to derive the input schema, overridden by `TRAIN_DF`.
    #[serde(default)]
    pub reference_path: String,
    #[serde(default = "default_target_column")]
    pub target_column: String,
    #[serde(default = "default_reference_rows")]
    pub reference_rows: usize,
    #[serde(default = "default_max_processing_ms")]
    pub max_processing_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_ledger_path")]
    pub path: String,
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            reference_path: String::new(),
            target_column: default_target_column(),
            reference_rows: default_reference_rows(),
            max_processing_ms: default_max_processing_ms(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_target_column() -> String {
    "price".to_string()
}

fn default_reference_rows() -> usize {
    5
}

fn default_max_processing_ms() -> u64 {
    5000
}

fn default_ledger_path() -> String {
    "sqlitedb/tasks.sqlite3".to_string()
}

// Asia/Jakarta, no daylight saving.
fn default_utc_offset_hours() -> i32 {
    7
}
