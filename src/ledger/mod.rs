mod storage;
mod types;

pub use storage::{LibsqlLedger, TaskLedger};
pub use types::*;
