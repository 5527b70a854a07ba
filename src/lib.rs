pub mod config;
pub mod error;
pub mod features;
pub mod ledger;
pub mod model;
pub mod pipeline;
pub mod server;

pub use error::{Error, PredictError, Result};
