//! Common utilities shared by the harness, the catalog and the CLI

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Result};

/// Unix timestamp used to make resource names unique per run
pub fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
