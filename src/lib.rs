//! API Probe - black-box integration tests for the segmentation studio API
//!
//! Drives an ordered catalog of checks against a running instance of the
//! service over HTTP, records every assertion, and reports a summary plus a
//! JSON file suitable for CI.

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod common;
pub mod http;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
