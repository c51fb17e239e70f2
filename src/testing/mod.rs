//! Test orchestration harness
//!
//! Runs an ordered sequence of checks against the remote API. Identifiers
//! flow between steps through the `RunContext`; every assertion outcome is
//! appended to the `Recorder`, which is the single source for the summary,
//! the console listing and the JSON report.

mod context;
mod recorder;
mod runner;
mod shape;

pub use context::{Role, RunContext};
pub use recorder::{Recorder, RunSummary, TestRecord};
pub use runner::{RunOutcome, Sequencer, Step, StepEnv};
pub use shape::{check_fields, check_optional, Shape};
