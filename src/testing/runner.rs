//! Step sequencing
//!
//! Runs an ordered list of steps against the remote API, one at a time.
//! A step that errors or panics is converted into a single failing record
//! and the run moves on; nothing a step does can abort the run.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use async_trait::async_trait;
use colored::Colorize;
use futures_util::FutureExt;
use serde_json::Value;
use tracing::{info, warn};

use crate::common::Result;
use crate::http::{ApiClient, ApiResponse};

use super::context::{Role, RunContext};
use super::recorder::{Recorder, RunSummary};
use super::shape::{check_optional, Shape};

/// One self-contained check, or a small group of related assertions
#[async_trait]
pub trait Step: Send + Sync {
    /// Catalog name, used on the command line
    fn name(&self) -> &'static str;

    /// Heading printed before the step runs
    fn description(&self) -> &'static str;

    /// Run the step. `Ok(false)` means the step recorded at least one
    /// failure; an `Err` is treated as a crash.
    async fn run(&self, env: &mut StepEnv<'_>) -> Result<bool>;
}

/// Everything a step may touch while it runs
pub struct StepEnv<'a> {
    pub api: &'a ApiClient,
    pub context: &'a mut RunContext,
    pub recorder: &'a mut Recorder,
}

impl StepEnv<'_> {
    /// Identifier stored for `role`, or a single failing record under
    /// `check` when the run has none
    pub fn require(&mut self, role: Role, check: &str) -> Option<String> {
        match self.context.get(role) {
            Some(id) => Some(id.to_string()),
            None => {
                self.recorder.fail(check, format!("No {role} ID available"));
                None
            }
        }
    }

    /// The response, if one arrived with `expected` status
    ///
    /// Records a failure under `check` for a transport error or a status
    /// mismatch. Nothing is recorded on success; the caller does that once
    /// it has checked the body.
    pub fn expect_status(
        &mut self,
        check: &str,
        reply: Result<ApiResponse>,
        expected: u16,
    ) -> Option<ApiResponse> {
        self.expect_any_status(check, reply, &[expected])
    }

    /// Like `expect_status`, accepting any of several codes
    pub fn expect_any_status(
        &mut self,
        check: &str,
        reply: Result<ApiResponse>,
        accepted: &[u16],
    ) -> Option<ApiResponse> {
        match reply {
            Ok(response) if accepted.contains(&response.status) => Some(response),
            Ok(response) => {
                let expected = accepted
                    .iter()
                    .map(u16::to_string)
                    .collect::<Vec<_>>()
                    .join(" or ");
                self.recorder.fail_with(
                    check,
                    format!("expected status {expected}, got {}", response.status),
                    response.payload(),
                );
                None
            }
            Err(e) => {
                self.recorder.fail(check, format!("No response: {e}"));
                None
            }
        }
    }

    /// Check that `value` holds every one of `fields`, recording a failure
    /// that names the missing ones otherwise
    pub fn expect_shape(
        &mut self,
        check: &str,
        response: &ApiResponse,
        value: Option<&Value>,
        fields: &[&str],
    ) -> bool {
        match check_optional(value, fields) {
            Shape::Valid => true,
            shape => {
                self.recorder.fail_with(
                    check,
                    format!("Invalid response structure, {shape}"),
                    response.payload(),
                );
                false
            }
        }
    }
}

/// What a run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub summary: RunSummary,
    pub steps_passed: usize,
    pub steps_failed: usize,
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        self.summary.exit_code()
    }
}

/// Runs steps in order with a fixed pause between them
pub struct Sequencer {
    steps: Vec<Box<dyn Step>>,
    pause: Duration,
    echo: bool,
}

impl Sequencer {
    pub fn new(steps: Vec<Box<dyn Step>>) -> Self {
        Self {
            steps,
            pause: Duration::ZERO,
            echo: false,
        }
    }

    /// Pause inserted between consecutive steps
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Print a heading before each step
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step, then summarize the records
    pub async fn run(
        &self,
        api: &ApiClient,
        context: &mut RunContext,
        recorder: &mut Recorder,
    ) -> RunOutcome {
        let mut steps_passed = 0;
        let mut steps_failed = 0;

        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }

            info!(step = step.name(), "running step");
            if self.echo {
                println!("\n{} {}", "▶".cyan(), step.description().cyan().bold());
            }

            let mut env = StepEnv {
                api,
                context: &mut *context,
                recorder: &mut *recorder,
            };
            let result = AssertUnwindSafe(step.run(&mut env)).catch_unwind().await;

            let passed = match result {
                Ok(Ok(passed)) => passed,
                Ok(Err(e)) => {
                    warn!(step = step.name(), error = %e, "step crashed");
                    recorder.fail(step.name(), format!("Step crashed: {e}"));
                    false
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    warn!(step = step.name(), panic = %message, "step panicked");
                    recorder.fail(step.name(), format!("Step panicked: {message}"));
                    false
                }
            };

            if passed {
                steps_passed += 1;
            } else {
                steps_failed += 1;
            }
        }

        let summary = recorder.summarize();
        info!(
            steps_passed,
            steps_failed,
            passed = summary.passed,
            failed = summary.failed,
            "run finished"
        );

        RunOutcome {
            summary,
            steps_passed,
            steps_failed,
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
