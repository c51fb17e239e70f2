//! Append-only record of assertion outcomes
//!
//! Every check a step makes ends up here as one `TestRecord`, in execution
//! order. The summary, the console listing and the JSON report are all
//! derived from this log and nothing else.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Local};
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::common::{Error, Result};

/// One logged assertion outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestRecord {
    #[serde(rename = "test")]
    pub name: String,
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Local>,
    #[serde(rename = "response_data")]
    pub payload: Option<Value>,
}

/// Aggregate over all records of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    #[serde(rename = "total_tests")]
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Percentage of passed records, 0 when nothing was recorded
    pub success_rate: f64,
    #[serde(rename = "test_started_at")]
    pub started_at: DateTime<Local>,
    #[serde(rename = "test_completed_at")]
    pub completed_at: DateTime<Local>,
}

impl RunSummary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Process exit status for automation: 0 only when nothing failed
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }
}

/// Document written by `Recorder::persist`
#[derive(Serialize)]
struct Report<'a> {
    summary: &'a RunSummary,
    detailed_results: &'a [TestRecord],
}

/// Owner of the record log for one run
#[derive(Debug)]
pub struct Recorder {
    records: Vec<TestRecord>,
    started_at: DateTime<Local>,
    echo: bool,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder {
    /// A silent recorder
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            started_at: Local::now(),
            echo: false,
        }
    }

    /// Print a PASS/FAIL line to stdout as each record is appended
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Append a record
    pub fn record(
        &mut self,
        name: impl Into<String>,
        success: bool,
        message: impl Into<String>,
        payload: Option<Value>,
    ) -> &TestRecord {
        let record = TestRecord {
            name: name.into(),
            success,
            message: message.into(),
            timestamp: Local::now(),
            payload,
        };

        debug!(test = %record.name, success, message = %record.message, "recorded");
        if self.echo {
            print_record(&record);
        }

        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn pass(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.record(name, true, message, None);
    }

    pub fn fail(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.record(name, false, message, None);
    }

    /// Record a failure along with the response body that caused it
    pub fn fail_with(&mut self, name: impl Into<String>, message: impl Into<String>, payload: Value) {
        self.record(name, false, message, Some(payload));
    }

    pub fn records(&self) -> &[TestRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count outcomes in a single pass over the log
    pub fn summarize(&self) -> RunSummary {
        let passed = self.records.iter().filter(|r| r.success).count();
        let total = self.records.len();
        let success_rate = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64 * 100.0
        };

        RunSummary {
            total,
            passed,
            failed: total - passed,
            success_rate,
            started_at: self.started_at,
            completed_at: Local::now(),
        }
    }

    /// Human-readable listing: failures first, then passes, then the roll-up
    pub fn render(&self, summary: &RunSummary) -> String {
        let rule = "=".repeat(80);
        let mut out = String::new();

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "TEST SUMMARY");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Total:  {}", summary.total);
        let _ = writeln!(out, "Passed: {}", summary.passed);
        let _ = writeln!(out, "Failed: {}", summary.failed);

        if summary.failed > 0 {
            let _ = writeln!(out, "\nFAILED TESTS:");
            for record in self.records.iter().filter(|r| !r.success) {
                let _ = writeln!(out, "  • {}: {}", record.name, record.message);
            }
        }

        if summary.passed > 0 {
            let _ = writeln!(out, "\nPASSED TESTS:");
            for record in self.records.iter().filter(|r| r.success) {
                let _ = writeln!(out, "  • {}", record.name);
            }
        }

        let _ = writeln!(out, "\nSuccess rate: {:.1}%", summary.success_rate);
        let _ = writeln!(out, "Completed at: {}", summary.completed_at.to_rfc3339());
        out
    }

    /// Write the summary and every record as pretty JSON, replacing any
    /// previous report at `path`
    pub fn persist(&self, path: &Path, summary: &RunSummary) -> Result<()> {
        let report = Report {
            summary,
            detailed_results: &self.records,
        };
        let json = serde_json::to_string_pretty(&report)?;

        let write_err = |e: std::io::Error| Error::ReportWrite {
            path: path.display().to_string(),
            error: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        std::fs::write(path, json).map_err(write_err)
    }
}

fn print_record(record: &TestRecord) {
    if record.success {
        println!(
            "  {} {}: {} - {}",
            "✓".green(),
            "PASS".green().bold(),
            record.name,
            record.message.dimmed()
        );
    } else {
        println!(
            "  {} {}: {} - {}",
            "✗".red(),
            "FAIL".red().bold(),
            record.name,
            record.message
        );
        if let Some(payload) = &record.payload {
            let pretty = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
            println!("    Response: {}", pretty.dimmed());
        }
    }
}
