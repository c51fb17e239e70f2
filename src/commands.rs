//! CLI command definitions
//!
//! Defines the clap commands for the probe CLI.

use clap::Subcommand;
use std::path::PathBuf;

use crate::catalog::Suite;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a suite against the service
    Run {
        /// Suite to run (default: from config, else full)
        #[arg(long, short, value_enum)]
        suite: Option<Suite>,

        /// Base URL of the API, e.g. https://studio.example.com/api
        #[arg(long)]
        base_url: Option<String>,

        /// Do not append demo=true to requests
        #[arg(long)]
        no_demo: bool,

        /// Pause between steps in milliseconds
        #[arg(long)]
        pause_ms: Option<u64>,

        /// Where to write the JSON report
        #[arg(long)]
        report: Option<PathBuf>,

        /// Configuration file to use instead of the default location
        #[arg(long)]
        config: Option<PathBuf>,

        /// Only run these steps of the suite
        /// Can be specified multiple times: --only workspace-crud --only cleanup
        #[arg(long)]
        only: Vec<String>,

        /// Log every request and response
        #[arg(long, short)]
        verbose: bool,
    },

    /// List the steps of a suite
    List {
        /// Suite to list (default: full)
        #[arg(long, short, value_enum)]
        suite: Option<Suite>,
    },
}

impl Commands {
    /// Whether debug logging was requested
    pub fn verbose(&self) -> bool {
        matches!(self, Commands::Run { verbose: true, .. })
    }
}
