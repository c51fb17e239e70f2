//! API Probe - black-box integration tests for the segmentation studio API
//!
//! Runs a suite of checks against a live instance of the service and exits
//! non-zero when any of them failed.

use clap::Parser;
use commands::Commands;
use probe::common::logging;
use probe::{cli, commands};

#[derive(Parser)]
#[command(name = "probe", about = "Integration test harness for the studio API")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.command.verbose());

    match cli::dispatch(cli.command).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
