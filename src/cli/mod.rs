//! CLI command handling
//!
//! Resolves configuration, runs the selected steps and formats output.

use std::path::PathBuf;

use colored::Colorize;
use tracing::info;

use crate::catalog::{self, Suite};
use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::Result;
use crate::http::ApiClient;
use crate::testing::{Recorder, RunContext, Sequencer};

/// Command-line values that take precedence over the config file
#[derive(Debug, Default)]
pub struct Overrides {
    pub suite: Option<Suite>,
    pub base_url: Option<String>,
    pub no_demo: bool,
    pub pause_ms: Option<u64>,
    pub report: Option<PathBuf>,
}

impl Overrides {
    pub fn apply(self, config: &mut Config) {
        if let Some(suite) = self.suite {
            config.run.suite = suite;
        }
        if let Some(base_url) = self.base_url {
            config.api.base_url = base_url;
        }
        if self.no_demo {
            config.api.demo = false;
        }
        if let Some(pause_ms) = self.pause_ms {
            config.run.pause_ms = pause_ms;
        }
        if let Some(report) = self.report {
            config.run.report_path = report;
        }
    }
}

/// Dispatch a CLI command, returning the process exit code
pub async fn dispatch(command: Commands) -> Result<i32> {
    match command {
        Commands::Run {
            suite,
            base_url,
            no_demo,
            pause_ms,
            report,
            config,
            only,
            verbose: _,
        } => {
            let mut config = match config {
                Some(path) => Config::load_from(&path)?,
                None => Config::load()?,
            };
            Overrides {
                suite,
                base_url,
                no_demo,
                pause_ms,
                report,
            }
            .apply(&mut config);

            run(&config, &only).await
        }

        Commands::List { suite } => {
            let suite = suite.unwrap_or_default();
            println!("Suite '{}':", suite.as_str());
            for (i, name) in suite.step_names().iter().enumerate() {
                let description = catalog::step(name)
                    .map(|s| s.description())
                    .unwrap_or_default();
                println!("  {:>2}. {:<22} {}", i + 1, name, description.dimmed());
            }
            Ok(0)
        }
    }
}

/// Run the configured suite once and write the report
pub async fn run(config: &Config, only: &[String]) -> Result<i32> {
    config.validate()?;
    let steps = catalog::select(config.run.suite, only)?;
    let sequencer = Sequencer::new(steps)
        .with_pause(config.run.pause())
        .with_echo(true);
    let api = ApiClient::new(&config.api);

    print_header(&api, config.run.suite, sequencer.len());
    info!(
        base_url = api.base_url(),
        suite = config.run.suite.as_str(),
        steps = ?sequencer.step_names(),
        "starting run"
    );

    let mut context = RunContext::new();
    let mut recorder = Recorder::new().with_echo(true);
    let outcome = sequencer.run(&api, &mut context, &mut recorder).await;

    println!("\n{}", recorder.render(&outcome.summary));

    recorder.persist(&config.run.report_path, &outcome.summary)?;
    println!(
        "Detailed results saved to: {}",
        config.run.report_path.display()
    );

    Ok(outcome.exit_code())
}

fn print_header(api: &ApiClient, suite: Suite, steps: usize) {
    println!("{} {}", "Testing API at:".bold(), api.base_url().cyan());
    println!(
        "Suite: {} ({} steps){}",
        suite.as_str(),
        steps,
        if api.demo() { ", demo mode" } else { "" }
    );
    println!("{}", "=".repeat(80));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = Config::default();
        Overrides {
            suite: Some(Suite::Quick),
            base_url: Some("https://studio.test/api".to_string()),
            no_demo: true,
            pause_ms: Some(0),
            report: Some(PathBuf::from("out/report.json")),
        }
        .apply(&mut config);

        assert_eq!(config.run.suite, Suite::Quick);
        assert_eq!(config.api.base_url, "https://studio.test/api");
        assert!(!config.api.demo);
        assert_eq!(config.run.pause_ms, 0);
        assert_eq!(config.run.report_path, PathBuf::from("out/report.json"));
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let mut config = Config::default();
        Overrides::default().apply(&mut config);
        assert_eq!(config.run.suite, Suite::Full);
        assert!(config.api.demo);
        assert_eq!(config.run.pause_ms, 500);
    }

    /// Config for a quick run against a port nothing listens on
    async fn unreachable_config(report_path: PathBuf) -> Config {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut config = Config::default();
        Overrides {
            suite: Some(Suite::Quick),
            base_url: Some(format!("http://{addr}/api")),
            no_demo: false,
            pause_ms: Some(0),
            report: Some(report_path),
        }
        .apply(&mut config);
        config
    }

    #[tokio::test]
    async fn test_run_writes_report_and_fails_when_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("out").join("results.json");
        let config = unreachable_config(report_path.clone()).await;

        let code = run(&config, &[]).await.unwrap();
        assert_eq!(code, 1);

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(report["summary"]["passed"], 0);
        assert_eq!(report["summary"]["failed"], 6);
    }

    #[tokio::test]
    async fn test_run_rejects_bad_config_before_any_step() {
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("results.json");
        let mut config = unreachable_config(report_path.clone()).await;
        config.api.base_url = "https://studio.test/api?tenant=a".to_string();

        let err = run(&config, &[]).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(!report_path.exists());
    }

    #[tokio::test]
    async fn test_run_rejects_unknown_only_name() {
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("results.json");
        let config = unreachable_config(report_path.clone()).await;

        let err = run(&config, &["persona-export".to_string()]).await.unwrap_err();
        assert!(matches!(err, Error::UnknownStep { .. }));
        assert!(!report_path.exists());
    }
}
