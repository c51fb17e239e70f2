//! Checks against the segmentation studio API
//!
//! Every check lives in one catalog under a stable name. A suite is an
//! ordered selection of catalog names; order matters because later steps
//! consume identifiers created by earlier ones, and `cleanup` always comes
//! last so it can delete what the run created, children before parents.

mod cleanup;
mod errors;
pub mod fixtures;
mod personas;
mod profiles;
mod segments;
mod strategies;
mod workspaces;

use clap::ValueEnum;
use serde::Deserialize;
use serde_json::Value;

use crate::common::{Error, Result};
use crate::testing::Step;

pub use cleanup::Cleanup;
pub use errors::ErrorHandling;
pub use personas::{PersonaExport, PersonaGeneration};
pub use profiles::Profiles;
pub use segments::SegmentCrud;
pub use strategies::{StrategyExport, StrategyGeneration, StrategyListing, StrategyWorkflow};
pub use workspaces::{AccessControl, ContentValidation, DemoAccess, WorkspaceCrud};

/// Every catalog step, in the order the full suite runs them
pub const STEP_NAMES: [&str; 14] = [
    "demo-access",
    "workspace-crud",
    "content-validation",
    "segment-crud",
    "access-control",
    "profiles",
    "persona-generation",
    "strategy-generation",
    "strategy-listing",
    "strategy-export",
    "strategy-workflow",
    "persona-export",
    "error-handling",
    "cleanup",
];

/// Named, ordered selection of catalog steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Suite {
    /// Validation plus workspace and segment lifecycles
    Quick,
    /// Segment to persona to strategy pipeline
    Workflow,
    /// Every check in the catalog
    #[default]
    Full,
}

impl Suite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Suite::Quick => "quick",
            Suite::Workflow => "workflow",
            Suite::Full => "full",
        }
    }

    /// Catalog names in run order
    pub fn step_names(&self) -> &'static [&'static str] {
        match self {
            Suite::Quick => &[
                "content-validation",
                "workspace-crud",
                "segment-crud",
                "cleanup",
            ],
            Suite::Workflow => &[
                "demo-access",
                "segment-crud",
                "profiles",
                "persona-generation",
                "strategy-generation",
                "persona-export",
                "strategy-export",
                "cleanup",
            ],
            Suite::Full => &STEP_NAMES,
        }
    }
}

/// Build a catalog step by name
pub fn step(name: &str) -> Option<Box<dyn Step>> {
    let step: Box<dyn Step> = match name {
        "demo-access" => Box::new(DemoAccess),
        "workspace-crud" => Box::new(WorkspaceCrud),
        "content-validation" => Box::new(ContentValidation),
        "segment-crud" => Box::new(SegmentCrud),
        "access-control" => Box::new(AccessControl),
        "profiles" => Box::new(Profiles),
        "persona-generation" => Box::new(PersonaGeneration),
        "strategy-generation" => Box::new(StrategyGeneration),
        "strategy-listing" => Box::new(StrategyListing),
        "strategy-export" => Box::new(StrategyExport),
        "strategy-workflow" => Box::new(StrategyWorkflow),
        "persona-export" => Box::new(PersonaExport),
        "error-handling" => Box::new(ErrorHandling),
        "cleanup" => Box::new(Cleanup),
        _ => return None,
    };
    Some(step)
}

/// Steps of `suite`, optionally narrowed to `only`
///
/// The suite's order is kept whatever order `only` lists names in. A name
/// that is not part of the suite is an error.
pub fn select(suite: Suite, only: &[String]) -> Result<Vec<Box<dyn Step>>> {
    let names = suite.step_names();

    if let Some(unknown) = only.iter().find(|n| !names.contains(&n.as_str())) {
        return Err(Error::unknown_step(unknown, names));
    }

    names
        .iter()
        .filter(|name| only.is_empty() || only.iter().any(|o| o == *name))
        .map(|name| {
            step(name).ok_or_else(|| Error::Internal(format!("suite names missing step '{name}'")))
        })
        .collect()
}

/// String member `key` of an optional JSON object
pub(crate) fn str_field<'a>(value: Option<&'a Value>, key: &str) -> Option<&'a str> {
    value.and_then(|v| v.get(key)).and_then(Value::as_str)
}
