//! Go-to-market strategies generated for a persona
//!
//! Generation, listing and export all hang off the current persona. The
//! workflow step regenerates pricing and messaging once more and reports
//! what the documents say about the persona they were generated for; those
//! observations never fail the step.

use async_trait::async_trait;
use serde_json::Value;

use crate::common::Result;
use crate::http::ApiResponse;
use crate::testing::{Role, Step, StepEnv};

use super::fixtures::{StrategyKind, EXPORT_ALL_FIELDS, STRATEGY_EXPORT_FIELDS, STRATEGY_KINDS};

fn generate_path(persona_id: &str, kind: &str) -> String {
    format!("/personas/{persona_id}/strategies/{kind}/generate")
}

/// Whether any payment option mentions UPI
fn offers_upi(strategy: &Value) -> bool {
    strategy
        .get("payment_options")
        .and_then(Value::as_array)
        .is_some_and(|options| options.iter().any(|o| o.to_string().contains("UPI")))
}

/// Whether any pricing tier reads as an entry-level, cost-focused offer
fn has_cost_focused_tier(strategy: &Value) -> bool {
    let Some(tiers) = strategy.get("pricing_tiers").and_then(Value::as_array) else {
        return false;
    };
    tiers.iter().any(|tier| {
        let name = tier.get("name").and_then(Value::as_str).unwrap_or_default();
        let text = tier.to_string().to_lowercase();
        name.contains("Starter") || text.contains("cost") || text.contains("affordable")
    })
}

fn has_pricing_tiers(strategy: &Value) -> bool {
    strategy
        .get("pricing_tiers")
        .and_then(Value::as_array)
        .is_some_and(|tiers| !tiers.is_empty())
}

fn has_direct_tone(strategy: &Value) -> bool {
    strategy
        .get("tone_of_voice")
        .is_some_and(|tone| tone.to_string().to_lowercase().contains("direct"))
}

/// Generate each strategy type and check its required members
pub struct StrategyGeneration;

impl StrategyGeneration {
    async fn generate(env: &mut StepEnv<'_>, persona_id: &str, kind: &StrategyKind) -> bool {
        let check = format!("POST /api/personas/strategies/{}/generate", kind.name);

        let reply = env.api.post(&generate_path(persona_id, kind.name), None).await;
        let Some(response) = env.expect_status(&check, reply, 200) else {
            return false;
        };
        let strategy = response.field("strategy");
        if !env.expect_shape(&check, &response, strategy, kind.required) {
            return false;
        }

        let upi = kind.name == "pricing"
            && strategy.is_some_and(|s| has_pricing_tiers(s) && offers_upi(s));
        let message = if upi {
            format!(
                "Generated {} strategy with UPI payment options (matching persona preferences)",
                kind.name
            )
        } else {
            format!("Generated {} strategy with {}", kind.name, kind.highlights)
        };
        env.recorder.pass(check, message);
        true
    }
}

#[async_trait]
impl Step for StrategyGeneration {
    fn name(&self) -> &'static str {
        "strategy-generation"
    }

    fn description(&self) -> &'static str {
        "Strategy generation"
    }

    async fn run(&self, env: &mut StepEnv<'_>) -> Result<bool> {
        let Some(persona_id) = env.require(Role::Persona, "Strategy Generation Setup") else {
            return Ok(false);
        };

        let mut generated = 0;
        for kind in &STRATEGY_KINDS {
            if Self::generate(env, &persona_id, kind).await {
                generated += 1;
            }
        }
        Ok(generated == STRATEGY_KINDS.len())
    }
}

/// List every strategy stored for the persona
pub struct StrategyListing;

#[async_trait]
impl Step for StrategyListing {
    fn name(&self) -> &'static str {
        "strategy-listing"
    }

    fn description(&self) -> &'static str {
        "Strategy listing"
    }

    async fn run(&self, env: &mut StepEnv<'_>) -> Result<bool> {
        const CHECK: &str = "GET /api/personas/strategies";

        let Some(persona_id) = env.require(Role::Persona, "Get All Strategies Setup") else {
            return Ok(false);
        };

        let reply = env.api.get(&format!("/personas/{persona_id}/strategies")).await;
        let Some(response) = env.expect_status(CHECK, reply, 200) else {
            return Ok(false);
        };
        if !env.expect_shape(CHECK, &response, response.json(), &["strategies"]) {
            return Ok(false);
        }

        // The listing may legitimately be partial before generation has run
        let stored = response.field("strategies");
        let complete = STRATEGY_KINDS
            .iter()
            .all(|kind| stored.and_then(|s| s.get(kind.name)).is_some());
        let message = if complete {
            "Retrieved all strategy types"
        } else {
            "Retrieved strategies structure (may be empty initially)"
        };
        env.recorder.pass(CHECK, message);
        Ok(true)
    }
}

/// Export each strategy type, then everything at once
pub struct StrategyExport;

#[async_trait]
impl Step for StrategyExport {
    fn name(&self) -> &'static str {
        "strategy-export"
    }

    fn description(&self) -> &'static str {
        "Strategy export"
    }

    async fn run(&self, env: &mut StepEnv<'_>) -> Result<bool> {
        let Some(persona_id) = env.require(Role::Persona, "Strategy Export Setup") else {
            return Ok(false);
        };

        let mut ok = true;
        for kind in &STRATEGY_KINDS {
            let check = format!("GET /api/personas/strategies/{}/export", kind.name);
            let reply = env
                .api
                .get(&format!("/personas/{persona_id}/strategies/{}/export", kind.name))
                .await;
            let exported = match env.expect_status(&check, reply, 200) {
                Some(response) => {
                    env.expect_shape(&check, &response, response.json(), &STRATEGY_EXPORT_FIELDS)
                }
                None => false,
            };
            if exported {
                env.recorder.pass(
                    check,
                    format!("Exported {} strategy with metadata", kind.name),
                );
            } else {
                ok = false;
            }
        }

        const ALL: &str = "GET /api/personas/strategies/export-all";
        let reply = env
            .api
            .get(&format!("/personas/{persona_id}/strategies/export-all"))
            .await;
        let exported = match env.expect_status(ALL, reply, 200) {
            Some(response) => {
                env.expect_shape(ALL, &response, response.json(), &EXPORT_ALL_FIELDS)
            }
            None => false,
        };
        if exported {
            env.recorder
                .pass(ALL, "Exported all strategies with complete persona data");
        } else {
            ok = false;
        }

        Ok(ok)
    }
}

/// Segment to persona to strategy pipeline, end to end
pub struct StrategyWorkflow;

impl StrategyWorkflow {
    /// Regenerate one strategy for the workflow, recording a failure on error
    async fn regenerate(
        env: &mut StepEnv<'_>,
        check: &str,
        persona_id: &str,
        kind: &str,
    ) -> Option<Value> {
        let reply = env.api.post(&generate_path(persona_id, kind), None).await;
        let response: ApiResponse = env.expect_status(check, reply, 200)?;
        Some(response.field("strategy").cloned().unwrap_or(Value::Null))
    }
}

#[async_trait]
impl Step for StrategyWorkflow {
    fn name(&self) -> &'static str {
        "strategy-workflow"
    }

    fn description(&self) -> &'static str {
        "End-to-end strategy workflow"
    }

    async fn run(&self, env: &mut StepEnv<'_>) -> Result<bool> {
        let mut trail: Vec<String> = Vec::new();

        let prerequisites = [
            (Role::Segment, "E2E Workflow - Segment", "Segment created"),
            (
                Role::CultureProfile,
                "E2E Workflow - Culture Profile",
                "Culture profile created",
            ),
            (
                Role::EconomicProfile,
                "E2E Workflow - Economic Profile",
                "Economic profile created",
            ),
            (Role::Persona, "E2E Workflow - Persona", "Persona generated"),
        ];
        let mut persona_id = String::new();
        for (role, check, done) in prerequisites {
            let Some(id) = env.require(role, check) else {
                return Ok(false);
            };
            trail.push(done.to_string());
            if role == Role::Persona {
                persona_id = id;
            }
        }

        let Some(pricing) =
            Self::regenerate(env, "E2E Workflow - Pricing Strategy", &persona_id, "pricing").await
        else {
            return Ok(false);
        };
        let pricing_note = if has_cost_focused_tier(&pricing) {
            "Cost-focused pricing strategy generated"
        } else if has_pricing_tiers(&pricing) {
            "Pricing strategy generated (general)"
        } else {
            "Pricing strategy generated but no tiers found"
        };
        trail.push(pricing_note.to_string());

        let Some(messaging) =
            Self::regenerate(env, "E2E Workflow - Messaging Strategy", &persona_id, "messaging")
                .await
        else {
            return Ok(false);
        };
        let messaging_note = if has_direct_tone(&messaging) {
            "Direct messaging strategy generated (low-context)"
        } else {
            "Messaging strategy generated"
        };
        trail.push(messaging_note.to_string());

        // Payment options come from the pricing document generated above
        let upi_note = if offers_upi(&pricing) {
            "UPI payment option included (matching persona preference)"
        } else {
            "Payment options generated but UPI not explicitly found"
        };
        trail.push(upi_note.to_string());

        env.recorder.pass(
            "End-to-End Strategy Workflow",
            format!("Complete workflow executed: {}", trail.join(" → ")),
        );
        Ok(true)
    }
}
