//! Persona generation and export

use async_trait::async_trait;
use serde_json::Value;

use crate::common::Result;
use crate::testing::{Role, Step, StepEnv};

use super::fixtures::{self, EXPORT_METADATA_FIELDS, PERSONA_EXPORT_SECTIONS};
use super::str_field;

/// Generate a persona from the current segment and any profiles the run holds
pub struct PersonaGeneration;

#[async_trait]
impl Step for PersonaGeneration {
    fn name(&self) -> &'static str {
        "persona-generation"
    }

    fn description(&self) -> &'static str {
        "Persona generation"
    }

    async fn run(&self, env: &mut StepEnv<'_>) -> Result<bool> {
        const CHECK: &str = "POST /api/personas/generate";

        let Some(segment_id) = env.require(Role::Segment, "Persona Operations Setup") else {
            return Ok(false);
        };
        let body = fixtures::persona_request(
            &segment_id,
            env.context.get(Role::CultureProfile),
            env.context.get(Role::EconomicProfile),
        );

        let reply = env.api.post("/personas/generate", Some(body)).await;
        let Some(response) = env.expect_status(CHECK, reply, 200) else {
            return Ok(false);
        };
        let persona = response.field("persona");
        if !env.expect_shape(CHECK, &response, persona, &["id", "name"]) {
            return Ok(false);
        }
        let (Some(id), Some(name)) = (str_field(persona, "id"), str_field(persona, "name")) else {
            env.recorder
                .fail_with(CHECK, "Persona id or name is not a string", response.payload());
            return Ok(false);
        };

        env.context.set_created(Role::Persona, id);
        env.recorder.pass(CHECK, format!("Generated persona: {name}"));
        Ok(true)
    }
}

/// Export the current persona with everything it was built from
pub struct PersonaExport;

#[async_trait]
impl Step for PersonaExport {
    fn name(&self) -> &'static str {
        "persona-export"
    }

    fn description(&self) -> &'static str {
        "Persona export"
    }

    async fn run(&self, env: &mut StepEnv<'_>) -> Result<bool> {
        const CHECK: &str = "GET /api/personas/export";

        let Some(persona_id) = env.require(Role::Persona, "Persona Export Setup") else {
            return Ok(false);
        };

        let reply = env.api.get(&format!("/personas/{persona_id}/export")).await;
        let Some(response) = env.expect_status(CHECK, reply, 200) else {
            return Ok(false);
        };
        if !env.expect_shape(CHECK, &response, response.json(), &PERSONA_EXPORT_SECTIONS) {
            return Ok(false);
        }

        let complete = response
            .field("export_metadata")
            .and_then(Value::as_object)
            .is_some_and(|m| EXPORT_METADATA_FIELDS.iter().all(|f| m.contains_key(*f)));
        if !complete {
            env.recorder
                .fail_with(CHECK, "Export metadata incomplete", response.payload());
            return Ok(false);
        }

        env.recorder.pass(
            CHECK,
            "Exported persona with all required sections and metadata",
        );
        Ok(true)
    }
}
