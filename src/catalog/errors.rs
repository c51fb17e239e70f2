//! Error statuses for unknown and malformed identifiers

use async_trait::async_trait;
use uuid::Uuid;

use crate::common::Result;
use crate::testing::{Step, StepEnv};

/// Codes acceptable for an identifier that is not a UUID at all
const MALFORMED_ID_STATUSES: [u16; 3] = [400, 404, 500];

/// Error responses for unknown and malformed identifiers
pub struct ErrorHandling;

#[async_trait]
impl Step for ErrorHandling {
    fn name(&self) -> &'static str {
        "error-handling"
    }

    fn description(&self) -> &'static str {
        "Error handling"
    }

    async fn run(&self, env: &mut StepEnv<'_>) -> Result<bool> {
        let mut ok = true;

        const MISSING: &str = "404 Error Handling";
        let reply = env.api.get(&format!("/segments/{}", Uuid::new_v4())).await;
        if env.expect_status(MISSING, reply, 404).is_some() {
            env.recorder
                .pass(MISSING, "Correctly returned 404 for non-existent segment");
        } else {
            ok = false;
        }

        const MALFORMED: &str = "Invalid UUID Handling";
        let reply = env.api.get("/segments/invalid-uuid").await;
        match env.expect_any_status(MALFORMED, reply, &MALFORMED_ID_STATUSES) {
            Some(response) => env.recorder.pass(
                MALFORMED,
                format!("Correctly handled invalid UUID with status {}", response.status),
            ),
            None => ok = false,
        }

        Ok(ok)
    }
}
