//! Teardown of resources the run created

use async_trait::async_trait;
use tracing::info;

use crate::common::Result;
use crate::testing::{Role, Step, StepEnv};

use super::fixtures::DELETED;

/// Deletion order: children before their parents
const TEARDOWN: [(Role, &str, &str); 3] = [
    (Role::Persona, "/personas", "DELETE /api/personas/:id"),
    (Role::Segment, "/segments", "DELETE /api/segments/:id"),
    (Role::Workspace, "/workspaces", "DELETE /api/workspaces/:id"),
];

/// Delete what this run created
///
/// Resources the run only adopted are left alone. A failed deletion is
/// recorded and the remaining ones are still attempted.
pub struct Cleanup;

#[async_trait]
impl Step for Cleanup {
    fn name(&self) -> &'static str {
        "cleanup"
    }

    fn description(&self) -> &'static str {
        "Cleaning up test data"
    }

    async fn run(&self, env: &mut StepEnv<'_>) -> Result<bool> {
        let mut ok = true;
        let mut attempted = 0;

        for (role, collection, check) in TEARDOWN {
            if !env.context.is_created(role) {
                continue;
            }
            let Some(id) = env.context.get(role).map(str::to_string) else {
                continue;
            };
            attempted += 1;

            let reply = env.api.delete(&format!("{collection}/{id}")).await;
            let Some(response) = env.expect_status(check, reply, 200) else {
                ok = false;
                continue;
            };

            let confirmed = response
                .field("message")
                .and_then(|m| m.as_str())
                .is_some_and(|m| m.contains(DELETED));
            if confirmed {
                env.context.remove(role);
                env.recorder.pass(check, format!("Deleted {role} {id}"));
            } else {
                env.recorder.fail_with(
                    check,
                    format!("Delete response does not confirm '{DELETED}'"),
                    response.payload(),
                );
                ok = false;
            }
        }

        if attempted == 0 {
            info!("nothing created by this run, skipping cleanup");
        }
        Ok(ok)
    }
}
