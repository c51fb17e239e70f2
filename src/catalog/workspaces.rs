//! Workspace listing, lifecycle, content validation and access control

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use crate::common::{unix_timestamp, Result};
use crate::http::ApiResponse;
use crate::testing::{Role, Step, StepEnv};

use super::fixtures::{self, BLOCKED_WORKSPACE_NAMES, VALIDATION_FAILED};
use super::str_field;

/// The workspace list of a 200 response, or a recorded failure
fn workspace_list<'r>(
    env: &mut StepEnv<'_>,
    check: &str,
    response: &'r ApiResponse,
) -> Option<&'r Vec<Value>> {
    let list = response.field("workspaces").and_then(Value::as_array);
    if list.is_none() {
        env.recorder.fail_with(
            check,
            "Invalid response structure, workspaces is not a list",
            response.payload(),
        );
    }
    list
}

/// Adopt the first listed workspace when the run holds none yet
fn adopt_first(env: &mut StepEnv<'_>, workspaces: &[Value]) {
    if env.context.get(Role::Workspace).is_some() {
        return;
    }
    if let Some(id) = str_field(workspaces.first(), "id") {
        env.context.set(Role::Workspace, id);
    }
}

/// Best-effort removal of a workspace the service should have rejected
async fn discard_leaked_workspace(env: &mut StepEnv<'_>, response: &ApiResponse) {
    if let Some(id) = str_field(response.field("workspace"), "id") {
        warn!(workspace = id, "service accepted a blocked name, deleting it");
        let _ = env.api.delete(&format!("/workspaces/{id}")).await;
    }
}

/// Unauthenticated access through the demo flag
pub struct DemoAccess;

#[async_trait]
impl Step for DemoAccess {
    fn name(&self) -> &'static str {
        "demo-access"
    }

    fn description(&self) -> &'static str {
        "Demo mode access"
    }

    async fn run(&self, env: &mut StepEnv<'_>) -> Result<bool> {
        const CHECK: &str = "Demo Mode Authentication";

        let reply = env.api.get("/workspaces").await;
        let Some(response) = env.expect_status(CHECK, reply, 200) else {
            return Ok(false);
        };
        let Some(workspaces) = workspace_list(env, CHECK, &response) else {
            return Ok(false);
        };

        adopt_first(env, workspaces);
        env.recorder.pass(
            CHECK,
            format!(
                "Authenticated in demo mode, found {} workspaces",
                workspaces.len()
            ),
        );
        Ok(true)
    }
}

/// List, create, look up, reject and rename a workspace
pub struct WorkspaceCrud;

#[async_trait]
impl Step for WorkspaceCrud {
    fn name(&self) -> &'static str {
        "workspace-crud"
    }

    fn description(&self) -> &'static str {
        "Workspace CRUD operations"
    }

    async fn run(&self, env: &mut StepEnv<'_>) -> Result<bool> {
        // Listing
        const LIST: &str = "GET /api/workspaces";
        let reply = env.api.get("/workspaces").await;
        let Some(response) = env.expect_status(LIST, reply, 200) else {
            return Ok(false);
        };
        let Some(workspaces) = workspace_list(env, LIST, &response) else {
            return Ok(false);
        };
        adopt_first(env, workspaces);
        env.recorder
            .pass(LIST, format!("Retrieved {} workspaces", workspaces.len()));

        // Creation
        const CREATE: &str = "POST /api/workspaces (Valid)";
        let name = fixtures::workspace_name(unix_timestamp());
        let reply = env.api.post("/workspaces", Some(json!({ "name": name }))).await;
        let Some(response) = env.expect_status(CREATE, reply, 200) else {
            return Ok(false);
        };
        let workspace = response.field("workspace");
        if !env.expect_shape(CREATE, &response, workspace, &["id", "name"]) {
            return Ok(false);
        }
        let echoed = str_field(workspace, "name").unwrap_or_default();
        if echoed != name {
            env.recorder.fail_with(
                CREATE,
                format!("Created workspace is named '{echoed}', expected '{name}'"),
                response.payload(),
            );
            return Ok(false);
        }
        let Some(id) = str_field(workspace, "id").map(str::to_string) else {
            env.recorder
                .fail_with(CREATE, "Workspace id is not a string", response.payload());
            return Ok(false);
        };
        env.context.set_created(Role::Workspace, id.as_str());
        env.recorder.pass(CREATE, format!("Created workspace: {name}"));

        let mut ok = true;

        // Lookup by the generated id
        const LOOKUP: &str = "Workspace Lookup by ID";
        let reply = env.api.get("/workspaces").await;
        if let Some(response) = env.expect_status(LOOKUP, reply, 200) {
            let listed = response
                .field("workspaces")
                .and_then(Value::as_array)
                .and_then(|list| {
                    list.iter()
                        .find(|w| str_field(Some(*w), "id") == Some(id.as_str()))
                });
            match str_field(listed, "name") {
                Some(found) if found == name => env
                    .recorder
                    .pass(LOOKUP, format!("Workspace {id} is listed as '{found}'")),
                Some(found) => {
                    env.recorder.fail(
                        LOOKUP,
                        format!("Workspace {id} is listed as '{found}', expected '{name}'"),
                    );
                    ok = false;
                }
                None => {
                    env.recorder.fail_with(
                        LOOKUP,
                        format!("Workspace {id} is not in the listing"),
                        response.payload(),
                    );
                    ok = false;
                }
            }
        } else {
            ok = false;
        }

        // Rejection of an empty name
        const EMPTY: &str = "POST /api/workspaces (Invalid - Empty Name)";
        let reply = env.api.post("/workspaces", Some(json!({ "name": "" }))).await;
        if env.expect_status(EMPTY, reply, 400).is_some() {
            env.recorder.pass(EMPTY, "Correctly rejected empty workspace name");
        } else {
            ok = false;
        }

        // Rename
        const UPDATE: &str = "PUT /api/workspaces/:id";
        let new_name = fixtures::updated_workspace_name(unix_timestamp());
        let reply = env
            .api
            .put(&format!("/workspaces/{id}"), json!({ "name": new_name }))
            .await;
        if let Some(response) = env.expect_status(UPDATE, reply, 200) {
            match str_field(response.field("workspace"), "name") {
                Some(renamed) if renamed == new_name => env
                    .recorder
                    .pass(UPDATE, format!("Updated workspace name to: {renamed}")),
                _ => {
                    env.recorder.fail_with(
                        UPDATE,
                        format!("Response does not carry the new name '{new_name}'"),
                        response.payload(),
                    );
                    ok = false;
                }
            }
        } else {
            ok = false;
        }

        Ok(ok)
    }
}

/// Workspace names containing blocked terms are refused
pub struct ContentValidation;

#[async_trait]
impl Step for ContentValidation {
    fn name(&self) -> &'static str {
        "content-validation"
    }

    fn description(&self) -> &'static str {
        "Content validation"
    }

    async fn run(&self, env: &mut StepEnv<'_>) -> Result<bool> {
        let mut blocked = 0;

        for (term, name) in BLOCKED_WORKSPACE_NAMES {
            let check = format!("Blocked Term Validation ({term})");
            let reply = env.api.post("/workspaces", Some(json!({ "name": name }))).await;

            match reply {
                Ok(response) if response.status == 400 => {
                    match response.error_message() {
                        Some(error) if error.contains(VALIDATION_FAILED) => {
                            env.recorder.pass(
                                check,
                                format!("Correctly blocked workspace name containing '{term}'"),
                            );
                            blocked += 1;
                        }
                        _ => env.recorder.fail_with(
                            check,
                            format!(
                                "Wrong error message for blocked term, expected '{VALIDATION_FAILED}'"
                            ),
                            response.payload(),
                        ),
                    }
                }
                Ok(response) => {
                    env.recorder.fail_with(
                        check,
                        format!(
                            "Should have blocked term '{term}', expected status 400, got {}",
                            response.status
                        ),
                        response.payload(),
                    );
                    if response.status == 200 {
                        discard_leaked_workspace(env, &response).await;
                    }
                }
                Err(e) => env.recorder.fail(check, format!("No response: {e}")),
            }
        }

        Ok(blocked == BLOCKED_WORKSPACE_NAMES.len())
    }
}

/// Nested collections are only visible inside accessible workspaces
pub struct AccessControl;

#[async_trait]
impl Step for AccessControl {
    fn name(&self) -> &'static str {
        "access-control"
    }

    fn description(&self) -> &'static str {
        "Permissions system"
    }

    async fn run(&self, env: &mut StepEnv<'_>) -> Result<bool> {
        let mut ok = true;

        const FOREIGN: &str = "Workspace Access Control";
        let unknown = Uuid::new_v4();
        let reply = env.api.get(&format!("/workspaces/{unknown}/segments")).await;
        if env.expect_status(FOREIGN, reply, 403).is_some() {
            env.recorder
                .pass(FOREIGN, "Correctly denied access to non-accessible workspace");
        } else {
            ok = false;
        }

        const OWNED: &str = "Segment Access Permissions";
        let Some(workspace_id) = env.require(Role::Workspace, OWNED) else {
            return Ok(false);
        };
        let reply = env
            .api
            .get(&format!("/workspaces/{workspace_id}/segments"))
            .await;
        let Some(response) = env.expect_status(OWNED, reply, 200) else {
            return Ok(false);
        };
        if !env.expect_shape(OWNED, &response, response.json(), &["segments"]) {
            return Ok(false);
        }
        env.recorder
            .pass(OWNED, "Successfully accessed segments in owned workspace");

        Ok(ok)
    }
}
