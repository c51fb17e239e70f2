//! Segment lifecycle inside a workspace

use async_trait::async_trait;
use tracing::warn;

use crate::common::Result;
use crate::http::ApiResponse;
use crate::testing::{Role, Step, StepEnv};

use super::fixtures::{self, UPDATED_SEGMENT_NAME, VALIDATION_FAILED};
use super::str_field;

/// Create, reject, fetch and rename a segment inside the current workspace
pub struct SegmentCrud;

impl SegmentCrud {
    async fn reject_blocked(env: &mut StepEnv<'_>, workspace_id: &str) -> bool {
        const CHECK: &str = "POST /api/segments (Blocked Terms)";

        let reply = env
            .api
            .post("/segments", Some(fixtures::blocked_segment(workspace_id)))
            .await;
        match reply {
            Ok(response) if response.status == 400 => {
                if response
                    .error_message()
                    .is_some_and(|e| e.contains(VALIDATION_FAILED))
                {
                    env.recorder
                        .pass(CHECK, "Correctly blocked segment with prohibited terms");
                    true
                } else {
                    env.recorder.fail_with(
                        CHECK,
                        "Wrong error message for blocked term",
                        response.payload(),
                    );
                    false
                }
            }
            Ok(response) => {
                env.recorder.fail_with(
                    CHECK,
                    format!(
                        "Should have blocked segment, expected status 400, got {}",
                        response.status
                    ),
                    response.payload(),
                );
                if response.status == 200 {
                    discard_leaked_segment(env, &response).await;
                }
                false
            }
            Err(e) => {
                env.recorder.fail(CHECK, format!("No response: {e}"));
                false
            }
        }
    }
}

async fn discard_leaked_segment(env: &mut StepEnv<'_>, response: &ApiResponse) {
    if let Some(id) = str_field(response.field("segment"), "id") {
        warn!(segment = id, "service accepted a blocked segment, deleting it");
        let _ = env.api.delete(&format!("/segments/{id}")).await;
    }
}

#[async_trait]
impl Step for SegmentCrud {
    fn name(&self) -> &'static str {
        "segment-crud"
    }

    fn description(&self) -> &'static str {
        "Segment CRUD operations"
    }

    async fn run(&self, env: &mut StepEnv<'_>) -> Result<bool> {
        let Some(workspace_id) = env.require(Role::Workspace, "Segment CRUD Setup") else {
            return Ok(false);
        };

        const CREATE: &str = "POST /api/segments (Valid)";
        let body = fixtures::segment(&workspace_id);
        let reply = env.api.post("/segments", Some(body)).await;
        let Some(response) = env.expect_status(CREATE, reply, 200) else {
            return Ok(false);
        };
        let segment = response.field("segment");
        if !env.expect_shape(CREATE, &response, segment, &["id", "name"]) {
            return Ok(false);
        }
        if str_field(segment, "name") != Some(fixtures::SEGMENT_NAME) {
            env.recorder.fail_with(
                CREATE,
                format!("Created segment is not named '{}'", fixtures::SEGMENT_NAME),
                response.payload(),
            );
            return Ok(false);
        }
        let Some(id) = str_field(segment, "id").map(str::to_string) else {
            env.recorder
                .fail_with(CREATE, "Segment id is not a string", response.payload());
            return Ok(false);
        };
        env.context.set_created(Role::Segment, id.as_str());
        env.recorder
            .pass(CREATE, format!("Created segment: {}", fixtures::SEGMENT_NAME));

        let mut ok = Self::reject_blocked(env, &workspace_id).await;

        const FETCH: &str = "GET /api/segments/:id";
        let reply = env.api.get(&format!("/segments/{id}")).await;
        if let Some(response) = env.expect_status(FETCH, reply, 200) {
            let segment = response.field("segment");
            let matches = str_field(segment, "id") == Some(id.as_str())
                && str_field(segment, "name") == Some(fixtures::SEGMENT_NAME);
            if matches {
                env.recorder
                    .pass(FETCH, format!("Retrieved segment: {}", fixtures::SEGMENT_NAME));
            } else {
                env.recorder.fail_with(
                    FETCH,
                    format!("Retrieved segment does not match {id}"),
                    response.payload(),
                );
                ok = false;
            }
        } else {
            ok = false;
        }

        const UPDATE: &str = "PUT /api/segments/:id";
        let reply = env
            .api
            .put(
                &format!("/segments/{id}"),
                fixtures::segment_update(&workspace_id),
            )
            .await;
        if let Some(response) = env.expect_status(UPDATE, reply, 200) {
            if str_field(response.field("segment"), "name") == Some(UPDATED_SEGMENT_NAME) {
                env.recorder.pass(
                    UPDATE,
                    format!("Updated segment name to: {UPDATED_SEGMENT_NAME}"),
                );
            } else {
                env.recorder.fail_with(
                    UPDATE,
                    format!("Response does not carry the new name '{UPDATED_SEGMENT_NAME}'"),
                    response.payload(),
                );
                ok = false;
            }
        } else {
            ok = false;
        }

        Ok(ok)
    }
}
