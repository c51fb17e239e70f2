//! Culture and economic profiles attached to a segment

use async_trait::async_trait;
use serde_json::Value;

use crate::common::Result;
use crate::testing::{Role, Step, StepEnv};

use super::fixtures::{self, CULTURE_LOCALE, INCOME_BRACKET};
use super::str_field;

/// A profile collection, the member it must echo and the role it fills
struct ProfileKind {
    check: &'static str,
    path: &'static str,
    echoed: &'static str,
    expected: &'static str,
    role: Role,
    body: fn(&str) -> Value,
}

const CULTURE: ProfileKind = ProfileKind {
    check: "POST /api/culture-profiles",
    path: "/culture-profiles",
    echoed: "locale",
    expected: CULTURE_LOCALE,
    role: Role::CultureProfile,
    body: fixtures::culture_profile,
};

const ECONOMIC: ProfileKind = ProfileKind {
    check: "POST /api/economic-profiles",
    path: "/economic-profiles",
    echoed: "incomeBracket",
    expected: INCOME_BRACKET,
    role: Role::EconomicProfile,
    body: fixtures::economic_profile,
};

async fn create_profile(env: &mut StepEnv<'_>, kind: &ProfileKind, segment_id: &str) -> bool {
    let reply = env
        .api
        .post(kind.path, Some((kind.body)(segment_id)))
        .await;
    let Some(response) = env.expect_status(kind.check, reply, 200) else {
        return false;
    };

    let profile = response.field("profile");
    if !env.expect_shape(kind.check, &response, profile, &["id", kind.echoed]) {
        return false;
    }
    if str_field(profile, kind.echoed) != Some(kind.expected) {
        env.recorder.fail_with(
            kind.check,
            format!("Profile {} is not '{}'", kind.echoed, kind.expected),
            response.payload(),
        );
        return false;
    }
    let Some(id) = str_field(profile, "id") else {
        env.recorder
            .fail_with(kind.check, "Profile id is not a string", response.payload());
        return false;
    };

    env.context.set_created(kind.role, id);
    env.recorder.pass(
        kind.check,
        format!("Created {} with {}: {}", kind.role, kind.echoed, kind.expected),
    );
    true
}

/// Create one profile of each kind for the current segment
pub struct Profiles;

#[async_trait]
impl Step for Profiles {
    fn name(&self) -> &'static str {
        "profiles"
    }

    fn description(&self) -> &'static str {
        "Culture and economic profiles"
    }

    async fn run(&self, env: &mut StepEnv<'_>) -> Result<bool> {
        let Some(segment_id) = env.require(Role::Segment, "Profile Operations Setup") else {
            return Ok(false);
        };

        // The economic profile is attempted even when the culture profile fails
        let culture = create_profile(env, &CULTURE, &segment_id).await;
        let economic = create_profile(env, &ECONOMIC, &segment_id).await;

        Ok(culture && economic)
    }
}
