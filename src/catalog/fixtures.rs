//! Request bodies and expected response members

use serde_json::{json, Value};

/// Substring the service puts in the `error` of a rejected payload
pub const VALIDATION_FAILED: &str = "Content validation failed";

/// Substring of the `message` returned by every successful delete
pub const DELETED: &str = "deleted successfully";

/// Blocked term and a workspace name containing it
pub const BLOCKED_WORKSPACE_NAMES: [(&str, &str); 4] = [
    ("exclude", "Workspace with exclude"),
    ("race", "Workspace about race"),
    ("religion", "Workspace with religion"),
    ("caste", "Caste-based workspace"),
];

/// A strategy type and the members its generated document must carry
#[derive(Debug, Clone, Copy)]
pub struct StrategyKind {
    pub name: &'static str,
    pub required: &'static [&'static str],
    pub highlights: &'static str,
}

pub const STRATEGY_KINDS: [StrategyKind; 3] = [
    StrategyKind {
        name: "positioning",
        required: &[
            "positioning_statement",
            "competitive_frame",
            "elevator_pitch_1s",
            "elevator_pitch_10s",
            "elevator_pitch_30s",
        ],
        highlights: "positioning statement and elevator pitches",
    },
    StrategyKind {
        name: "messaging",
        required: &["messaging_pillars", "tone_of_voice", "objections"],
        highlights: "messaging pillars and tone of voice",
    },
    StrategyKind {
        name: "pricing",
        required: &["pricing_tiers", "payment_options", "monetization_hypotheses"],
        highlights: "pricing tiers and payment options",
    },
];

pub const STRATEGY_EXPORT_FIELDS: [&str; 3] = ["persona_id", "strategy_type", "exported_at"];
pub const EXPORT_ALL_FIELDS: [&str; 3] = ["persona", "strategies", "exported_at"];

pub const PERSONA_EXPORT_SECTIONS: [&str; 5] = [
    "persona",
    "segment",
    "culture_profile",
    "economic_profile",
    "export_metadata",
];
pub const EXPORT_METADATA_FIELDS: [&str; 2] = ["exported_at", "version"];

pub const SEGMENT_NAME: &str = "Tech SMB Owners";
pub const UPDATED_SEGMENT_NAME: &str = "Updated Tech SMB Owners";
pub const CULTURE_LOCALE: &str = "en-IN";
pub const INCOME_BRACKET: &str = "₹1L-₹2L";

pub fn workspace_name(timestamp: i64) -> String {
    format!("Test Workspace {timestamp}")
}

pub fn updated_workspace_name(timestamp: i64) -> String {
    format!("Updated Workspace {timestamp}")
}

pub fn segment(workspace_id: &str) -> Value {
    json!({
        "name": SEGMENT_NAME,
        "workspaceId": workspace_id,
        "frame": "Small business owners in technology sector",
        "product": "Business productivity software",
        "primaryBenefit": "Streamline operations and increase efficiency",
        "reason": "Need to compete with larger companies while managing costs",
        "context": "Growing tech SMB market in India with high price sensitivity",
        "values": ["efficiency", "growth", "frugality"],
        "emotions": ["confidence", "excitement"],
        "fears": ["complexity", "hidden_costs"],
        "evidence": "Market research shows 70% adoption rate among price-sensitive SMBs",
        "notes": "Focus on cost-effective solutions and transparent pricing"
    })
}

pub fn blocked_segment(workspace_id: &str) -> Value {
    json!({
        "name": "Exclude certain groups",
        "workspaceId": workspace_id,
        "context": "We want to exclude people based on race"
    })
}

pub fn segment_update(workspace_id: &str) -> Value {
    json!({
        "name": UPDATED_SEGMENT_NAME,
        "workspaceId": workspace_id,
        "primaryBenefit": "Enhanced productivity and growth"
    })
}

pub fn culture_profile(segment_id: &str) -> Value {
    json!({
        "segmentId": segment_id,
        "locale": CULTURE_LOCALE,
        "communicationStyle": "low_context",
        "formalityNorm": "mixed",
        "languages": ["English", "Hindi"],
        "region": "Mumbai",
        "deviceChannelPrefs": {
            "whatsapp_preferred": true,
            "android_share_high": true
        }
    })
}

pub fn economic_profile(segment_id: &str) -> Value {
    json!({
        "segmentId": segment_id,
        "incomeBracket": INCOME_BRACKET,
        "profession": "SME_owner",
        "priceSensitivity": "high",
        "paymentBehaviour": {
            "upi_preferred": true,
            "credit_card": false,
            "emi_friendly": true,
            "subscription_aversion": false
        },
        "financialGoals": ["business_growth", "cost_optimization"],
        "constraints": ["limited_budget", "cash_flow_management"]
    })
}

/// Profile ids are sent as null when the run has none
pub fn persona_request(
    segment_id: &str,
    culture_profile_id: Option<&str>,
    economic_profile_id: Option<&str>,
) -> Value {
    json!({
        "segmentId": segment_id,
        "cultureProfileId": culture_profile_id,
        "economicProfileId": economic_profile_id
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_names_contain_their_term() {
        for (term, name) in BLOCKED_WORKSPACE_NAMES {
            assert!(name.to_lowercase().contains(term), "{name} lacks {term}");
        }
    }

    #[test]
    fn test_persona_request_nulls_missing_profiles() {
        let body = persona_request("seg-1", Some("cp-1"), None);
        assert_eq!(body["segmentId"], "seg-1");
        assert_eq!(body["cultureProfileId"], "cp-1");
        assert!(body["economicProfileId"].is_null());
    }
}
