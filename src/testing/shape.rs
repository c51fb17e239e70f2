//! Response shape checks

use serde_json::Value;
use std::fmt;

/// Outcome of checking a JSON value for required members
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Valid,
    Missing(Vec<String>),
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Valid => f.write_str("shape valid"),
            Shape::Missing(fields) => write!(f, "missing fields: [{}]", fields.join(", ")),
        }
    }
}

/// Check that `value` is an object holding every one of `fields`
///
/// Anything other than an object is missing all of them.
pub fn check_fields(value: &Value, fields: &[&str]) -> Shape {
    let missing: Vec<String> = fields
        .iter()
        .filter(|field| value.get(**field).is_none())
        .map(|field| field.to_string())
        .collect();

    if missing.is_empty() {
        Shape::Valid
    } else {
        Shape::Missing(missing)
    }
}

/// Like `check_fields`, for an optional value
pub fn check_optional(value: Option<&Value>, fields: &[&str]) -> Shape {
    match value {
        Some(value) => check_fields(value, fields),
        None => Shape::Missing(fields.iter().map(|f| f.to_string()).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_present() {
        let value = json!({"persona_id": "p", "strategy_type": "pricing", "exported_at": "now"});
        assert_eq!(
            check_fields(&value, &["persona_id", "strategy_type", "exported_at"]),
            Shape::Valid
        );
    }

    #[test]
    fn test_missing_fields_are_named_in_order() {
        let value = json!({"messaging_pillars": []});
        let shape = check_fields(&value, &["messaging_pillars", "tone_of_voice", "objections"]);
        assert_eq!(
            shape,
            Shape::Missing(vec!["tone_of_voice".to_string(), "objections".to_string()])
        );
        assert_eq!(shape.to_string(), "missing fields: [tone_of_voice, objections]");
    }

    #[test]
    fn test_null_member_counts_as_present() {
        let value = json!({"cultureProfileId": null});
        assert_eq!(check_fields(&value, &["cultureProfileId"]), Shape::Valid);
    }

    #[test]
    fn test_non_object_misses_everything() {
        assert_eq!(
            check_fields(&json!([1, 2]), &["strategies"]),
            Shape::Missing(vec!["strategies".to_string()])
        );
        assert_ne!(check_optional(None, &["a", "b"]), Shape::Valid);
    }
}
