//! Validated node options.
//!
//! Raw option maps arrive from statements with keys in whatever spelling the
//! author used (`:label`, `Label`, `some-key`). Keys are normalized deeply and
//! then checked against the operator's declared options.

use serde_json::{Map, Value as Json};

use cohortql_core::error::{Error, Result};

use crate::metadata::OperatorDescriptor;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeOptions {
    pub label: Option<String>,
}

/// Strip a leading `:`, turn `-` into `_`, lowercase.
pub fn normalize_key(key: &str) -> String {
    key.trim_start_matches(':').replace('-', "_").to_lowercase()
}

/// Normalize every mapping key in `value`, recursing through nested mappings
/// and sequences.
pub fn normalize_keys(value: Json) -> Json {
    match value {
        Json::Object(map) => Json::Object(
            map.into_iter()
                .map(|(k, v)| (normalize_key(&k), normalize_keys(v)))
                .collect(),
        ),
        Json::Array(items) => Json::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

impl NodeOptions {
    /// Normalize `raw` and validate it against `desc`.
    pub fn from_map(raw: Map<String, Json>, desc: &OperatorDescriptor) -> Result<Self> {
        let mut opts = NodeOptions::default();
        for (key, value) in raw {
            let key = normalize_key(&key);
            let value = normalize_keys(value);
            let spec = desc.option(&key).ok_or_else(|| {
                Error::MalformedTree(format!(
                    "unknown option '{key}' for operator '{}'",
                    desc.operation
                ))
            })?;
            if value.is_null() {
                continue;
            }
            if !spec.kind.accepts_json(&value) {
                return Err(Error::MalformedTree(format!(
                    "option '{key}' of '{}' must be {:?}, got {value}",
                    desc.operation, spec.kind
                )));
            }
            if key == "label" {
                opts.label = value.as_str().map(str::to_string);
            }
        }
        Ok(opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::KidLimit;
    use serde_json::json;

    const DESC: OperatorDescriptor = OperatorDescriptor {
        preferred_name: "Test",
        operation: "test",
        max_kids: KidLimit::None,
        arguments: &[],
        options: &[],
        desc: None,
    };

    fn map(v: Json) -> Map<String, Json> {
        match v {
            Json::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn normalizes_nested_keys() {
        let v = normalize_keys(json!({":Outer-Key": {"Inner-Key": [ {":X": 1} ]}}));
        assert_eq!(v, json!({"outer_key": {"inner_key": [ {"x": 1} ]}}));
    }

    #[test]
    fn accepts_label_in_any_spelling() {
        let opts = NodeOptions::from_map(map(json!({":LABEL": "heart attack"})), &DESC).unwrap();
        assert_eq!(opts.label.as_deref(), Some("heart attack"));
    }

    #[test]
    fn rejects_unknown_and_mistyped_options() {
        assert!(matches!(
            NodeOptions::from_map(map(json!({"colour": "red"})), &DESC),
            Err(Error::MalformedTree(_))
        ));
        assert!(matches!(
            NodeOptions::from_map(map(json!({"label": 3})), &DESC),
            Err(Error::MalformedTree(_))
        ));
    }
}
