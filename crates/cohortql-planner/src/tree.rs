//! YAML value → `QueryNode`.
//!
//! An operator is a mapping with exactly one key naming a registered
//! operator. Its value lists the positional values: a sequence, a single
//! value, or `null`/`true`/`[]` for none. Inside that list a single-key
//! mapping naming an operator is a child node, a trailing mapping of anything
//! else is the option map, and scalars are arguments.

use serde_json::{Map, Value as Json};
use serde_yaml::{Mapping, Value as Yaml};

use cohortql_core::types::Literal;
use cohortql_operators::{QueryNode, Registry, Value};

use crate::error::PlanError;

pub fn build_tree(value: &Yaml, registry: &Registry) -> Result<QueryNode, PlanError> {
    let map = value.as_mapping().ok_or_else(|| {
        PlanError::Statement(format!("expected an operator mapping, got {}", describe(value)))
    })?;
    let (name, operand) = operator_entry(map, registry).ok_or_else(|| {
        PlanError::Statement(format!(
            "expected a mapping with one operator key, got keys {:?}",
            map.keys().map(describe).collect::<Vec<_>>()
        ))
    })?;

    let values = positional(operand)
        .iter()
        .map(|v| to_value(v, registry))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(registry.create(name, values)?)
}

/// `Some((name, operand))` when `map` is a single-key mapping whose key is a
/// registered operator.
fn operator_entry<'a>(map: &'a Mapping, registry: &Registry) -> Option<(&'a str, &'a Yaml)> {
    if map.len() != 1 {
        return None;
    }
    let (key, operand) = map.iter().next()?;
    let name = key.as_str()?;
    registry.contains(name).then_some((name, operand))
}

fn positional(operand: &Yaml) -> Vec<&Yaml> {
    match operand {
        Yaml::Null | Yaml::Bool(true) => Vec::new(),
        Yaml::Sequence(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn to_value(v: &Yaml, registry: &Registry) -> Result<Value, PlanError> {
    Ok(match v {
        Yaml::Mapping(map) if operator_entry(map, registry).is_some() => {
            Value::Node(build_tree(v, registry)?)
        }
        Yaml::Mapping(_) => match serde_json::to_value(v)? {
            Json::Object(map) => Value::Options(map),
            _ => Value::Options(Map::new()),
        },
        Yaml::String(s) => Value::Literal(Literal::Str(s.clone())),
        Yaml::Bool(b) => Value::Literal(Literal::Bool(*b)),
        Yaml::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Value::Literal(Literal::Int(i)),
            (None, Some(f)) => Value::Literal(Literal::Float(f)),
            (None, None) => return Err(PlanError::Statement(format!("unsupported number {n}"))),
        },
        Yaml::Tagged(tagged) => to_value(&tagged.value, registry)?,
        Yaml::Null | Yaml::Sequence(_) => {
            return Err(PlanError::Statement(format!(
                "{} is not a valid operator value",
                describe(v)
            )))
        }
    })
}

fn describe(v: &Yaml) -> String {
    match v {
        Yaml::Null => "null".into(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        Yaml::String(s) => format!("'{s}'"),
        Yaml::Sequence(_) => "a sequence".into(),
        Yaml::Mapping(_) => "a mapping".into(),
        Yaml::Tagged(t) => format!("tagged value {}", t.tag),
    }
}
