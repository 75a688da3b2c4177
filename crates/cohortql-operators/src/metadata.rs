//! Static operator metadata.
//!
//! Every operator carries one immutable `OperatorDescriptor`. The registry
//! validates trees against it and exports it for tooling.

use serde::Serialize;
use serde_json::Value as Json;

use cohortql_core::types::Literal;

/// How many upstreams an operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KidLimit {
    None,
    One,
    /// One or more.
    Many,
}

impl KidLimit {
    pub fn allows(self, kids: usize) -> bool {
        match self {
            KidLimit::None => kids == 0,
            KidLimit::One => kids == 1,
            KidLimit::Many => kids >= 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Boolean,
}

impl ValueKind {
    /// Numeric literals are accepted where strings are expected; codes such
    /// as `412` are often written unquoted.
    pub fn accepts_literal(self, lit: &Literal) -> bool {
        matches!(
            (self, lit),
            (ValueKind::String, Literal::Str(_) | Literal::Int(_) | Literal::Float(_))
                | (ValueKind::Integer, Literal::Int(_))
                | (ValueKind::Float, Literal::Float(_) | Literal::Int(_))
                | (ValueKind::Boolean, Literal::Bool(_))
        )
    }

    pub fn accepts_json(self, v: &Json) -> bool {
        match self {
            ValueKind::String => v.is_string(),
            ValueKind::Integer => v.is_i64() || v.is_u64(),
            ValueKind::Float => v.is_number(),
            ValueKind::Boolean => v.is_boolean(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ValueKind,
    /// Absorbs every remaining positional value (zero or more).
    pub variadic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionSpec {
    pub name: &'static str,
    pub kind: ValueKind,
}

/// Options every operator understands.
pub const BASE_OPTIONS: &[OptionSpec] = &[OptionSpec {
    name: "label",
    kind: ValueKind::String,
}];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorDescriptor {
    /// Display name.
    pub preferred_name: &'static str,
    /// Name used in statements and the registry.
    pub operation: &'static str,
    pub max_kids: KidLimit,
    pub arguments: &'static [ArgSpec],
    /// Operator-specific options; `BASE_OPTIONS` apply on top.
    pub options: &'static [OptionSpec],
    pub desc: Option<&'static str>,
}

impl OperatorDescriptor {
    pub fn option(&self, name: &str) -> Option<&'static OptionSpec> {
        BASE_OPTIONS
            .iter()
            .chain(self.options.iter())
            .find(|o| o.name == name)
    }

    /// Check positional arguments against `arguments`. Returns a reason on
    /// mismatch.
    pub fn check_arguments(&self, args: &[Literal]) -> Result<(), String> {
        let variadic = self.arguments.last().map(|a| a.variadic).unwrap_or(false);
        let fixed = if variadic {
            self.arguments.len() - 1
        } else {
            self.arguments.len()
        };
        if args.len() < fixed || (!variadic && args.len() > fixed) {
            return Err(format!(
                "'{}' takes {}{} argument(s), got {}",
                self.operation,
                if variadic { "at least " } else { "" },
                fixed,
                args.len()
            ));
        }
        for (i, arg) in args.iter().enumerate() {
            let spec = &self.arguments[i.min(self.arguments.len() - 1)];
            if !spec.kind.accepts_literal(arg) {
                return Err(format!(
                    "argument '{}' of '{}' must be {:?}, got {}",
                    spec.name, self.operation, spec.kind, arg
                ));
            }
        }
        Ok(())
    }

    /// JSON form used by `Registry::to_metadata`, with base options merged in.
    pub fn to_json(&self) -> Json {
        let options: Vec<&OptionSpec> = BASE_OPTIONS.iter().chain(self.options.iter()).collect();
        serde_json::json!({
            "preferred_name": self.preferred_name,
            "operation": self.operation,
            "max_kids": self.max_kids,
            "arguments": self.arguments,
            "options": options,
            "desc": self.desc,
        })
    }
}
