//! Operator registry: an explicit map from operator name to factory.
//!
//! `create` is the only way trees get built from untyped input. It sorts the
//! given values into upstream nodes, literal arguments and a trailing option
//! map, and validates all three against the operator's descriptor before any
//! node exists.

use std::cell::Cell;
use std::collections::BTreeMap;

use serde_json::{Map, Value as Json};

use cohortql_core::error::{Error, Result};
use cohortql_core::id::NodeId;
use cohortql_core::types::{CriterionType, Literal};

use crate::materialize::{Materialize, MATERIALIZE};
use crate::metadata::OperatorDescriptor;
use crate::node::QueryNode;
use crate::options::NodeOptions;
use crate::source::{descriptor_for, Source};
use crate::traits::Operator;
use crate::union::{Union, UNION};

/// Builds an operator from its validated positional arguments.
pub type Factory = Box<dyn Fn(&[Literal]) -> Result<Box<dyn Operator>>>;

/// One positional value handed to `Registry::create`.
#[derive(Debug)]
pub enum Value {
    Node(QueryNode),
    Literal(Literal),
    /// Only valid as the last value.
    Options(Map<String, Json>),
}

impl From<QueryNode> for Value {
    fn from(n: QueryNode) -> Self {
        Value::Node(n)
    }
}

impl From<Literal> for Value {
    fn from(l: Literal) -> Self {
        Value::Literal(l)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Literal(Literal::Str(s.to_string()))
    }
}

struct Entry {
    descriptor: &'static OperatorDescriptor,
    factory: Factory,
}

pub struct Registry {
    entries: BTreeMap<&'static str, Entry>,
    next_id: Cell<u64>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl Registry {
    /// A registry with no operators.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: Cell::new(0),
        }
    }

    /// Every source table plus `union` and `materialize`.
    pub fn with_builtins() -> Self {
        let mut reg = Self::empty();
        for ty in CriterionType::ALL {
            reg.register(
                descriptor_for(ty),
                Box::new(move |args: &[Literal]| Ok(Box::new(Source::new(ty, args)?) as Box<dyn Operator>)),
            );
        }
        reg.register(&UNION, Box::new(|_: &[Literal]| Ok(Box::new(Union) as Box<dyn Operator>)));
        reg.register(
            &MATERIALIZE,
            Box::new(|args: &[Literal]| Ok(Box::new(Materialize::new(args)?) as Box<dyn Operator>)),
        );
        reg
    }

    /// Add or replace an operator under its descriptor's operation name.
    pub fn register(&mut self, descriptor: &'static OperatorDescriptor, factory: Factory) {
        self.entries.insert(
            descriptor.operation,
            Entry {
                descriptor,
                factory,
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn descriptor(&self, name: &str) -> Option<&'static OperatorDescriptor> {
        self.entries.get(name).map(|e| e.descriptor)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// Build a node of operator `name` from positional `values`.
    pub fn create(&self, name: &str, values: Vec<Value>) -> Result<QueryNode> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| Error::MalformedTree(format!("unknown operator '{name}'")))?;
        let desc = entry.descriptor;

        let count = values.len();
        let mut upstreams = Vec::new();
        let mut arguments = Vec::new();
        let mut raw_options = None;
        for (i, value) in values.into_iter().enumerate() {
            match value {
                Value::Node(n) => upstreams.push(n),
                Value::Literal(l) => arguments.push(l),
                Value::Options(map) if i + 1 == count => raw_options = Some(map),
                Value::Options(_) => {
                    return Err(Error::MalformedTree(format!(
                        "options of '{name}' must come last"
                    )))
                }
            }
        }

        if !desc.max_kids.allows(upstreams.len()) {
            return Err(Error::MalformedTree(format!(
                "'{name}' accepts {:?} upstreams, got {}",
                desc.max_kids,
                upstreams.len()
            )));
        }
        desc.check_arguments(&arguments)
            .map_err(Error::MalformedTree)?;
        let options = match raw_options {
            Some(map) => NodeOptions::from_map(map, desc)?,
            None => NodeOptions::default(),
        };

        let operator = (entry.factory)(&arguments)?;
        let id = NodeId::new(self.next_id.get());
        self.next_id.set(id.get() + 1);
        QueryNode::new(id, operator, upstreams, arguments, options)
    }

    /// Descriptors of every documented operator, keyed by operation name.
    pub fn to_metadata(&self) -> Json {
        let map: Map<String, Json> = self
            .entries
            .iter()
            .filter(|(_, e)| e.descriptor.desc.is_some())
            .map(|(name, e)| (name.to_string(), e.descriptor.to_json()))
            .collect();
        Json::Object(map)
    }
}
