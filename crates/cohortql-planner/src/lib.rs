#![forbid(unsafe_code)]
//! cohortql-planner: statement documents → operator trees.
//!
//! A statement is a YAML (or JSON) document with an optional `config:`
//! section and a `query:` holding the operator tree. This crate only builds
//! the tree; lowering to SQL happens in the nodes themselves and the build
//! phase is driven by `cohortql-exec`.

pub mod dsl;
pub mod error;
pub mod tree;

pub use dsl::yaml::{parse_yaml_statement, ParsedStatement, StatementConfig};
pub use error::PlanError;
pub use tree::build_tree;
