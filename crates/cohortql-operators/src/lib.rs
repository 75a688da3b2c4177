#![forbid(unsafe_code)]
//! cohortql-operators: the operator tree and its lowering to queries.
//!
//! Design intent:
//! - Every node produces the canonical 10-column row; `columns` fills in
//!   whatever a source table lacks.
//! - Only leaves declare a concrete type. Internal nodes derive theirs from
//!   their upstreams (memoized).
//! - Per-compilation state lives in `TreeContext` and is passed in, never
//!   stored on nodes.
//! - Operators are looked up through an explicit `Registry`; each carries a
//!   static `OperatorDescriptor`.

pub mod columns;
pub mod metadata;
pub mod node;
pub mod options;
pub mod registry;
pub mod traits;

pub mod materialize;
pub mod source;
pub mod union;

pub use columns::columns;
pub use metadata::{ArgSpec, KidLimit, OperatorDescriptor, OptionSpec, ValueKind};
pub use node::QueryNode;
pub use options::NodeOptions;
pub use registry::{Registry, Value};
pub use traits::{NeededTempTable, Operator};
