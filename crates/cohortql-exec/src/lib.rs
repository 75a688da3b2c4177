#![forbid(unsafe_code)]
//! cohortql-exec: drives one compilation end to end.
//!
//! `Compiler::compile` creates the tree context, runs the temp-table build
//! phase against the connection, renders the root statement and emits a
//! `CompileManifest`. Compilation is synchronous and single-threaded; the
//! build phase must finish before the root SQL is run.

pub mod compiler;
pub mod metrics;
pub mod replay;

pub use compiler::{CompiledQuery, Compiler, ExecError};
