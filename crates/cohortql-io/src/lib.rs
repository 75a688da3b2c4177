#![forbid(unsafe_code)]
//! cohortql-io: `Connection` adapters.
//!
//! - `MemoryConnection`: records every statement instead of running it. Used
//!   by tests and by `validate`, and handy for inspecting the build phase.
//! - `ScriptWriter`: streams executed statements into a SQL script that can be
//!   replayed against a real store.
//!
//! Real database drivers live with the caller; anything that implements
//! `cohortql_temp::Connection` works.

pub mod error;
pub mod memory;
pub mod script;

pub use memory::MemoryConnection;
pub use script::ScriptWriter;
