#![forbid(unsafe_code)]
//! cohortql-temp: everything the build phase touches.
//!
//! - `Connection`: the store interface (dialect report, table columns,
//!   statement execution). Implemented by `cohortql-io`.
//! - `TempTableManager`: per-tree registry that bootstraps each temp table at
//!   most once and populates it on request.
//! - `TreeContext`: the per-compilation state shared by every node, passed
//!   explicitly instead of hanging off the nodes.

pub mod connection;
pub mod context;
pub mod manager;

pub use connection::Connection;
pub use context::TreeContext;
pub use manager::{bootstrap_row, TempTable, TempTableManager, TempTableState};
