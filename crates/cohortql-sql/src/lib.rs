#![forbid(unsafe_code)]
//! cohortql-sql: the small SQL surface the compiler lowers into.
//!
//! A `Query` is a lazy description (never executed here) that tracks the
//! columns it exposes, so callers can decide between passthrough and
//! synthesized columns without touching a store. `render` turns queries and
//! `Statement`s into text for one `Dialect`.

pub mod dialect;
pub mod expr;
pub mod query;
pub mod render;

pub use dialect::{DateConstruction, Dialect, SqlType};
pub use expr::{col, Expr, SelectItem};
pub use query::{Query, Source, Statement};
pub use render::{render_query, render_statement, terminate};
