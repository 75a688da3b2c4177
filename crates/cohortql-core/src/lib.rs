#![forbid(unsafe_code)]
//! cohortql-core: shared vocabulary for the cohortql compiler.
//!
//! - `schema`: the canonical 10-column row every operator produces.
//! - `types`: concrete source-table types (`CriterionType`) and literals.
//! - `catalog`: column lists of the CDM source tables.
//! - `hash`: BLAKE3 helpers used for content-addressed temp-table names.
//! - `config`, `manifest`, `id`, `error`.
//!
//! No SQL rendering and no store access live here.

pub mod catalog;
pub mod config;
pub mod error;
pub mod hash;
pub mod id;
pub mod manifest;
pub mod prelude;
pub mod schema;
pub mod types;

/// Compiler version recorded in manifests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
