//! Convenient re-exports for downstream crates.

pub use crate::catalog::table_columns;
pub use crate::config::CompileConfig;
pub use crate::error::{Error, Result};
pub use crate::hash::{hash_str, short_name, Hash256};
pub use crate::id::NodeId;
pub use crate::manifest::{CompileManifest, ManifestId};
pub use crate::schema::{canonical_schema, DataType, Field, Schema, CANONICAL_COLUMNS};
pub use crate::types::{CriterionType, Literal};
