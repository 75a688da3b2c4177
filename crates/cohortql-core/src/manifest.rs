//! Compile manifest for audit/replay.
//!
//! The compiler emits a manifest after a successful build phase; the SQL hash
//! lets callers check that two compilations produced the same statement.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hash::Hash256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManifestId(pub Uuid);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileManifest {
    pub id: ManifestId,

    /// Stable hash of the final root statement.
    pub sql_hash: Hash256,

    /// Dialect the statement was rendered for.
    pub dialect: String,

    /// Physical temp-table names in the order they were bootstrapped.
    pub temp_tables: Vec<String>,

    /// Compiler version string for provenance.
    pub compiler_version: String,

    /// Milliseconds since Unix epoch (UTC).
    pub started_ms: u64,
    pub finished_ms: u64,
}

impl CompileManifest {
    pub fn new(dialect: impl Into<String>, started_ms: u64) -> Self {
        Self {
            id: ManifestId(Uuid::new_v4()),
            sql_hash: Hash256([0u8; 32]),
            dialect: dialect.into(),
            temp_tables: Vec::new(),
            compiler_version: crate::VERSION.to_string(),
            started_ms,
            finished_ms: started_ms,
        }
    }

    pub fn finish(mut self, finished_ms: u64, sql_hash: Hash256, temp_tables: Vec<String>) -> Self {
        self.finished_ms = finished_ms;
        self.sql_hash = sql_hash;
        self.temp_tables = temp_tables;
        self
    }
}
