//! Reproducibility helpers.
//!
//! Compilation is deterministic: the same tree, config and dialect always
//! render the same SQL and the same temp-table names. The manifest records the
//! SQL hash so a stored statement can be checked against a fresh compile.

use cohortql_core::hash::{hash_serde, hash_str, Hash256};
use cohortql_core::manifest::CompileManifest;

use crate::compiler::{CompiledQuery, ExecError};

/// One digest over the temp-table script and the root statement.
pub fn hash_compiled(compiled: &CompiledQuery) -> Result<Hash256, ExecError> {
    let h = hash_serde(&(&compiled.temp_table_sql, &compiled.sql))?;
    Ok(h)
}

/// True when `sql` is the statement `manifest` was emitted for.
pub fn matches_manifest(manifest: &CompileManifest, sql: &str) -> bool {
    manifest.sql_hash == hash_str(sql)
}
