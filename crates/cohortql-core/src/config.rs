//! Compiler configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Dialect name of the target store (e.g. `postgres`, `oracle`, `mssql`).
    pub dialect: String,

    /// Prefix of the physical names derived for temp tables.
    pub temp_table_prefix: String,

    /// Optional person allowlist; applied once at every leaf.
    pub person_ids: Option<Vec<i64>>,

    /// Drop a same-named table before bootstrapping a temp table.
    pub drop_existing_temp_tables: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            dialect: "postgres".to_string(),
            temp_table_prefix: "_".to_string(),
            person_ids: None,
            drop_existing_temp_tables: true,
        }
    }
}

impl CompileConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `COHORTQL_DIALECT`: target dialect name
    /// - `COHORTQL_TEMP_PREFIX`: temp-table name prefix
    /// - `COHORTQL_PERSON_IDS`: comma-separated person allowlist
    /// - `COHORTQL_DROP_EXISTING`: `true`/`false`
    ///
    /// Unparseable values are ignored, like every other override here.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("COHORTQL_DIALECT") {
            cfg.dialect = s;
        }

        if let Ok(s) = std::env::var("COHORTQL_TEMP_PREFIX") {
            cfg.temp_table_prefix = s;
        }

        if let Ok(s) = std::env::var("COHORTQL_PERSON_IDS") {
            if let Ok(ids) = parse_person_ids(&s) {
                cfg.person_ids = Some(ids);
            }
        }

        if let Ok(s) = std::env::var("COHORTQL_DROP_EXISTING") {
            if let Ok(v) = s.parse::<bool>() {
                cfg.drop_existing_temp_tables = v;
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<()> {
        if self.temp_table_prefix.is_empty() {
            return Err(Error::Config("temp_table_prefix must not be empty".into()));
        }
        if !self
            .temp_table_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(Error::Config(format!(
                "temp_table_prefix '{}' is not a plain identifier",
                self.temp_table_prefix
            )));
        }
        Ok(())
    }
}

/// Parse `"1, 2,3"` into person ids. Empty segments are skipped.
pub fn parse_person_ids(s: &str) -> Result<Vec<i64>> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<i64>()
                .map_err(|e| Error::Config(format!("person id '{p}': {e}")))
        })
        .collect()
}
