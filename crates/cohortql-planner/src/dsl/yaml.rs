//! Statement documents.
//!
//! Example:
//! ```yaml
//! config:
//!   dialect: oracle
//!   person_ids: [1, 2]
//! query:
//!   union:
//!     - condition_occurrence: ["412", "410.0"]
//!     - materialize: [cohort, { person: [] }, { label: "people" }]
//! ```
//!
//! JSON documents parse too, since JSON is YAML.

use serde::{Deserialize, Serialize};
use serde_yaml::Value as Yaml;

use cohortql_core::config::CompileConfig;
use cohortql_operators::{QueryNode, Registry};

use crate::error::PlanError;
use crate::tree::build_tree;

#[derive(Debug, Clone, Deserialize)]
struct Statement {
    #[serde(default)]
    config: Option<StatementConfig>,
    #[serde(default)]
    query: Yaml,
}

/// Per-document overrides of the compile configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatementConfig {
    pub dialect: Option<String>,
    pub person_ids: Option<Vec<i64>>,
    pub temp_table_prefix: Option<String>,
}

impl StatementConfig {
    /// Overlay the fields this document sets onto `cfg`.
    pub fn apply(&self, cfg: &mut CompileConfig) {
        if let Some(d) = &self.dialect {
            cfg.dialect = d.clone();
        }
        if let Some(ids) = &self.person_ids {
            cfg.person_ids = Some(ids.clone());
        }
        if let Some(p) = &self.temp_table_prefix {
            cfg.temp_table_prefix = p.clone();
        }
    }
}

#[derive(Debug)]
pub struct ParsedStatement {
    pub root: QueryNode,
    pub config: StatementConfig,
}

/// Parse a statement document and build its operator tree.
pub fn parse_yaml_statement(src: &str, registry: &Registry) -> Result<ParsedStatement, PlanError> {
    let doc: Statement = serde_yaml::from_str(src)?;
    if doc.query.is_null() {
        return Err(PlanError::Statement("missing or empty query".into()));
    }
    let root = build_tree(&doc.query, registry)?;
    Ok(ParsedStatement {
        root,
        config: doc.config.unwrap_or_default(),
    })
}
