//! Compiler: tree + connection → temp-table script, root SQL, manifest.

use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use thiserror::Error;

use cohortql_core::config::CompileConfig;
use cohortql_core::hash::hash_str;
use cohortql_core::manifest::CompileManifest;
use cohortql_core::types::CriterionType;
use cohortql_operators::{QueryNode, Registry};
use cohortql_planner::{parse_yaml_statement, PlanError};
use cohortql_sql::{terminate, Dialect};
use cohortql_temp::{Connection, TreeContext};

use crate::metrics::emit_span;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    Core(#[from] cohortql_core::error::Error),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Output of one compilation.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledQuery {
    /// Bootstrap and population statements of every temp table, in build
    /// order. They have already been run against the connection.
    pub temp_table_sql: Vec<String>,
    /// The root statement.
    pub sql: String,
    /// Concrete types the root can produce.
    pub types: BTreeSet<CriterionType>,
    pub manifest: CompileManifest,
}

impl CompiledQuery {
    /// Temp-table statements followed by the root statement, one per line.
    pub fn script(&self) -> String {
        let dialect = self.manifest.dialect.parse::<Dialect>().ok();
        let mut out = String::new();
        for stmt in self.temp_table_sql.iter().chain(std::iter::once(&self.sql)) {
            out.push_str(&terminate(stmt, dialect));
            out.push('\n');
        }
        out
    }
}

pub struct Compiler {
    cfg: CompileConfig,
    registry: Registry,
}

impl Compiler {
    pub fn new(cfg: CompileConfig) -> Result<Self, ExecError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            registry: Registry::with_builtins(),
        })
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &CompileConfig {
        &self.cfg
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Build `root`'s temp tables on `conn` and render its SQL in the
    /// connection's dialect.
    pub fn compile(
        &self,
        root: &QueryNode,
        conn: &mut dyn Connection,
    ) -> Result<CompiledQuery, ExecError> {
        compile_with(&self.cfg, root, conn)
    }

    /// Parse a statement document, overlay its `config:` section on this
    /// compiler's config, and compile the tree.
    pub fn compile_statement(
        &self,
        src: &str,
        conn: &mut dyn Connection,
    ) -> Result<CompiledQuery, ExecError> {
        let parsed = parse_yaml_statement(src, &self.registry)?;
        let mut cfg = self.cfg.clone();
        parsed.config.apply(&mut cfg);
        cfg.validate()?;
        compile_with(&cfg, &parsed.root, conn)
    }
}

fn compile_with(
    cfg: &CompileConfig,
    root: &QueryNode,
    conn: &mut dyn Connection,
) -> Result<CompiledQuery, ExecError> {
    let started = now_millis();
    let dialect = conn.dialect()?;
    emit_span(
        "compile_start",
        &[
            ("dialect", dialect.to_string()),
            ("root", root.name().to_string()),
        ],
    );

    let mut ctx = TreeContext::from_config(cfg)?;
    root.build_temp_tables(&mut ctx, conn)?;
    let temp_table_sql = ctx.temp_tables().sql(dialect)?;
    let sql = root.sql(&ctx, &*conn)?;
    let types = root.types()?.clone();

    let temp_tables: Vec<String> = ctx
        .temp_tables()
        .tables()
        .iter()
        .map(|t| t.name().to_string())
        .collect();
    let manifest = CompileManifest::new(dialect.as_str(), started).finish(
        now_millis(),
        hash_str(&sql),
        temp_tables,
    );

    emit_span(
        "compile_finish",
        &[
            ("temp_tables", manifest.temp_tables.len().to_string()),
            ("sql_bytes", sql.len().to_string()),
            ("sql_hash", manifest.sql_hash.to_hex()),
        ],
    );

    Ok(CompiledQuery {
        temp_table_sql,
        sql,
        types,
        manifest,
    })
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohortql_core::error::Error;
    use cohortql_io::MemoryConnection;

    use crate::replay::{hash_compiled, matches_manifest};

    #[test]
    fn compiles_a_leaf() {
        let compiler = Compiler::new(CompileConfig::default()).unwrap();
        let root = compiler.registry().create("death", vec![]).unwrap();
        let mut conn = MemoryConnection::default();
        let out = compiler.compile(&root, &mut conn).unwrap();
        assert!(out.temp_table_sql.is_empty());
        assert!(out.sql.starts_with("SELECT person_id, person_id AS criterion_id"));
        assert_eq!(out.types, BTreeSet::from([CriterionType::Death]));
        assert_eq!(out.manifest.dialect, "postgres");
        assert!(matches_manifest(&out.manifest, &out.sql));
        assert!(conn.statements().is_empty());
    }

    #[test]
    fn unsupported_dialect_is_reported_by_name() {
        let compiler = Compiler::new(CompileConfig::default()).unwrap();
        let root = compiler.registry().create("person", vec![]).unwrap();
        let mut conn = MemoryConnection::new("informix");
        match compiler.compile(&root, &mut conn) {
            Err(ExecError::Core(Error::UnsupportedDialect(name))) => assert_eq!(name, "informix"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn statement_config_overrides_compiler_config() {
        let compiler = Compiler::new(CompileConfig::default()).unwrap();
        let src = "config: { person_ids: [5] }\nquery: { person: [] }";
        let mut conn = MemoryConnection::default();
        let out = compiler.compile_statement(src, &mut conn).unwrap();
        assert!(out.sql.contains("WHERE person_id IN (5)"));
    }

    #[test]
    fn compilation_is_deterministic() {
        let compiler = Compiler::new(CompileConfig::default()).unwrap();
        let src = "query: { materialize: [m, { death: [] }] }";
        let a = compiler
            .compile_statement(src, &mut MemoryConnection::default())
            .unwrap();
        let b = compiler
            .compile_statement(src, &mut MemoryConnection::default())
            .unwrap();
        assert_eq!(a.sql, b.sql);
        assert_eq!(a.manifest.temp_tables, b.manifest.temp_tables);
        assert_eq!(hash_compiled(&a).unwrap(), hash_compiled(&b).unwrap());
        assert!(a.script().ends_with(&format!("{};\n", a.sql)));
    }

    #[test]
    fn oracle_script_has_single_terminators() {
        let compiler = Compiler::new(CompileConfig::default()).unwrap();
        let out = compiler
            .compile_statement(
                "query: { materialize: [m, { death: [] }] }",
                &mut MemoryConnection::new("oracle"),
            )
            .unwrap();
        let script = out.script();
        assert!(!script.contains(";;"));
        assert_eq!(script.lines().count(), out.temp_table_sql.len() + 1);
        assert!(script.lines().all(|l| l.ends_with(';')));
    }

    #[test]
    fn invalid_prefix_is_a_config_error() {
        let cfg = CompileConfig {
            temp_table_prefix: "bad prefix".into(),
            ..Default::default()
        };
        assert!(matches!(
            Compiler::new(cfg),
            Err(ExecError::Core(Error::Config(_)))
        ));
    }
}
