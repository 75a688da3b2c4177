//! Statement documents compiled end to end.

use cohortql_core::config::CompileConfig;
use cohortql_core::error::Error;
use cohortql_core::types::CriterionType;
use cohortql_exec::{Compiler, ExecError};
use cohortql_io::{MemoryConnection, ScriptWriter};
use cohortql_operators::Registry;
use cohortql_planner::{parse_yaml_statement, PlanError};

const STATEMENT: &str = r#"
config:
  person_ids: [1, 2]
query:
  union:
    - condition_occurrence: ["412", "410.0"]
    - materialize: [cohort, { person: [] }, { label: "people" }]
"#;

#[test]
fn test_statement_compiles_against_every_dialect() {
    let compiler = Compiler::new(CompileConfig::default()).unwrap();
    for db in ["postgres", "sqlite", "duckdb", "oracle", "mssql"] {
        let mut conn = MemoryConnection::new(db);
        let out = compiler.compile_statement(STATEMENT, &mut conn).unwrap();
        assert_eq!(out.manifest.dialect, db);
        assert_eq!(out.manifest.temp_tables.len(), 1);
        assert_eq!(out.temp_table_sql.len(), 2, "{db}");
        assert!(out.sql.contains("UNION ALL"));
        assert_eq!(
            out.types.iter().copied().collect::<Vec<_>>(),
            vec![CriterionType::ConditionOccurrence, CriterionType::Person]
        );
    }
}

#[test]
fn test_labels_and_arguments_survive_parsing() {
    let parsed = parse_yaml_statement(STATEMENT, &Registry::default()).unwrap();
    let kids = parsed.root.upstreams();
    assert_eq!(kids[0].arguments().len(), 2);
    assert_eq!(kids[1].label(), Some("people"));
    assert_eq!(kids[1].stream().unwrap().name(), "person");
}

#[test]
fn test_unsupported_dialect_names_the_dialect() {
    let compiler = Compiler::new(CompileConfig::default()).unwrap();
    let mut conn = MemoryConnection::new("teradata");
    match compiler.compile_statement(STATEMENT, &mut conn) {
        Err(ExecError::Core(Error::UnsupportedDialect(name))) => assert_eq!(name, "teradata"),
        other => panic!("unexpected: {other:?}"),
    }
    // Nothing ran.
    assert!(conn.statements().is_empty());
}

#[test]
fn test_malformed_statements_are_rejected() {
    let reg = Registry::default();
    let cases = [
        "query: { union: [] }",
        "query: { person: [{ death: [] }] }",
        "query: { materialize: [{ person: [] }] }",
        "query: { drug_cost: ['x'] }",
        "query: { person: [{ colour: red }] }",
        "query: { nothing: [] }",
    ];
    for src in cases {
        assert!(parse_yaml_statement(src, &reg).is_err(), "{src}");
    }
    assert!(matches!(
        parse_yaml_statement("query: [", &reg),
        Err(PlanError::Yaml(_))
    ));
}

#[test]
fn test_script_writer_collects_the_build_phase() {
    let compiler = Compiler::new(CompileConfig::default()).unwrap();
    let mut writer = ScriptWriter::to_writer(Vec::new(), "postgres");
    let out = compiler.compile_statement(STATEMENT, &mut writer).unwrap();
    writer.write_statement(&out.sql).unwrap();
    assert_eq!(writer.written(), 4);
    let script = String::from_utf8(writer.into_inner().unwrap()).unwrap();
    let lines: Vec<&str> = script.lines().collect();
    assert!(lines[0].starts_with("DROP TABLE IF EXISTS"));
    assert!(lines[1].starts_with("CREATE TEMPORARY TABLE"));
    assert!(lines[2].starts_with("INSERT INTO"));
    assert_eq!(lines[3], format!("{};", out.sql));
}

#[test]
fn test_oracle_script_runs_blocks_with_a_slash() {
    let compiler = Compiler::new(CompileConfig::default()).unwrap();
    let mut writer = ScriptWriter::to_writer(Vec::new(), "oracle");
    let out = compiler.compile_statement(STATEMENT, &mut writer).unwrap();
    writer.write_statement(&out.sql).unwrap();
    let script = String::from_utf8(writer.into_inner().unwrap()).unwrap();
    let lines: Vec<&str> = script.lines().collect();
    assert!(lines[0].starts_with("BEGIN EXECUTE IMMEDIATE 'DROP TABLE"));
    assert!(lines[0].ends_with("END IF; END;"));
    assert_eq!(lines[1], "/");
    assert!(lines[2].starts_with("CREATE GLOBAL TEMPORARY TABLE"));
    assert!(!script.contains(";;"));
}

#[test]
fn test_numeric_materialize_names_are_accepted() {
    let compiler = Compiler::new(CompileConfig::default()).unwrap();
    let out = compiler
        .compile_statement(
            "query: { materialize: [{ person: [] }, 42] }",
            &mut MemoryConnection::default(),
        )
        .unwrap();
    assert_eq!(
        out.manifest.temp_tables,
        vec![cohortql_core::hash::short_name("_", "42")]
    );
}

#[test]
fn test_metadata_exports_every_operator() {
    let meta = Registry::default().to_metadata();
    let obj = meta.as_object().unwrap();
    assert_eq!(obj.len(), CriterionType::ALL.len() + 2);
    assert_eq!(meta["condition_occurrence"]["options"][0]["name"], "label");
    assert_eq!(meta["drug_cost"]["max_kids"], "none");
}
