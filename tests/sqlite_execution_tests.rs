//! Compiled statements run on an in-process SQLite engine.

use cohortql_core::catalog::table_columns;
use cohortql_core::config::CompileConfig;
use cohortql_core::types::CriterionType;
use cohortql_exec::Compiler;
use cohortql_io::MemoryConnection;
use rusqlite::types::Value;
use rusqlite::Connection;

const PERSON_ID: usize = 0;
const CRITERION_ID: usize = 1;
const CRITERION_TYPE: usize = 2;
const START_DATE: usize = 3;
const END_DATE: usize = 4;
const SOURCE_VALUE: usize = 9;

/// Every CDM table with untyped columns, plus a few rows.
fn cdm() -> Connection {
    let db = Connection::open_in_memory().expect("open");
    for t in CriterionType::ALL {
        let cols = table_columns(t.table_name()).expect("catalog");
        db.execute_batch(&format!("CREATE TABLE {} ({})", t.table_name(), cols.join(", ")))
            .expect("create");
    }
    db.execute_batch(
        "INSERT INTO person (person_id, year_of_birth, month_of_birth, day_of_birth, person_source_value)
             VALUES (1, 1980, NULL, NULL, 'p1'), (2, 1975, 7, 4, 'p2');
         INSERT INTO condition_occurrence
             (condition_occurrence_id, person_id, condition_start_date, condition_end_date, condition_source_value)
             VALUES (10, 1, '2010-03-05', NULL, '412'),
                    (11, 2, '2011-01-02', '2011-01-09', '410.0'),
                    (12, 2, '2012-01-01', NULL, '250');
         INSERT INTO drug_exposure (drug_exposure_id, person_id, drug_exposure_start_date, drug_source_value)
             VALUES (20, 1, '2015-06-01', 'rx');
         INSERT INTO drug_cost (drug_cost_id, drug_exposure_id, total_paid) VALUES (30, 20, 5.0);",
    )
    .expect("seed");
    db
}

/// Compile `src` for sqlite, replay the build phase on `db`, return the
/// root query's rows sorted.
fn run(db: &Connection, src: &str) -> Vec<Vec<Value>> {
    let compiler = Compiler::new(CompileConfig::default()).unwrap();
    let mut conn = MemoryConnection::new("sqlite");
    let out = compiler.compile_statement(src, &mut conn).unwrap();
    for stmt in conn.statements() {
        db.execute_batch(stmt)
            .unwrap_or_else(|e| panic!("{stmt}: {e}"));
    }
    let mut query = db.prepare(&out.sql).unwrap();
    let width = query.column_count();
    assert_eq!(width, 10);
    let mut rows: Vec<Vec<Value>> = query
        .query_map([], |r| (0..width).map(|i| r.get::<_, Value>(i)).collect::<rusqlite::Result<Vec<Value>>>())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    rows.sort_by(|a, b| format!("{a:?}").cmp(&format!("{b:?}")));
    rows
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

#[test]
fn test_materialized_rows_have_no_bootstrap_row() {
    let db = cdm();
    let rows = run(
        &db,
        "config: { person_ids: [1] }\nquery: { materialize: [cohort, { person: [] }] }",
    );
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][PERSON_ID], Value::Integer(1));
    assert_eq!(rows[0][CRITERION_ID], Value::Integer(1));
    assert_eq!(rows[0][CRITERION_TYPE], text("person"));
    assert_eq!(rows[0][SOURCE_VALUE], text("p1"));
}

#[test]
fn test_birth_dates_are_full_iso_dates() {
    let db = cdm();
    let rows = run(&db, "query: { person: [] }");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][START_DATE], text("1980-01-01"));
    assert_eq!(rows[0][END_DATE], text("1980-01-01"));
    assert_eq!(rows[1][START_DATE], text("1975-07-04"));
}

#[test]
fn test_event_dates_keep_month_and_day() {
    let db = cdm();
    let rows = run(&db, "query: { condition_occurrence: ['412', '410.0'] }");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][CRITERION_ID], Value::Integer(10));
    assert_eq!(rows[0][START_DATE], text("2010-03-05"));
    // Missing end date falls back to the start.
    assert_eq!(rows[0][END_DATE], text("2010-03-05"));
    assert_eq!(rows[1][START_DATE], text("2011-01-02"));
    assert_eq!(rows[1][END_DATE], text("2011-01-09"));
}

#[test]
fn test_every_row_belongs_to_an_allowed_person() {
    let db = cdm();
    let rows = run(
        &db,
        "config: { person_ids: [2] }
query:
  union:
    - person: []
    - materialize: [staged, { condition_occurrence: [] }]
    - drug_exposure: []",
    );
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r[PERSON_ID] == Value::Integer(2)), "{rows:?}");
}

#[test]
fn test_cost_rows_have_null_dates_and_source_value() {
    let db = cdm();
    let rows = run(&db, "query: { drug_cost: [] }");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][PERSON_ID], Value::Integer(1));
    assert_eq!(rows[0][CRITERION_ID], Value::Integer(30));
    assert_eq!(rows[0][START_DATE], Value::Null);
    assert_eq!(rows[0][END_DATE], Value::Null);
    assert_eq!(rows[0][SOURCE_VALUE], Value::Null);
}
