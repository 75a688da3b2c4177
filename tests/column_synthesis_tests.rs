//! Canonical row synthesis across source tables and dialects.

use std::collections::HashMap;

use cohortql_core::schema::{DataType, CANONICAL_COLUMNS};
use cohortql_core::types::CriterionType;
use cohortql_io::MemoryConnection;
use cohortql_operators::{columns, Registry};
use cohortql_sql::{render_query, Dialect, Expr, Query, SelectItem, SqlType};
use cohortql_temp::TreeContext;

const DIALECTS: [Dialect; 5] = [
    Dialect::Postgres,
    Dialect::Sqlite,
    Dialect::DuckDb,
    Dialect::Oracle,
    Dialect::MsSql,
];

/// Dialects without an in-process engine; `eval` stands in for them.
/// SQLite output is checked on a real engine in `sqlite_execution_tests`.
const MODELED: [Dialect; 4] = [Dialect::Postgres, Dialect::DuckDb, Dialect::Oracle, Dialect::MsSql];

type Row = HashMap<&'static str, Option<String>>;

/// Evaluates the handful of expression forms date assembly uses against one
/// row. Date conversions normalize to `YYYY-MM-DD`, as the modeled engines'
/// date parsers accept unpadded parts.
fn eval(expr: &Expr, row: &Row) -> Option<String> {
    match expr {
        Expr::Column(c) => row.get(c.as_str()).cloned().flatten(),
        Expr::Null => None,
        Expr::Str(s) => Some(s.clone()),
        Expr::Int(i) => Some(i.to_string()),
        Expr::Cast { expr, to: SqlType::Date | SqlType::DateTime }
        | Expr::Convert { expr, to: SqlType::Date | SqlType::DateTime } => {
            eval(expr, row).map(|s| to_date(&s))
        }
        Expr::Cast { expr, .. } | Expr::Convert { expr, .. } => eval(expr, row),
        Expr::Function { name, args } if name == "COALESCE" => {
            args.iter().find_map(|a| eval(a, row))
        }
        Expr::Function { name, args } if name == "TO_DATE" => {
            assert_eq!(args[1], Expr::Str("YYYY-MM-DD".into()));
            eval(&args[0], row).map(|s| to_date(&s))
        }
        Expr::Concat(parts) => parts.iter().map(|p| eval(p, row)).collect(),
        other => panic!("unexpected expression {other:?}"),
    }
}

fn to_date(s: &str) -> String {
    let parts: Vec<u32> = s.split('-').map(|p| p.parse().unwrap()).collect();
    format!("{:04}-{:02}-{:02}", parts[0], parts[1], parts[2])
}

fn person_scan() -> Query {
    let cols = cohortql_core::catalog::table_columns("person")
        .unwrap()
        .iter()
        .map(|c| c.to_string())
        .collect();
    Query::table("person", cols)
}

#[test]
fn test_birth_date_with_missing_month_and_day_is_first_of_january() {
    let row: Row = HashMap::from([
        ("year_of_birth", Some("1980".to_string())),
        ("month_of_birth", None),
        ("day_of_birth", None),
    ]);
    for dialect in MODELED {
        let items = columns(&person_scan(), Some(CriterionType::Person), dialect);
        assert_eq!(eval(&items[3].expr, &row).as_deref(), Some("1980-01-01"), "{dialect}");
        assert_eq!(eval(&items[4].expr, &row).as_deref(), Some("1980-01-01"), "{dialect}");
    }
}

#[test]
fn test_birth_date_keeps_known_parts() {
    let row: Row = HashMap::from([
        ("year_of_birth", Some("1975".to_string())),
        ("month_of_birth", Some("7".to_string())),
        ("day_of_birth", Some("14".to_string())),
    ]);
    let items = columns(&person_scan(), Some(CriterionType::Person), Dialect::Postgres);
    assert_eq!(eval(&items[3].expr, &row).as_deref(), Some("1975-07-14"));
}

#[test]
fn test_birth_date_construction_differs_by_dialect() {
    let reg = Registry::default();
    let person = reg.create("person", vec![]).unwrap();
    let ctx = TreeContext::new();
    let sql = |db: &str| person.sql(&ctx, &MemoryConnection::new(db)).unwrap();

    assert!(sql("oracle").contains("TO_DATE((CAST(year_of_birth AS VARCHAR2(255)) || '-' ||"));
    assert!(sql("mssql").contains("CONVERT(DATETIME, (CAST(year_of_birth AS VARCHAR(255)) + '-' +"));
    for db in ["postgres", "duckdb"] {
        assert!(sql(db).contains("CAST((CAST(year_of_birth AS VARCHAR(255)) || '-' ||"), "{db}");
    }
    assert!(sql("sqlite").contains("DATE(printf('%04d-%02d-%02d', year_of_birth, "));
    assert!(!sql("sqlite").contains("AS DATE)"));
}

#[test]
fn test_identity_on_canonical_input() {
    let q = Query::table("t", CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect());
    for dialect in DIALECTS {
        let items = columns(&q, None, dialect);
        let expected: Vec<SelectItem> = CANONICAL_COLUMNS.iter().map(|c| SelectItem::column(*c)).collect();
        assert_eq!(items, expected);
    }
    let rendered = render_query(
        &q.clone().select(columns(&q, None, Dialect::Postgres)).unwrap(),
        Dialect::Postgres,
    );
    assert_eq!(
        rendered,
        format!("SELECT {} FROM t", CANONICAL_COLUMNS.join(", "))
    );
}

#[test]
fn test_cost_types_yield_typed_nulls() {
    let reg = Registry::default();
    let conn = MemoryConnection::default();
    for ty in [CriterionType::DrugCost, CriterionType::ProcedureCost] {
        let q = reg
            .create(ty.as_str(), vec![])
            .unwrap()
            .evaluate(&TreeContext::new(), &conn)
            .unwrap();
        let items = q.projection.unwrap();
        assert_eq!(items[3].expr, Expr::typed_null(DataType::Date));
        assert_eq!(items[4].expr, Expr::typed_null(DataType::Date));
        assert_eq!(items[9].expr, Expr::typed_null(DataType::Utf8));
        assert_eq!(
            items[1].expr,
            Expr::Column(format!("{}_id", ty.as_str()))
        );
    }
}

#[test]
fn test_cost_rows_reach_a_person_through_their_event() {
    let reg = Registry::default();
    let sql = reg
        .create("drug_cost", vec![])
        .unwrap()
        .sql(&TreeContext::new(), &MemoryConnection::default())
        .unwrap();
    assert!(sql.ends_with("FROM drug_cost INNER JOIN drug_exposure USING (drug_exposure_id)"));
}

#[test]
fn test_existing_value_columns_pass_through() {
    let reg = Registry::default();
    let q = reg
        .create("observation", vec![])
        .unwrap()
        .evaluate(&TreeContext::new(), &MemoryConnection::default())
        .unwrap();
    let items = q.projection.unwrap();
    for idx in [5, 6, 7, 8] {
        assert!(items[idx].is_passthrough(), "{}", CANONICAL_COLUMNS[idx]);
    }
    assert_eq!(
        items[9],
        Expr::Column("observation_source_value".into())
            .cast_string()
            .alias("source_value")
    );
}

#[test]
fn test_missing_value_columns_become_typed_nulls() {
    let reg = Registry::default();
    let q = reg
        .create("visit_occurrence", vec![])
        .unwrap()
        .evaluate(&TreeContext::new(), &MemoryConnection::default())
        .unwrap();
    let items = q.projection.unwrap();
    assert_eq!(items[5].expr, Expr::typed_null(DataType::Float64));
    assert_eq!(items[6].expr, Expr::typed_null(DataType::Utf8));
    assert_eq!(items[7].expr, Expr::typed_null(DataType::Int64));
    assert_eq!(items[8].expr, Expr::typed_null(DataType::Utf8));
}
