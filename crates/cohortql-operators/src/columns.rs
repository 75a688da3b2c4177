//! Column synthesis onto the canonical row.
//!
//! Given a raw query and (optionally) the concrete type it was drawn from,
//! `columns` returns the ten projection items of the canonical row, in order.
//! Columns the query already exposes under their canonical name pass through;
//! the rest are derived from the type's column table or filled with typed
//! NULLs, so rows from unrelated tables can be unioned without per-table code.

use cohortql_core::schema::{canonical_type, DataType};
use cohortql_core::types::{CriterionType, DateSource};
use cohortql_sql::{col, DateConstruction, Dialect, Expr, Query, SelectItem, SqlType};

/// Default for missing month/day parts of an assembled date.
const MISSING_DATE_PART: &str = "01";

pub fn columns(query: &Query, local_type: Option<CriterionType>, dialect: Dialect) -> Vec<SelectItem> {
    let mut items = Vec::with_capacity(10);
    items.push(SelectItem::column("person_id"));
    items.push(match local_type {
        Some(t) => col(t.id_column()).alias("criterion_id"),
        None => SelectItem::column("criterion_id"),
    });
    items.push(match local_type {
        Some(t) => Expr::str(t.as_str()).cast_string().alias("criterion_type"),
        None => SelectItem::column("criterion_type"),
    });
    items.extend(date_columns(query, local_type, dialect));
    for name in [
        "value_as_number",
        "value_as_string",
        "value_as_concept_id",
        "units_source_value",
    ] {
        items.push(passthrough_or_null(query, name));
    }
    items.push(source_value(query, local_type));
    items
}

fn date_columns(query: &Query, local_type: Option<CriterionType>, dialect: Dialect) -> [SelectItem; 2] {
    let passthrough = [SelectItem::column("start_date"), SelectItem::column("end_date")];
    let Some(ty) = local_type else {
        return passthrough;
    };
    if query.has_column("start_date") && query.has_column("end_date") {
        return passthrough;
    }

    let start = as_date(ty.start_date(), dialect);
    let end = match (as_date(ty.end_date(), dialect), start.clone()) {
        (Some(end), Some(start)) => Some(Expr::coalesce(vec![end, start])),
        _ => None,
    };
    [
        start
            .unwrap_or_else(|| Expr::typed_null(DataType::Date))
            .alias("start_date"),
        end.unwrap_or_else(|| Expr::typed_null(DataType::Date))
            .alias("end_date"),
    ]
}

fn as_date(source: DateSource, dialect: Dialect) -> Option<Expr> {
    match source {
        DateSource::Column(c) => Some(col(c).cast(SqlType::Date)),
        DateSource::Assembled { year, month, day } => {
            Some(assemble_date(year, month, day, dialect))
        }
        DateSource::Absent => None,
    }
}

/// `YYYY-MM-DD` built from integer parts and converted the way `dialect`
/// converts strings to dates.
pub fn assemble_date(year: &str, month: &str, day: &str, dialect: Dialect) -> Expr {
    let part = |c: &str| Expr::coalesce(vec![col(c).cast_string(), Expr::str(MISSING_DATE_PART)]);
    let iso = match dialect {
        // SQLite's DATE() only reads zero-padded parts.
        Dialect::Sqlite => Expr::func(
            "printf",
            vec![Expr::str("%04d-%02d-%02d"), col(year), part(month), part(day)],
        ),
        _ => Expr::Concat(vec![
            col(year).cast_string(),
            Expr::str("-"),
            part(month),
            Expr::str("-"),
            part(day),
        ]),
    };
    match dialect.date_construction() {
        DateConstruction::Function => Expr::func("TO_DATE", vec![iso, Expr::str("YYYY-MM-DD")]),
        DateConstruction::Convert => Expr::Convert {
            to: SqlType::DateTime,
            expr: Box::new(iso),
        },
        DateConstruction::Cast => iso.cast(SqlType::Date),
    }
}

fn passthrough_or_null(query: &Query, name: &str) -> SelectItem {
    if query.has_column(name) {
        return SelectItem::column(name);
    }
    Expr::typed_null(canonical_type(name).unwrap_or(DataType::Utf8)).alias(name)
}

fn source_value(query: &Query, local_type: Option<CriterionType>) -> SelectItem {
    if query.has_column("source_value") {
        return SelectItem::column("source_value");
    }
    match local_type.and_then(CriterionType::source_value_column) {
        Some(c) => col(c).cast_string().alias("source_value"),
        None => Expr::typed_null(DataType::Utf8).alias("source_value"),
    }
}
