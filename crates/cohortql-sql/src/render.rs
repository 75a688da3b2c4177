//! Rendering of queries and statements into dialect SQL text.

use std::borrow::Cow;

use crate::dialect::{Dialect, SqlType};
use crate::expr::{Expr, SelectItem};
use crate::query::{Query, Source, Statement};

const SUBQUERY_ALIAS: &str = "q";

pub fn render_query(query: &Query, dialect: Dialect) -> String {
    let mut out = String::new();
    write_query(&mut out, query, dialect, None);
    out
}

pub fn render_statement(stmt: &Statement, dialect: Dialect) -> String {
    match stmt {
        Statement::DropTableIfExists { table } => match dialect {
            // No IF EXISTS before 23c; swallow ORA-00942 instead.
            Dialect::Oracle => format!(
                "BEGIN EXECUTE IMMEDIATE 'DROP TABLE {}'; EXCEPTION WHEN OTHERS THEN IF SQLCODE != -942 THEN RAISE; END IF; END;",
                temp_ident(table, dialect).replace('\'', "''")
            ),
            _ => format!("DROP TABLE IF EXISTS {}", temp_ident(table, dialect)),
        },
        Statement::CreateTempTableAs { table, query } => match dialect {
            Dialect::MsSql => {
                let mut out = String::new();
                write_query(&mut out, query, dialect, Some(table));
                out
            }
            Dialect::Oracle => format!(
                "CREATE GLOBAL TEMPORARY TABLE {} ON COMMIT PRESERVE ROWS AS {}",
                temp_ident(table, dialect),
                render_query(query, dialect)
            ),
            Dialect::Postgres | Dialect::Sqlite | Dialect::DuckDb => format!(
                "CREATE TEMPORARY TABLE {} AS {}",
                temp_ident(table, dialect),
                render_query(query, dialect)
            ),
        },
        Statement::InsertSelect { table, query } => format!(
            "INSERT INTO {} {}",
            temp_ident(table, dialect),
            render_query(query, dialect)
        ),
    }
}

/// `sql` followed by the terminator a script runner expects. Oracle PL/SQL
/// blocks already end in `END;` and run on a `/` line instead.
pub fn terminate(sql: &str, dialect: Option<Dialect>) -> String {
    if dialect == Some(Dialect::Oracle) && sql.starts_with("BEGIN") {
        format!("{sql}\n/")
    } else {
        format!("{sql};")
    }
}

pub fn render_expr(expr: &Expr, dialect: Dialect) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr, dialect);
    out
}

fn write_query(out: &mut String, query: &Query, dialect: Dialect, into: Option<&str>) {
    out.push_str("SELECT ");
    match &query.projection {
        Some(items) => write_list(out, items, dialect, write_select_item),
        None => out.push('*'),
    }
    if let Some(table) = into {
        out.push_str(" INTO ");
        out.push_str(&temp_ident(table, dialect));
    }

    match &query.source {
        Source::Table(name) => {
            out.push_str(" FROM ");
            out.push_str(&ident(name, dialect));
        }
        Source::TempTable(name) => {
            out.push_str(" FROM ");
            out.push_str(&temp_ident(name, dialect));
        }
        Source::JoinUsing { left, right, key } => {
            out.push_str(" FROM ");
            out.push_str(&ident(left, dialect));
            out.push_str(" INNER JOIN ");
            out.push_str(&ident(right, dialect));
            out.push_str(" USING (");
            out.push_str(&ident(key, dialect));
            out.push(')');
        }
        Source::Subquery(inner) => {
            out.push_str(" FROM (");
            write_query(out, inner, dialect, None);
            out.push(')');
            write_alias(out, dialect);
        }
        Source::UnionAll(branches) => {
            out.push_str(" FROM (");
            for (i, branch) in branches.iter().enumerate() {
                if i > 0 {
                    out.push_str(" UNION ALL ");
                }
                write_query(out, branch, dialect, None);
            }
            out.push(')');
            write_alias(out, dialect);
        }
        Source::Nothing => {
            if dialect == Dialect::Oracle {
                out.push_str(" FROM DUAL");
            }
        }
    }

    if !query.predicates.is_empty() {
        out.push_str(" WHERE ");
        for (i, p) in query.predicates.iter().enumerate() {
            if i > 0 {
                out.push_str(" AND ");
            }
            write_expr(out, p, dialect);
        }
    }
}

fn write_alias(out: &mut String, dialect: Dialect) {
    // Oracle rejects AS before a table alias.
    if dialect != Dialect::Oracle {
        out.push_str(" AS");
    }
    out.push(' ');
    out.push_str(SUBQUERY_ALIAS);
}

fn write_select_item(out: &mut String, item: &SelectItem, dialect: Dialect) {
    write_expr(out, &item.expr, dialect);
    if let Some(alias) = &item.alias {
        if !item.is_passthrough() {
            out.push_str(" AS ");
            out.push_str(&ident(alias, dialect));
        }
    }
}

fn write_expr(out: &mut String, expr: &Expr, dialect: Dialect) {
    match expr {
        Expr::Column(name) => out.push_str(&ident(name, dialect)),
        Expr::Null => out.push_str("NULL"),
        Expr::Str(s) => {
            out.push('\'');
            out.push_str(&s.replace('\'', "''"));
            out.push('\'');
        }
        Expr::Int(i) => out.push_str(&i.to_string()),
        // SQLite has no date type: CAST gives NUMERIC affinity and keeps only
        // the year. Its date functions return ISO text instead.
        Expr::Cast {
            expr,
            to: to @ (SqlType::Date | SqlType::DateTime),
        } if dialect == Dialect::Sqlite => {
            out.push_str(if *to == SqlType::Date { "DATE(" } else { "DATETIME(" });
            write_expr(out, expr, dialect);
            out.push(')');
        }
        Expr::Cast { expr, to } => {
            out.push_str("CAST(");
            write_expr(out, expr, dialect);
            out.push_str(" AS ");
            out.push_str(dialect.type_name(*to));
            out.push(')');
        }
        Expr::Convert { to, expr } => {
            out.push_str("CONVERT(");
            out.push_str(dialect.type_name(*to));
            out.push_str(", ");
            write_expr(out, expr, dialect);
            out.push(')');
        }
        Expr::Function { name, args } => {
            out.push_str(name);
            out.push('(');
            write_list(out, args, dialect, write_expr);
            out.push(')');
        }
        Expr::Concat(parts) => {
            let op = match dialect {
                Dialect::MsSql => " + ",
                _ => " || ",
            };
            out.push('(');
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    out.push_str(op);
                }
                write_expr(out, part, dialect);
            }
            out.push(')');
        }
        Expr::Eq { left, right } => {
            write_expr(out, left, dialect);
            out.push_str(" = ");
            write_expr(out, right, dialect);
        }
        Expr::InList { expr, list } => {
            if list.is_empty() {
                out.push_str("1 = 0");
                return;
            }
            write_expr(out, expr, dialect);
            out.push_str(" IN (");
            write_list(out, list, dialect, write_expr);
            out.push(')');
        }
    }
}

fn write_list<T>(
    out: &mut String,
    items: &[T],
    dialect: Dialect,
    write_one: fn(&mut String, &T, Dialect),
) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_one(out, item, dialect);
    }
}

/// Plain identifiers pass through; anything else (e.g. a leading underscore,
/// which Oracle refuses unquoted) is quoted.
fn ident(name: &str, dialect: Dialect) -> Cow<'_, str> {
    let plain = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        return Cow::Borrowed(name);
    }
    match dialect {
        Dialect::MsSql => Cow::Owned(format!("[{}]", name.replace(']', "]]"))),
        _ => Cow::Owned(format!("\"{}\"", name.replace('"', "\"\""))),
    }
}

/// Temp tables are session-scoped. SQL Server only scopes tables whose name
/// starts with `#`.
fn temp_ident(name: &str, dialect: Dialect) -> Cow<'_, str> {
    match dialect {
        Dialect::MsSql => {
            let plain = !name.is_empty()
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if plain {
                Cow::Owned(format!("#{name}"))
            } else {
                Cow::Owned(format!("[#{}]", name.replace(']', "]]")))
            }
        }
        _ => ident(name, dialect),
    }
}
