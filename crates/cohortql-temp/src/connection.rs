//! Abstract store interface.

use cohortql_core::catalog;
use cohortql_core::error::{Error, Result};
use cohortql_sql::{render_statement, Dialect, Statement};

/// A session against the target store.
///
/// Temp tables created through a connection are scoped to it; nothing else
/// is persisted by the compiler.
pub trait Connection {
    /// Dialect identifier as the store reports it (e.g. `"postgres"`).
    fn database_type(&self) -> &str;

    /// Parsed dialect; unknown identifiers are `Error::UnsupportedDialect`.
    fn dialect(&self) -> Result<Dialect> {
        self.database_type().parse()
    }

    /// Column names of a source table, in table order.
    fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        catalog::table_columns(table)
            .map(|cols| cols.iter().map(|c| c.to_string()).collect())
            .ok_or_else(|| Error::Store(format!("unknown table '{table}'")))
    }

    /// Execute one statement of SQL text.
    fn execute(&mut self, sql: &str) -> Result<()>;

    /// Render `stmt` in this connection's dialect and execute it.
    fn run(&mut self, stmt: &Statement) -> Result<()> {
        let sql = render_statement(stmt, self.dialect()?);
        self.execute(&sql)
    }
}
