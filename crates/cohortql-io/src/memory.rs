//! In-memory recording connection for tests and dry runs.

use std::collections::HashMap;

use cohortql_core::error::{Error, Result};
use cohortql_temp::Connection;

/// Records executed SQL in order; never touches a real store.
#[derive(Debug, Clone)]
pub struct MemoryConnection {
    database_type: String,
    statements: Vec<String>,
    tables: HashMap<String, Vec<String>>,
    fail_on: Option<String>,
}

impl MemoryConnection {
    pub fn new(database_type: impl Into<String>) -> Self {
        Self {
            database_type: database_type.into(),
            statements: Vec::new(),
            tables: HashMap::new(),
            fail_on: None,
        }
    }

    /// Override (or add) the columns reported for `table`.
    pub fn with_table(mut self, table: impl Into<String>, columns: &[&str]) -> Self {
        self.tables.insert(
            table.into(),
            columns.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    /// Make `execute` fail for any statement containing `needle`.
    pub fn fail_on(mut self, needle: impl Into<String>) -> Self {
        self.fail_on = Some(needle.into());
        self
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Number of recorded statements starting with `prefix`.
    pub fn count_prefixed(&self, prefix: &str) -> usize {
        self.statements
            .iter()
            .filter(|s| s.starts_with(prefix))
            .count()
    }

    /// Position of the first statement containing `needle`.
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.statements.iter().position(|s| s.contains(needle))
    }

    pub fn clear(&mut self) {
        self.statements.clear();
    }
}

impl Default for MemoryConnection {
    fn default() -> Self {
        Self::new("postgres")
    }
}

impl Connection for MemoryConnection {
    fn database_type(&self) -> &str {
        &self.database_type
    }

    fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        if let Some(cols) = self.tables.get(table) {
            return Ok(cols.clone());
        }
        cohortql_core::catalog::table_columns(table)
            .map(|cols| cols.iter().map(|c| c.to_string()).collect())
            .ok_or_else(|| Error::Store(format!("unknown table '{table}'")))
    }

    fn execute(&mut self, sql: &str) -> Result<()> {
        if let Some(needle) = &self.fail_on {
            if sql.contains(needle.as_str()) {
                return Err(Error::Store(format!("injected failure on: {sql}")));
            }
        }
        self.statements.push(sql.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohortql_sql::{Dialect, Statement};

    #[test]
    fn records_statements_in_order() {
        let mut conn = MemoryConnection::default();
        conn.execute("SELECT 1").unwrap();
        conn.run(&Statement::DropTableIfExists { table: "t".into() })
            .unwrap();
        assert_eq!(conn.statements(), &["SELECT 1", "DROP TABLE IF EXISTS t"]);
        assert_eq!(conn.count_prefixed("DROP"), 1);
        assert_eq!(conn.position("DROP"), Some(1));
    }

    #[test]
    fn table_overrides_win_over_catalog() {
        let conn = MemoryConnection::default().with_table("person", &["person_id"]);
        assert_eq!(conn.table_columns("person").unwrap(), vec!["person_id"]);
        assert!(conn
            .table_columns("death")
            .unwrap()
            .contains(&"death_date".to_string()));
        assert!(conn.table_columns("nope").is_err());
    }

    #[test]
    fn reports_dialect_and_unknown_dialects() {
        assert_eq!(
            MemoryConnection::new("oracle").dialect().unwrap(),
            Dialect::Oracle
        );
        assert!(matches!(
            MemoryConnection::new("informix").dialect(),
            Err(Error::UnsupportedDialect(_))
        ));
    }

    #[test]
    fn injected_failures_are_store_errors() {
        let mut conn = MemoryConnection::default().fail_on("INSERT");
        assert!(conn.execute("CREATE TABLE t (x int)").is_ok());
        assert!(matches!(
            conn.execute("INSERT INTO t VALUES (1)"),
            Err(Error::Store(_))
        ));
    }
}
