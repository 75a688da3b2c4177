//! Temp-table registry for stateful operators.
//!
//! Each logical name maps to exactly one physical table per tree. The first
//! request bootstraps the table from a typed-NULL projection that matches no
//! rows, so downstream SQL can reference its columns before any data exists.
//! Later requests for the same name get the registered table back untouched.
//!
//! Sharp edge: deduplication is by logical name only. Two operators that ask
//! for different contents under the same name share one physical table, and
//! the second request's population steps are ignored.

use std::collections::HashMap;

use cohortql_core::error::{Error, Result};
use cohortql_core::hash::short_name;
use cohortql_core::schema::{canonical_schema, CANONICAL_COLUMNS};
use cohortql_sql::{Dialect, Expr, Query, Statement};

use crate::connection::Connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempTableState {
    Unbuilt,
    /// Created with the canonical columns and no rows.
    Bootstrapped,
    Populated,
}

#[derive(Debug, Clone)]
pub struct TempTable {
    logical_name: String,
    name: String,
    steps: Vec<Query>,
    state: TempTableState,
}

impl TempTable {
    pub fn new(logical_name: impl Into<String>, name: impl Into<String>, steps: Vec<Query>) -> Self {
        Self {
            logical_name: logical_name.into(),
            name: name.into(),
            steps,
            state: TempTableState::Unbuilt,
        }
    }

    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    /// Physical identifier in the store.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> TempTableState {
        self.state
    }

    /// Scan of this table, exposing the canonical columns.
    pub fn query(&self) -> Query {
        Query::temp_table(
            self.name.clone(),
            CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect(),
        )
    }

    /// Bootstrap followed by the population statements.
    pub fn statements(&self) -> Result<Vec<Statement>> {
        let mut out = Vec::with_capacity(self.steps.len() + 1);
        out.push(Statement::CreateTempTableAs {
            table: self.name.clone(),
            query: bootstrap_row()?,
        });
        out.extend(self.population());
        Ok(out)
    }

    pub fn sql(&self, dialect: Dialect) -> Result<Vec<String>> {
        Ok(self
            .statements()?
            .iter()
            .map(|s| cohortql_sql::render_statement(s, dialect))
            .collect())
    }

    fn population(&self) -> impl Iterator<Item = Statement> + '_ {
        self.steps.iter().map(|q| Statement::InsertSelect {
            table: self.name.clone(),
            query: q.clone(),
        })
    }
}

/// Typed NULLs named after every canonical column, under a predicate that
/// is never true: creating a table from it yields the schema and no rows.
pub fn bootstrap_row() -> Result<Query> {
    let items = canonical_schema()
        .fields
        .into_iter()
        .map(|f| Expr::typed_null(f.data_type).alias(f.name))
        .collect();
    Ok(Query::values(items)?.filter(Expr::Int(1).eq(Expr::Int(0))))
}

#[derive(Debug)]
pub struct TempTableManager {
    prefix: String,
    drop_existing: bool,
    tables: Vec<TempTable>,
    by_name: HashMap<String, usize>,
}

impl Default for TempTableManager {
    fn default() -> Self {
        Self::new("_", true)
    }
}

impl TempTableManager {
    pub fn new(prefix: impl Into<String>, drop_existing: bool) -> Self {
        Self {
            prefix: prefix.into(),
            drop_existing,
            tables: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Physical name a logical name maps to.
    pub fn physical_name(&self, logical_name: &str) -> String {
        short_name(&self.prefix, logical_name)
    }

    pub fn get(&self, logical_name: &str) -> Option<&TempTable> {
        self.by_name.get(logical_name).map(|&i| &self.tables[i])
    }

    /// Registered tables in bootstrap order.
    pub fn tables(&self) -> &[TempTable] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Return the table registered under `logical_name`, bootstrapping it on
    /// first request. A failed bootstrap registers nothing.
    pub fn ensure(
        &mut self,
        logical_name: &str,
        steps: Vec<Query>,
        conn: &mut dyn Connection,
    ) -> Result<&TempTable> {
        if let Some(&i) = self.by_name.get(logical_name) {
            #[cfg(feature = "tracing")]
            tracing::debug!(logical_name, table = %self.tables[i].name, "temp table already registered");
            return Ok(&self.tables[i]);
        }

        let mut table = TempTable::new(logical_name, self.physical_name(logical_name), steps);
        if self.drop_existing {
            conn.run(&Statement::DropTableIfExists {
                table: table.name.clone(),
            })?;
        }
        conn.run(&Statement::CreateTempTableAs {
            table: table.name.clone(),
            query: bootstrap_row()?,
        })?;
        table.state = TempTableState::Bootstrapped;

        #[cfg(feature = "tracing")]
        tracing::debug!(logical_name, table = %table.name, "bootstrapped temp table");

        let idx = self.tables.len();
        self.tables.push(table);
        self.by_name.insert(logical_name.to_string(), idx);
        Ok(&self.tables[idx])
    }

    /// Run the population statements of a bootstrapped table once.
    pub fn populate(&mut self, logical_name: &str, conn: &mut dyn Connection) -> Result<()> {
        let idx = *self.by_name.get(logical_name).ok_or_else(|| {
            Error::Invariant(format!("temp table '{logical_name}' was never ensured"))
        })?;
        let table = &mut self.tables[idx];
        match table.state {
            TempTableState::Populated => return Ok(()),
            TempTableState::Unbuilt => {
                return Err(Error::Invariant(format!(
                    "temp table '{logical_name}' populated before bootstrap"
                )))
            }
            TempTableState::Bootstrapped => {}
        }
        for stmt in table.population().collect::<Vec<_>>() {
            conn.run(&stmt)?;
        }
        table.state = TempTableState::Populated;

        #[cfg(feature = "tracing")]
        tracing::debug!(logical_name, table = %table.name, steps = table.steps.len(), "populated temp table");

        Ok(())
    }

    /// SQL of every registered table, in bootstrap order.
    pub fn sql(&self, dialect: Dialect) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for t in &self.tables {
            out.extend(t.sql(dialect)?);
        }
        Ok(out)
    }
}
