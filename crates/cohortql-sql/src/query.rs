//! Lazy query descriptions and the statements the build phase issues.
//!
//! A `Query` always knows the names of the columns it exposes. That is the
//! only schema information the compiler needs, and tracking it here keeps
//! compilation free of store round-trips.

use serde::{Deserialize, Serialize};

use cohortql_core::error::{Error, Result};

use crate::expr::{Expr, SelectItem};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Source {
    Table(String),
    /// A session-scoped table created by the build phase.
    TempTable(String),
    /// `left INNER JOIN right USING (key)`
    JoinUsing {
        left: String,
        right: String,
        key: String,
    },
    Subquery(Box<Query>),
    UnionAll(Vec<Query>),
    /// No `FROM` clause (`FROM DUAL` where the dialect insists).
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub source: Source,
    /// `None` selects every column of the source.
    pub projection: Option<Vec<SelectItem>>,
    /// Conjunction of predicates over the source's columns.
    pub predicates: Vec<Expr>,
    columns: Vec<String>,
}

impl Query {
    pub fn table(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            source: Source::Table(name.into()),
            projection: None,
            predicates: Vec::new(),
            columns,
        }
    }

    pub fn temp_table(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            source: Source::TempTable(name.into()),
            projection: None,
            predicates: Vec::new(),
            columns,
        }
    }

    /// Inner join of two tables on a shared key; the key is exposed once.
    pub fn join_using(
        left: impl Into<String>,
        left_columns: Vec<String>,
        right: impl Into<String>,
        right_columns: Vec<String>,
        key: impl Into<String>,
    ) -> Self {
        let mut columns = left_columns;
        for c in right_columns {
            if !columns.contains(&c) {
                columns.push(c);
            }
        }
        Self {
            source: Source::JoinUsing {
                left: left.into(),
                right: right.into(),
                key: key.into(),
            },
            projection: None,
            predicates: Vec::new(),
            columns,
        }
    }

    /// `UNION ALL` of branches that must expose the same columns.
    pub fn union_all(branches: Vec<Query>) -> Result<Self> {
        let first = branches
            .first()
            .ok_or_else(|| Error::Invariant("union of zero queries".into()))?;
        let columns = first.columns.clone();
        if let Some(odd) = branches.iter().find(|b| b.columns != columns) {
            return Err(Error::Invariant(format!(
                "union branches disagree on columns: {:?} vs {:?}",
                columns, odd.columns
            )));
        }
        Ok(Self {
            source: Source::UnionAll(branches),
            projection: None,
            predicates: Vec::new(),
            columns,
        })
    }

    /// A single row of expressions with no `FROM`.
    pub fn values(items: Vec<SelectItem>) -> Result<Self> {
        let columns = output_names(&items)?;
        Ok(Self {
            source: Source::Nothing,
            projection: Some(items),
            predicates: Vec::new(),
            columns,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn is_projected(&self) -> bool {
        self.projection.is_some()
    }

    /// Project `items`. An already projected query is wrapped first so the new
    /// items see its output columns.
    pub fn select(self, items: Vec<SelectItem>) -> Result<Self> {
        let mut q = if self.is_projected() {
            self.from_self()
        } else {
            self
        };
        q.columns = output_names(&items)?;
        q.projection = Some(items);
        Ok(q)
    }

    /// Add a predicate over the source's columns.
    pub fn filter(mut self, predicate: Expr) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Wrap this query as the source of a fresh `SELECT *`.
    pub fn from_self(self) -> Self {
        let columns = self.columns.clone();
        Self {
            source: Source::Subquery(Box::new(self)),
            projection: None,
            predicates: Vec::new(),
            columns,
        }
    }

    /// Number of subquery wrappers whose immediate body carries predicates.
    /// Used to inspect where row filters were placed.
    pub fn filtered_subqueries(&self) -> usize {
        match &self.source {
            Source::Subquery(inner) => {
                usize::from(!inner.predicates.is_empty()) + inner.filtered_subqueries()
            }
            Source::UnionAll(branches) => branches.iter().map(Query::filtered_subqueries).sum(),
            _ => 0,
        }
    }
}

fn output_names(items: &[SelectItem]) -> Result<Vec<String>> {
    items
        .iter()
        .map(|item| {
            item.output_name().map(str::to_string).ok_or_else(|| {
                Error::Invariant(format!("projection item without a name: {:?}", item.expr))
            })
        })
        .collect()
}

/// Side-effecting statements issued during the temp-table build phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    DropTableIfExists { table: String },
    /// Materialize `query` as a session-scoped table.
    CreateTempTableAs { table: String, query: Query },
    InsertSelect { table: String, query: Query },
}

impl Statement {
    pub fn table(&self) -> &str {
        match self {
            Statement::DropTableIfExists { table }
            | Statement::CreateTempTableAs { table, .. }
            | Statement::InsertSelect { table, .. } => table,
        }
    }
}
