//! `materialize`: stage an upstream's rows in a named temp table.
//!
//! Downstream SQL scans the temp table instead of repeating the upstream's
//! query. Two `materialize` nodes with the same name share one table.

use cohortql_core::error::{Error, Result};
use cohortql_core::schema::CANONICAL_COLUMNS;
use cohortql_core::types::Literal;
use cohortql_sql::Query;
use cohortql_temp::{Connection, TreeContext};

use crate::metadata::{ArgSpec, KidLimit, OperatorDescriptor, ValueKind};
use crate::node::QueryNode;
use crate::traits::{NeededTempTable, Operator};

pub static MATERIALIZE: OperatorDescriptor = OperatorDescriptor {
    preferred_name: "Materialize",
    operation: "materialize",
    max_kids: KidLimit::One,
    arguments: &[ArgSpec {
        name: "name",
        kind: ValueKind::String,
        variadic: false,
    }],
    options: &[],
    desc: Some("Stores the upstream's results in a temporary table and reads them back from there."),
};

#[derive(Debug, Clone)]
pub struct Materialize {
    name: String,
}

impl Materialize {
    pub fn new(args: &[Literal]) -> Result<Self> {
        match args {
            // Same literals the descriptor's `name: string` accepts.
            [name] if ValueKind::String.accepts_literal(name) && !name.to_text().is_empty() => {
                Ok(Self {
                    name: name.to_text(),
                })
            }
            _ => Err(Error::MalformedTree(
                "materialize takes exactly one non-empty name".into(),
            )),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.name
    }
}

impl Operator for Materialize {
    fn descriptor(&self) -> &'static OperatorDescriptor {
        &MATERIALIZE
    }

    fn query(&self, _node: &QueryNode, ctx: &TreeContext, _conn: &dyn Connection) -> Result<Query> {
        let manager = ctx.temp_tables();
        Ok(match manager.get(&self.name) {
            Some(table) => table.query(),
            // Not built yet: describe the scan by the name it will get.
            None => Query::temp_table(
                manager.physical_name(&self.name),
                CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect(),
            ),
        })
    }

    fn needed_temp_tables(
        &self,
        node: &QueryNode,
        ctx: &TreeContext,
        conn: &dyn Connection,
    ) -> Result<Vec<NeededTempTable>> {
        let upstream = node.stream().ok_or_else(|| {
            Error::MalformedTree("materialize needs exactly one upstream".into())
        })?;
        Ok(vec![(self.name.clone(), vec![upstream.evaluate(ctx, conn)?])])
    }
}
