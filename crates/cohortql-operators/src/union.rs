//! `union`: all rows of every upstream.

use cohortql_core::error::Result;
use cohortql_sql::Query;
use cohortql_temp::{Connection, TreeContext};

use crate::metadata::{KidLimit, OperatorDescriptor};
use crate::node::QueryNode;
use crate::traits::Operator;

pub static UNION: OperatorDescriptor = OperatorDescriptor {
    preferred_name: "Union",
    operation: "union",
    max_kids: KidLimit::Many,
    arguments: &[],
    options: &[],
    desc: Some("Pools the results of all upstream operators, keeping duplicates."),
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Union;

impl Operator for Union {
    fn descriptor(&self) -> &'static OperatorDescriptor {
        &UNION
    }

    // Upstreams are already canonical and person-filtered, so their rows
    // stack directly.
    fn query(&self, node: &QueryNode, ctx: &TreeContext, conn: &dyn Connection) -> Result<Query> {
        let branches = node
            .upstreams()
            .iter()
            .map(|up| up.evaluate(ctx, conn))
            .collect::<Result<Vec<_>>>()?;
        Query::union_all(branches)
    }
}
