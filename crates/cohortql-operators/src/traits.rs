//! Operator trait.
//!
//! A `QueryNode` owns one boxed `Operator` and asks it for the raw query of
//! the node; the node then projects that query onto the canonical row. The
//! build phase additionally asks which temp tables the operator needs.

use std::fmt;

use cohortql_core::error::Result;
use cohortql_core::types::CriterionType;
use cohortql_sql::Query;
use cohortql_temp::{Connection, TreeContext};

use crate::metadata::OperatorDescriptor;
use crate::node::QueryNode;

/// A temp table an operator depends on: logical name plus the queries that
/// populate it.
pub type NeededTempTable = (String, Vec<Query>);

pub trait Operator: fmt::Debug {
    /// Static metadata (name, kid limit, argument and option schema).
    fn descriptor(&self) -> &'static OperatorDescriptor;

    /// Stable operator name as used in statements.
    fn name(&self) -> &'static str {
        self.descriptor().operation
    }

    /// The concrete table type a leaf draws from. Operators that take
    /// upstreams must return `None`.
    fn declared_type(&self) -> Option<CriterionType> {
        None
    }

    /// Raw query for `node`, before projection onto the canonical row.
    ///
    /// Must be free of side effects: anything that needs to exist in the store
    /// is requested through `needed_temp_tables` instead.
    fn query(&self, node: &QueryNode, ctx: &TreeContext, conn: &dyn Connection) -> Result<Query>;

    /// Temp tables this node needs before its query can run. Called after
    /// every upstream has built its own.
    fn needed_temp_tables(
        &self,
        _node: &QueryNode,
        _ctx: &TreeContext,
        _conn: &dyn Connection,
    ) -> Result<Vec<NeededTempTable>> {
        Ok(Vec::new())
    }
}
