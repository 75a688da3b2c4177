//! `QueryNode`: one operator in a compiled tree.

use std::collections::BTreeSet;

use once_cell::unsync::OnceCell;

use cohortql_core::error::{Error, Result};
use cohortql_core::id::NodeId;
use cohortql_core::types::{CriterionType, Literal};
use cohortql_sql::{col, render_query, Expr, Query};
use cohortql_temp::{Connection, TreeContext};

use crate::columns::columns;
use crate::metadata::OperatorDescriptor;
use crate::options::NodeOptions;
use crate::traits::Operator;

#[derive(Debug)]
pub struct QueryNode {
    id: NodeId,
    upstreams: Vec<QueryNode>,
    arguments: Vec<Literal>,
    options: NodeOptions,
    operator: Box<dyn Operator>,
    types: OnceCell<BTreeSet<CriterionType>>,
}

impl QueryNode {
    /// Assemble a node. Operators that declare a concrete type cannot take
    /// upstreams.
    pub fn new(
        id: NodeId,
        operator: Box<dyn Operator>,
        upstreams: Vec<QueryNode>,
        arguments: Vec<Literal>,
        options: NodeOptions,
    ) -> Result<Self> {
        if !upstreams.is_empty() {
            if let Some(t) = operator.declared_type() {
                return Err(Error::MalformedTree(format!(
                    "operator '{}' declares type '{t}' but has upstreams",
                    operator.name()
                )));
            }
        }
        Ok(Self {
            id,
            upstreams,
            arguments,
            options,
            operator,
            types: OnceCell::new(),
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.operator.name()
    }

    pub fn descriptor(&self) -> &'static OperatorDescriptor {
        self.operator.descriptor()
    }

    pub fn upstreams(&self) -> &[QueryNode] {
        &self.upstreams
    }

    pub fn arguments(&self) -> &[Literal] {
        &self.arguments
    }

    pub fn options(&self) -> &NodeOptions {
        &self.options
    }

    pub fn is_leaf(&self) -> bool {
        self.upstreams.is_empty()
    }

    /// First upstream, if any.
    pub fn stream(&self) -> Option<&QueryNode> {
        self.upstreams.first()
    }

    pub fn label(&self) -> Option<&str> {
        self.options.label.as_deref()
    }

    /// Concrete types this subtree can produce. Computed once.
    pub fn types(&self) -> Result<&BTreeSet<CriterionType>> {
        self.types.get_or_try_init(|| self.determine_types())
    }

    fn determine_types(&self) -> Result<BTreeSet<CriterionType>> {
        if self.is_leaf() {
            return self
                .operator
                .declared_type()
                .map(|t| BTreeSet::from([t]))
                .ok_or_else(|| {
                    Error::MalformedTree(format!(
                        "leaf operator '{}' does not declare a type",
                        self.name()
                    ))
                });
        }
        let mut types = BTreeSet::new();
        for up in &self.upstreams {
            types.extend(up.types()?.iter().copied());
        }
        Ok(types)
    }

    /// Lazy description of this node's rows in the canonical shape.
    pub fn evaluate(&self, ctx: &TreeContext, conn: &dyn Connection) -> Result<Query> {
        if self.is_leaf() {
            self.types()?;
        }
        let query = self.operator.query(self, ctx, conn)?;
        self.select_it(query, self.operator.declared_type(), ctx, conn)
    }

    /// Project `query` onto the canonical row and, at leaves only, restrict it
    /// to the context's person allowlist.
    pub fn select_it(
        &self,
        query: Query,
        local_type: Option<CriterionType>,
        ctx: &TreeContext,
        conn: &dyn Connection,
    ) -> Result<Query> {
        let items = columns(&query, local_type, conn.dialect()?);
        let query = query.select(items)?;
        match ctx.person_ids() {
            Some(ids) if self.is_leaf() => {
                #[cfg(feature = "tracing")]
                tracing::trace!(node = %self.id, operator = self.name(), persons = ids.len(), "restricting leaf to person allowlist");
                let list = ids.iter().map(|&id| Expr::Int(id)).collect();
                Ok(query.filter(col("person_id").in_list(list)).from_self())
            }
            _ => Ok(query),
        }
    }

    pub fn sql(&self, ctx: &TreeContext, conn: &dyn Connection) -> Result<String> {
        Ok(render_query(&self.evaluate(ctx, conn)?, conn.dialect()?))
    }

    /// Build every temp table this subtree needs, children before parents.
    pub fn build_temp_tables(
        &self,
        ctx: &mut TreeContext,
        conn: &mut dyn Connection,
    ) -> Result<()> {
        for up in &self.upstreams {
            up.build_temp_tables(ctx, conn)?;
        }
        let needed = self.operator.needed_temp_tables(self, ctx, &*conn)?;
        let mut names = Vec::with_capacity(needed.len());
        for (name, steps) in needed {
            ctx.temp_tables_mut().ensure(&name, steps, &mut *conn)?;
            names.push(name);
        }
        for name in &names {
            ctx.temp_tables_mut().populate(name, &mut *conn)?;
        }
        Ok(())
    }

    /// Run the build phase and return the SQL of every registered temp table.
    pub fn sql_for_temp_tables(
        &self,
        ctx: &mut TreeContext,
        conn: &mut dyn Connection,
    ) -> Result<Vec<String>> {
        self.build_temp_tables(ctx, conn)?;
        ctx.temp_tables().sql(conn.dialect()?)
    }
}
