//! Leaf operators: one per concrete source table.

use cohortql_core::catalog::person_link;
use cohortql_core::error::{Error, Result};
use cohortql_core::types::{CriterionType, Literal};
use cohortql_sql::{col, Expr, Query};
use cohortql_temp::{Connection, TreeContext};

use crate::metadata::{ArgSpec, KidLimit, OperatorDescriptor, ValueKind};
use crate::node::QueryNode;
use crate::traits::Operator;

const SOURCE_VALUES: &[ArgSpec] = &[ArgSpec {
    name: "source_values",
    kind: ValueKind::String,
    variadic: true,
}];

macro_rules! source_descriptor {
    ($name:ident, $preferred:literal, $operation:literal, $desc:literal) => {
        static $name: OperatorDescriptor = OperatorDescriptor {
            preferred_name: $preferred,
            operation: $operation,
            max_kids: KidLimit::None,
            arguments: SOURCE_VALUES,
            options: &[],
            desc: Some($desc),
        };
    };
}

source_descriptor!(CONDITION_OCCURRENCE, "Condition Occurrence", "condition_occurrence", "Diagnoses recorded for a person, optionally restricted to source codes.");
source_descriptor!(DEATH, "Death", "death", "Death records; a person has at most one.");
source_descriptor!(DRUG_EXPOSURE, "Drug Exposure", "drug_exposure", "Drug exposures, optionally restricted to drug source values.");
source_descriptor!(DRUG_COST, "Drug Cost", "drug_cost", "Cost records of drug exposures. Dates come out NULL.");
source_descriptor!(PAYER_PLAN_PERIOD, "Payer Plan Period", "payer_plan_period", "Periods of coverage under a payer plan.");
source_descriptor!(PERSON, "Person", "person", "One row per person, dated by birth date.");
source_descriptor!(PROCEDURE_OCCURRENCE, "Procedure Occurrence", "procedure_occurrence", "Procedures performed, optionally restricted to source codes.");
source_descriptor!(PROCEDURE_COST, "Procedure Cost", "procedure_cost", "Cost records of procedures. Dates come out NULL.");
source_descriptor!(OBSERVATION, "Observation", "observation", "Clinical observations.");
source_descriptor!(OBSERVATION_PERIOD, "Observation Period", "observation_period", "Spans during which a person is observed.");
source_descriptor!(VISIT_OCCURRENCE, "Visit Occurrence", "visit_occurrence", "Visits, optionally restricted to place of service.");

pub fn descriptor_for(ty: CriterionType) -> &'static OperatorDescriptor {
    use CriterionType::*;
    match ty {
        ConditionOccurrence => &CONDITION_OCCURRENCE,
        Death => &DEATH,
        DrugExposure => &DRUG_EXPOSURE,
        DrugCost => &DRUG_COST,
        PayerPlanPeriod => &PAYER_PLAN_PERIOD,
        Person => &PERSON,
        ProcedureOccurrence => &PROCEDURE_OCCURRENCE,
        ProcedureCost => &PROCEDURE_COST,
        Observation => &OBSERVATION,
        ObservationPeriod => &OBSERVATION_PERIOD,
        VisitOccurrence => &VISIT_OCCURRENCE,
    }
}

/// Scan of one CDM table, optionally restricted to a set of source values.
#[derive(Debug, Clone)]
pub struct Source {
    ty: CriterionType,
    source_values: Vec<String>,
}

impl Source {
    pub fn new(ty: CriterionType, args: &[Literal]) -> Result<Self> {
        let source_values: Vec<String> = args.iter().map(Literal::to_text).collect();
        if !source_values.is_empty() && ty.source_value_column().is_none() {
            return Err(Error::MalformedTree(format!(
                "'{ty}' has no source value column to restrict by"
            )));
        }
        Ok(Self { ty, source_values })
    }

    pub fn source_values(&self) -> &[String] {
        &self.source_values
    }

    fn scan(&self, conn: &dyn Connection) -> Result<Query> {
        let table = self.ty.table_name();
        let columns = conn.table_columns(table)?;
        // Cost tables carry no person_id; borrow it from the event they cost.
        Ok(match person_link(self.ty) {
            Some((parent, key)) => Query::join_using(
                table,
                columns,
                parent.table_name(),
                conn.table_columns(parent.table_name())?,
                key,
            ),
            None => Query::table(table, columns),
        })
    }
}

impl Operator for Source {
    fn descriptor(&self) -> &'static OperatorDescriptor {
        descriptor_for(self.ty)
    }

    fn declared_type(&self) -> Option<CriterionType> {
        Some(self.ty)
    }

    fn query(&self, _node: &QueryNode, _ctx: &TreeContext, conn: &dyn Connection) -> Result<Query> {
        let query = self.scan(conn)?;
        match (self.ty.source_value_column(), self.source_values.is_empty()) {
            (Some(column), false) => {
                let list = self.source_values.iter().map(Expr::str).collect();
                Ok(query.filter(col(column).in_list(list)))
            }
            _ => Ok(query),
        }
    }
}
