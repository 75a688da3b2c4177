//! Concrete source-table types and literal values.
//!
//! A `CriterionType` names the CDM table a leaf draws from and knows which of
//! that table's columns play the canonical roles (id, start/end, source value).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionType {
    ConditionOccurrence,
    Death,
    DrugExposure,
    DrugCost,
    PayerPlanPeriod,
    Person,
    ProcedureOccurrence,
    ProcedureCost,
    Observation,
    ObservationPeriod,
    VisitOccurrence,
}

/// Where a canonical date comes from for a given type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    Column(&'static str),
    /// Assembled from integer year/month/day columns.
    Assembled {
        year: &'static str,
        month: &'static str,
        day: &'static str,
    },
    /// The table has no notion of a date.
    Absent,
}

const BIRTH_DATE: DateSource = DateSource::Assembled {
    year: "year_of_birth",
    month: "month_of_birth",
    day: "day_of_birth",
};

impl CriterionType {
    pub const ALL: [CriterionType; 11] = [
        CriterionType::ConditionOccurrence,
        CriterionType::Death,
        CriterionType::DrugExposure,
        CriterionType::DrugCost,
        CriterionType::PayerPlanPeriod,
        CriterionType::Person,
        CriterionType::ProcedureOccurrence,
        CriterionType::ProcedureCost,
        CriterionType::Observation,
        CriterionType::ObservationPeriod,
        CriterionType::VisitOccurrence,
    ];

    pub fn as_str(self) -> &'static str {
        use CriterionType::*;
        match self {
            ConditionOccurrence => "condition_occurrence",
            Death => "death",
            DrugExposure => "drug_exposure",
            DrugCost => "drug_cost",
            PayerPlanPeriod => "payer_plan_period",
            Person => "person",
            ProcedureOccurrence => "procedure_occurrence",
            ProcedureCost => "procedure_cost",
            Observation => "observation",
            ObservationPeriod => "observation_period",
            VisitOccurrence => "visit_occurrence",
        }
    }

    /// Source table holding rows of this type.
    pub fn table_name(self) -> &'static str {
        self.as_str()
    }

    /// Column that identifies one criterion of this type.
    ///
    /// `death` rows are keyed by the person they belong to.
    pub fn id_column(self) -> String {
        match self {
            CriterionType::Death => "person_id".to_string(),
            other => format!("{}_id", other.as_str()),
        }
    }

    pub fn start_date(self) -> DateSource {
        use CriterionType::*;
        match self {
            ConditionOccurrence => DateSource::Column("condition_start_date"),
            Death => DateSource::Column("death_date"),
            DrugExposure => DateSource::Column("drug_exposure_start_date"),
            PayerPlanPeriod => DateSource::Column("payer_plan_period_start_date"),
            Person => BIRTH_DATE,
            ProcedureOccurrence => DateSource::Column("procedure_date"),
            Observation => DateSource::Column("observation_date"),
            ObservationPeriod => DateSource::Column("observation_period_start_date"),
            VisitOccurrence => DateSource::Column("visit_start_date"),
            DrugCost | ProcedureCost => DateSource::Absent,
        }
    }

    /// Types without an end date reuse their start column.
    pub fn end_date(self) -> DateSource {
        use CriterionType::*;
        match self {
            ConditionOccurrence => DateSource::Column("condition_end_date"),
            DrugExposure => DateSource::Column("drug_exposure_end_date"),
            PayerPlanPeriod => DateSource::Column("payer_plan_period_end_date"),
            ObservationPeriod => DateSource::Column("observation_period_end_date"),
            VisitOccurrence => DateSource::Column("visit_end_date"),
            other => other.start_date(),
        }
    }

    pub fn source_value_column(self) -> Option<&'static str> {
        use CriterionType::*;
        match self {
            ConditionOccurrence => Some("condition_source_value"),
            Death => Some("cause_of_death_source_value"),
            DrugExposure => Some("drug_source_value"),
            PayerPlanPeriod => Some("payer_plan_period_source_value"),
            Person => Some("person_source_value"),
            ProcedureOccurrence => Some("procedure_source_value"),
            Observation => Some("observation_source_value"),
            VisitOccurrence => Some("place_of_service_source_value"),
            DrugCost | ProcedureCost | ObservationPeriod => None,
        }
    }
}

impl fmt::Display for CriterionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CriterionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CriterionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::UnknownType(s.to_string()))
    }
}

/// Non-node positional value handed to an operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Literal {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Text form used when a literal is matched against a string column.
    pub fn to_text(&self) -> String {
        match self {
            Literal::Bool(b) => b.to_string(),
            Literal::Int(i) => i.to_string(),
            Literal::Float(f) => f.to_string(),
            Literal::Str(s) => s.clone(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
