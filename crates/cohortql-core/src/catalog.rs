//! Column lists of the CDM source tables.
//!
//! Connections report table columns through `Connection::table_columns`; the
//! default answer comes from here. Column presence is what lets the column
//! synthesizer decide between passthrough and a typed NULL.

use crate::types::CriterionType;

const PERSON: &[&str] = &[
    "person_id",
    "gender_concept_id",
    "year_of_birth",
    "month_of_birth",
    "day_of_birth",
    "race_concept_id",
    "ethnicity_concept_id",
    "location_id",
    "provider_id",
    "care_site_id",
    "person_source_value",
    "gender_source_value",
    "race_source_value",
    "ethnicity_source_value",
];

const CONDITION_OCCURRENCE: &[&str] = &[
    "condition_occurrence_id",
    "person_id",
    "condition_concept_id",
    "condition_start_date",
    "condition_end_date",
    "condition_type_concept_id",
    "stop_reason",
    "associated_provider_id",
    "visit_occurrence_id",
    "condition_source_value",
];

const DEATH: &[&str] = &[
    "person_id",
    "death_date",
    "death_type_concept_id",
    "cause_of_death_concept_id",
    "cause_of_death_source_value",
];

const DRUG_EXPOSURE: &[&str] = &[
    "drug_exposure_id",
    "person_id",
    "drug_concept_id",
    "drug_exposure_start_date",
    "drug_exposure_end_date",
    "drug_type_concept_id",
    "stop_reason",
    "refills",
    "quantity",
    "days_supply",
    "sig",
    "prescribing_provider_id",
    "visit_occurrence_id",
    "relevant_condition_concept_id",
    "drug_source_value",
];

const DRUG_COST: &[&str] = &[
    "drug_cost_id",
    "drug_exposure_id",
    "paid_copay",
    "paid_coinsurance",
    "paid_toward_deductible",
    "paid_by_payer",
    "paid_by_coordination_benefits",
    "total_out_of_pocket",
    "total_paid",
    "ingredient_cost",
    "dispensing_fee",
    "average_wholesale_price",
    "payer_plan_period_id",
];

const PAYER_PLAN_PERIOD: &[&str] = &[
    "payer_plan_period_id",
    "person_id",
    "payer_plan_period_start_date",
    "payer_plan_period_end_date",
    "payer_plan_period_source_value",
    "plan_source_value",
    "family_source_value",
];

const PROCEDURE_OCCURRENCE: &[&str] = &[
    "procedure_occurrence_id",
    "person_id",
    "procedure_concept_id",
    "procedure_date",
    "procedure_type_concept_id",
    "associated_provider_id",
    "visit_occurrence_id",
    "relevant_condition_concept_id",
    "procedure_source_value",
];

const PROCEDURE_COST: &[&str] = &[
    "procedure_cost_id",
    "procedure_occurrence_id",
    "paid_copay",
    "paid_coinsurance",
    "paid_toward_deductible",
    "paid_by_payer",
    "paid_by_coordination_benefits",
    "total_out_of_pocket",
    "total_paid",
    "disease_class_concept_id",
    "revenue_code_concept_id",
    "payer_plan_period_id",
    "disease_class_source_value",
    "revenue_code_source_value",
];

const OBSERVATION: &[&str] = &[
    "observation_id",
    "person_id",
    "observation_concept_id",
    "observation_date",
    "observation_time",
    "value_as_number",
    "value_as_string",
    "value_as_concept_id",
    "unit_concept_id",
    "range_low",
    "range_high",
    "observation_type_concept_id",
    "associated_provider_id",
    "visit_occurrence_id",
    "relevant_condition_concept_id",
    "observation_source_value",
    "units_source_value",
];

const OBSERVATION_PERIOD: &[&str] = &[
    "observation_period_id",
    "person_id",
    "observation_period_start_date",
    "observation_period_end_date",
];

const VISIT_OCCURRENCE: &[&str] = &[
    "visit_occurrence_id",
    "person_id",
    "visit_start_date",
    "visit_end_date",
    "place_of_service_concept_id",
    "care_site_id",
    "place_of_service_source_value",
];

/// Known columns of a CDM table, `None` for tables outside the catalog.
pub fn table_columns(table: &str) -> Option<&'static [&'static str]> {
    let cols = match table {
        "person" => PERSON,
        "condition_occurrence" => CONDITION_OCCURRENCE,
        "death" => DEATH,
        "drug_exposure" => DRUG_EXPOSURE,
        "drug_cost" => DRUG_COST,
        "payer_plan_period" => PAYER_PLAN_PERIOD,
        "procedure_occurrence" => PROCEDURE_OCCURRENCE,
        "procedure_cost" => PROCEDURE_COST,
        "observation" => OBSERVATION,
        "observation_period" => OBSERVATION_PERIOD,
        "visit_occurrence" => VISIT_OCCURRENCE,
        _ => return None,
    };
    Some(cols)
}

/// Cost tables carry no `person_id`; they reach a person through the event
/// they price. Returns that event type and the shared key column.
pub fn person_link(ty: CriterionType) -> Option<(CriterionType, &'static str)> {
    match ty {
        CriterionType::DrugCost => Some((CriterionType::DrugExposure, "drug_exposure_id")),
        CriterionType::ProcedureCost => Some((
            CriterionType::ProcedureOccurrence,
            "procedure_occurrence_id",
        )),
        _ => None,
    }
}
