//! The canonical row schema every operator's output must satisfy.
//!
//! Pure data; rendering of types into SQL lives in `cohortql-sql`.

use serde::{Deserialize, Serialize};

/// Output columns in order. This is a fixed contract shared by every node.
pub const CANONICAL_COLUMNS: [&str; 10] = [
    "person_id",
    "criterion_id",
    "criterion_type",
    "start_date",
    "end_date",
    "value_as_number",
    "value_as_string",
    "value_as_concept_id",
    "units_source_value",
    "source_value",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Identifiers and concept ids (BIGINT).
    Int64,
    Float64,
    Utf8,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn field(&self, idx: usize) -> Option<&Field> {
        self.fields.get(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// Semantic type of a canonical column, `None` for names outside the contract.
pub fn canonical_type(column: &str) -> Option<DataType> {
    let dt = match column {
        "person_id" | "criterion_id" | "value_as_concept_id" => DataType::Int64,
        "criterion_type" | "value_as_string" | "units_source_value" | "source_value" => {
            DataType::Utf8
        }
        "start_date" | "end_date" => DataType::Date,
        "value_as_number" => DataType::Float64,
        _ => return None,
    };
    Some(dt)
}

/// Typed canonical schema, in contract order.
pub fn canonical_schema() -> Schema {
    Schema::new(
        CANONICAL_COLUMNS
            .iter()
            .filter_map(|name| canonical_type(name).map(|dt| Field::new(*name, dt, true)))
            .collect(),
    )
}
