//! Target-store dialects and the type names they spell.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use cohortql_core::error::Error;
use cohortql_core::schema::DataType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgres,
    Sqlite,
    DuckDb,
    Oracle,
    MsSql,
}

/// How a `YYYY-MM-DD` string becomes a date value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateConstruction {
    /// `TO_DATE(s, 'YYYY-MM-DD')`
    Function,
    /// `CONVERT(DATETIME, s)`
    Convert,
    /// `CAST(s AS DATE)`
    Cast,
}

impl Dialect {
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
            Dialect::DuckDb => "duckdb",
            Dialect::Oracle => "oracle",
            Dialect::MsSql => "mssql",
        }
    }

    pub fn date_construction(self) -> DateConstruction {
        match self {
            Dialect::Oracle => DateConstruction::Function,
            Dialect::MsSql => DateConstruction::Convert,
            Dialect::Postgres | Dialect::Sqlite | Dialect::DuckDb => DateConstruction::Cast,
        }
    }

    /// Spelling of `ty` in this dialect.
    pub fn type_name(self, ty: SqlType) -> &'static str {
        match (ty, self) {
            (SqlType::BigInt, Dialect::Oracle) => "NUMBER(19)",
            (SqlType::BigInt, _) => "BIGINT",
            (SqlType::Float, Dialect::Oracle) => "BINARY_DOUBLE",
            (SqlType::Float, Dialect::MsSql) => "FLOAT",
            (SqlType::Float, Dialect::Sqlite) => "REAL",
            (SqlType::Float, _) => "DOUBLE PRECISION",
            (SqlType::Text, Dialect::Oracle) => "VARCHAR2(255)",
            (SqlType::Text, _) => "VARCHAR(255)",
            (SqlType::Date, _) => "DATE",
            (SqlType::DateTime, Dialect::MsSql) => "DATETIME",
            (SqlType::DateTime, _) => "TIMESTAMP",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "sqlite" => Ok(Dialect::Sqlite),
            "duckdb" => Ok(Dialect::DuckDb),
            "oracle" => Ok(Dialect::Oracle),
            "mssql" | "sqlserver" => Ok(Dialect::MsSql),
            _ => Err(Error::UnsupportedDialect(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    BigInt,
    Float,
    Text,
    Date,
    DateTime,
}

impl From<DataType> for SqlType {
    fn from(dt: DataType) -> Self {
        match dt {
            DataType::Int64 => SqlType::BigInt,
            DataType::Float64 => SqlType::Float,
            DataType::Utf8 => SqlType::Text,
            DataType::Date => SqlType::Date,
        }
    }
}
