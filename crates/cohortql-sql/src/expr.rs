//! Scalar expressions and projection items.

use serde::{Deserialize, Serialize};

use cohortql_core::schema::DataType;

use crate::dialect::SqlType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Column(String),
    Null,
    Str(String),
    Int(i64),
    Cast {
        expr: Box<Expr>,
        to: SqlType,
    },
    /// SQL Server `CONVERT(type, expr)`.
    Convert {
        to: SqlType,
        expr: Box<Expr>,
    },
    Function {
        name: String,
        args: Vec<Expr>,
    },
    /// String concatenation; the operator is dialect-specific.
    Concat(Vec<Expr>),
    Eq {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
    },
}

pub fn col(name: impl Into<String>) -> Expr {
    Expr::Column(name.into())
}

impl Expr {
    pub fn str(s: impl Into<String>) -> Expr {
        Expr::Str(s.into())
    }

    pub fn cast(self, to: SqlType) -> Expr {
        Expr::Cast {
            expr: Box::new(self),
            to,
        }
    }

    pub fn cast_string(self) -> Expr {
        self.cast(SqlType::Text)
    }

    pub fn func(name: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Function {
            name: name.into(),
            args,
        }
    }

    pub fn coalesce(args: Vec<Expr>) -> Expr {
        Expr::func("COALESCE", args)
    }

    /// `NULL` cast to the SQL spelling of a canonical data type.
    pub fn typed_null(dt: DataType) -> Expr {
        Expr::Null.cast(SqlType::from(dt))
    }

    pub fn eq(self, other: Expr) -> Expr {
        Expr::Eq {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    pub fn in_list(self, list: Vec<Expr>) -> Expr {
        Expr::InList {
            expr: Box::new(self),
            list,
        }
    }

    pub fn alias(self, name: impl Into<String>) -> SelectItem {
        SelectItem {
            expr: self,
            alias: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectItem {
    /// Bare column reference, projected under its own name.
    pub fn column(name: impl Into<String>) -> Self {
        Self {
            expr: col(name),
            alias: None,
        }
    }

    /// Name this item has in the result set, if it has one.
    pub fn output_name(&self) -> Option<&str> {
        match (&self.alias, &self.expr) {
            (Some(alias), _) => Some(alias),
            (None, Expr::Column(name)) => Some(name),
            _ => None,
        }
    }

    /// True for an unaliased (or self-aliased) plain column reference.
    pub fn is_passthrough(&self) -> bool {
        match (&self.expr, &self.alias) {
            (Expr::Column(_), None) => true,
            (Expr::Column(name), Some(alias)) => name == alias,
            _ => false,
        }
    }
}
