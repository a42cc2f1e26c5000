//! Structured command descriptors consumed by the catalog.
//!
//! These are the engine-facing form of a statement after parsing and name
//! resolution happen upstream; no SQL text appears at this boundary.

use serde::{Deserialize, Serialize};

use crate::schema::ColumnDef;

/// An untyped literal as delivered by the statement layer.
///
/// Validation coerces a literal into the target column's [`opal_common::Value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Literal {
    /// Returns true if this literal denotes an absent value.
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null) || matches!(self, Literal::Text(s) if s.is_empty())
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Integer(v) => write!(f, "{}", v),
            Literal::Float(v) => write!(f, "{}", v),
            Literal::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Comparison operator of a single-predicate condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparator {
    /// Returns the comparator a NOT prefix turns this one into.
    pub fn negate(&self) -> Comparator {
        match self {
            Comparator::Eq => Comparator::Ne,
            Comparator::Ne => Comparator::Eq,
            Comparator::Ge => Comparator::Lt,
            Comparator::Lt => Comparator::Ge,
            Comparator::Le => Comparator::Gt,
            Comparator::Gt => Comparator::Le,
        }
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Comparator::Eq => "=",
            Comparator::Ne => "<>",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
        };
        write!(f, "{}", symbol)
    }
}

/// A single-column predicate: `[NOT] column <comparator> value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub column: String,
    pub comparator: Comparator,
    pub value: Literal,
    pub negated: bool,
}

/// A single-column assignment: `SET column = value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetClause {
    pub column: String,
    pub value: Literal,
}

/// A fully resolved statement, ready for catalog dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    CreateTable {
        table: String,
        columns: Vec<ColumnDef>,
    },
    DropTable {
        table: String,
    },
    CreateIndex {
        table: String,
        column: String,
    },
    DropIndex {
        table: String,
        column: String,
    },
    Insert {
        table: String,
        columns: Vec<String>,
        values: Vec<Literal>,
    },
    Select {
        table: String,
        columns: Vec<String>,
        condition: Option<Condition>,
    },
    Update {
        table: String,
        set: SetClause,
        condition: Option<Condition>,
    },
    Delete {
        table: String,
        condition: Option<Condition>,
    },
}
