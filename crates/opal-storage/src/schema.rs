//! Table schemas and per-column value validation.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use opal_common::types::TEXT_MAX_BYTES;
use opal_common::{DataType, OpalError, Result, Value};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::command::Literal;

/// Key constraint attached to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyRole {
    None,
    Primary,
    Unique,
}

impl KeyRole {
    /// Returns true if the role demands unique values.
    pub fn is_unique(&self) -> bool {
        matches!(self, KeyRole::Primary | KeyRole::Unique)
    }
}

/// Declaration of one table column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub key_role: KeyRole,
}

/// A table's column layout, in declared order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnDef>,
}

impl Schema {
    /// Builds a schema from column declarations in declared order.
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Self { columns }
    }

    /// Returns the column declarations.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Returns the number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Returns all column names in declared order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Resolves a column name to its declared position.
    pub fn column_order(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| OpalError::ColumnNotFound(name.to_string()))
    }

    /// Resolves a name list to positions; an empty list means every column.
    pub fn column_orders(&self, names: &[String]) -> Result<Vec<usize>> {
        if names.is_empty() {
            return Ok((0..self.columns.len()).collect());
        }
        names.iter().map(|n| self.column_order(n)).collect()
    }

    /// Coerces a literal into the column's native value, checking nullability
    /// and type range. Uniqueness is the table's concern, not the schema's.
    pub fn coerce(&self, column_order: usize, literal: &Literal) -> Result<Value> {
        let column = &self.columns[column_order];
        if literal.is_null() {
            return if column.nullable {
                Ok(Value::Null)
            } else {
                Err(OpalError::NullConstraintViolation(column.name.clone()))
            };
        }
        coerce_value(column, literal)
    }
}

fn type_mismatch(column: &ColumnDef, literal: &Literal) -> OpalError {
    OpalError::TypeMismatch {
        column: column.name.clone(),
        expected: column.data_type.to_string(),
        value: literal.to_string(),
    }
}

fn out_of_range(column: &ColumnDef, literal: &Literal) -> OpalError {
    OpalError::ValueOutOfRange {
        column: column.name.clone(),
        expected: column.data_type.to_string(),
        value: literal.to_string(),
    }
}

/// Reads the literal as an integer, parsing text if needed.
fn literal_integer(column: &ColumnDef, literal: &Literal) -> Result<i64> {
    match literal {
        Literal::Integer(v) => Ok(*v),
        Literal::Text(s) => s.trim().parse::<i64>().map_err(|_| type_mismatch(column, literal)),
        _ => Err(type_mismatch(column, literal)),
    }
}

fn coerce_value(column: &ColumnDef, literal: &Literal) -> Result<Value> {
    match column.data_type {
        DataType::Null => Err(type_mismatch(column, literal)),

        DataType::TinyInt => {
            let v = literal_integer(column, literal)?;
            i8::try_from(v)
                .map(Value::TinyInt)
                .map_err(|_| out_of_range(column, literal))
        }
        DataType::SmallInt => {
            let v = literal_integer(column, literal)?;
            i16::try_from(v)
                .map(Value::SmallInt)
                .map_err(|_| out_of_range(column, literal))
        }
        DataType::Int => {
            let v = literal_integer(column, literal)?;
            i32::try_from(v)
                .map(Value::Int)
                .map_err(|_| out_of_range(column, literal))
        }
        DataType::BigInt | DataType::Long => {
            literal_integer(column, literal).map(Value::BigInt)
        }

        DataType::Float => {
            let v = literal_float(column, literal)?;
            if v.abs() > f32::MAX as f64 {
                return Err(out_of_range(column, literal));
            }
            Ok(Value::Float(v as f32))
        }
        DataType::Double => literal_float(column, literal).map(Value::Double),

        DataType::Year => {
            let year = literal_integer(column, literal)?;
            // The stored offset 2000 - year must fit a signed byte.
            let offset = 2000 - year;
            if !(i8::MIN as i64..=i8::MAX as i64).contains(&offset) {
                return Err(out_of_range(column, literal));
            }
            Ok(Value::Year(year as i16))
        }
        DataType::Time => match literal {
            Literal::Text(s) => NaiveTime::from_str(s.trim())
                .map(Value::Time)
                .map_err(|_| type_mismatch(column, literal)),
            Literal::Integer(ms) => {
                if !(0..=86_400_000).contains(ms) {
                    return Err(out_of_range(column, literal));
                }
                let ms = *ms as u32;
                NaiveTime::from_num_seconds_from_midnight_opt(ms / 1000, (ms % 1000) * 1_000_000)
                    .map(Value::Time)
                    .ok_or_else(|| out_of_range(column, literal))
            }
            _ => Err(type_mismatch(column, literal)),
        },
        DataType::DateTime => match literal {
            Literal::Text(s) => parse_datetime(s.trim())
                .map(Value::DateTime)
                .ok_or_else(|| type_mismatch(column, literal)),
            Literal::Integer(epoch_secs) => chrono::DateTime::from_timestamp(*epoch_secs, 0)
                .map(|dt| Value::DateTime(dt.naive_utc()))
                .ok_or_else(|| out_of_range(column, literal)),
            _ => Err(type_mismatch(column, literal)),
        },
        DataType::Date => match literal {
            Literal::Text(s) => NaiveDate::from_str(s.trim())
                .map(Value::Date)
                .map_err(|_| type_mismatch(column, literal)),
            Literal::Integer(epoch_secs) => chrono::DateTime::from_timestamp(*epoch_secs, 0)
                .map(|dt| Value::Date(dt.date_naive()))
                .ok_or_else(|| out_of_range(column, literal)),
            _ => Err(type_mismatch(column, literal)),
        },

        DataType::Text => match literal {
            Literal::Text(s) => {
                if s.len() > TEXT_MAX_BYTES {
                    return Err(out_of_range(column, literal));
                }
                Ok(Value::Text(s.clone()))
            }
            _ => Err(type_mismatch(column, literal)),
        },
    }
}

fn literal_float(column: &ColumnDef, literal: &Literal) -> Result<f64> {
    match literal {
        Literal::Float(v) => Ok(*v),
        Literal::Integer(v) => Ok(*v as f64),
        Literal::Text(s) => s.trim().parse::<f64>().map_err(|_| type_mismatch(column, literal)),
        _ => Err(type_mismatch(column, literal)),
    }
}

/// Accepts both the `T`-separated and space-separated ISO-8601 forms.
fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::from_str(s)
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok())
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok())
}
