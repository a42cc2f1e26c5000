//! Scalar type identifiers for OpalDB column values.

use serde::{Deserialize, Serialize};

/// Base wire tag for TEXT values; the stored tag is `TEXT_BASE_TAG + utf8 length`.
pub const TEXT_BASE_TAG: u8 = 12;

/// Maximum UTF-8 byte length of a TEXT value.
pub const TEXT_MAX_BYTES: usize = 115;

/// Identifier for all supported data types in OpalDB.
///
/// Each type owns a one-byte wire tag (constant except for TEXT, whose tag
/// carries the value's UTF-8 length) and a fixed encoded width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Null,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    /// 64-bit alias of BigInt; shares its tag and width.
    Long,
    Float,
    Double,
    /// Signed byte holding `2000 - year`.
    Year,
    /// Milliseconds since midnight, 4 bytes.
    Time,
    /// Milliseconds since the Unix epoch, 8 bytes.
    DateTime,
    /// Milliseconds since the Unix epoch at midnight, 8 bytes.
    Date,
    /// Variable-length UTF-8, length implicit in the tag byte.
    Text,
}

impl DataType {
    /// Returns the base wire tag for this type.
    ///
    /// TEXT values add their UTF-8 byte length to this base when encoded.
    pub fn base_tag(&self) -> u8 {
        match self {
            DataType::Null => 0,
            DataType::TinyInt => 1,
            DataType::SmallInt => 2,
            DataType::Int => 3,
            DataType::BigInt | DataType::Long => 4,
            DataType::Float => 5,
            DataType::Double => 6,
            DataType::Year => 8,
            DataType::Time => 9,
            DataType::DateTime => 10,
            DataType::Date => 11,
            DataType::Text => TEXT_BASE_TAG,
        }
    }

    /// Returns the fixed encoded width in bytes (0 for NULL and TEXT).
    pub fn width(&self) -> usize {
        match self {
            DataType::Null | DataType::Text => 0,
            DataType::TinyInt | DataType::Year => 1,
            DataType::SmallInt => 2,
            DataType::Int | DataType::Float | DataType::Time => 4,
            DataType::BigInt | DataType::Long | DataType::Double => 8,
            DataType::DateTime | DataType::Date => 8,
        }
    }

    /// Resolves a wire tag to its type and value byte length.
    ///
    /// Tags at or above [`TEXT_BASE_TAG`] are TEXT with an embedded length;
    /// tag 4 resolves to BigInt (the Long alias collapses on decode).
    /// Returns None for the unassigned tag 7.
    pub fn from_tag(tag: u8) -> Option<(DataType, usize)> {
        let data_type = match tag {
            0 => DataType::Null,
            1 => DataType::TinyInt,
            2 => DataType::SmallInt,
            3 => DataType::Int,
            4 => DataType::BigInt,
            5 => DataType::Float,
            6 => DataType::Double,
            8 => DataType::Year,
            9 => DataType::Time,
            10 => DataType::DateTime,
            11 => DataType::Date,
            t if t >= TEXT_BASE_TAG => DataType::Text,
            _ => return None,
        };

        let len = if data_type == DataType::Text {
            (tag - TEXT_BASE_TAG) as usize
        } else {
            data_type.width()
        };

        Some((data_type, len))
    }

    /// Resolves a declared type name (e.g. "INT", "TEXT") to its type.
    pub fn from_type_name(name: &str) -> Option<DataType> {
        match name {
            "NULL" => Some(DataType::Null),
            "TINYINT" => Some(DataType::TinyInt),
            "SMALLINT" => Some(DataType::SmallInt),
            "INT" => Some(DataType::Int),
            "BIGINT" => Some(DataType::BigInt),
            "LONG" => Some(DataType::Long),
            "FLOAT" => Some(DataType::Float),
            "DOUBLE" => Some(DataType::Double),
            "YEAR" => Some(DataType::Year),
            "TIME" => Some(DataType::Time),
            "DATETIME" => Some(DataType::DateTime),
            "DATE" => Some(DataType::Date),
            "TEXT" => Some(DataType::Text),
            _ => None,
        }
    }

    /// Returns true if this type is an integer type.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::TinyInt | DataType::SmallInt | DataType::Int | DataType::BigInt | DataType::Long
        )
    }

    /// Returns true if this type is a floating-point type.
    pub fn is_floating_point(&self) -> bool {
        matches!(self, DataType::Float | DataType::Double)
    }

    /// Returns true if this type is a temporal type.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            DataType::Year | DataType::Time | DataType::DateTime | DataType::Date
        )
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DataType::Null => "NULL",
            DataType::TinyInt => "TINYINT",
            DataType::SmallInt => "SMALLINT",
            DataType::Int => "INT",
            DataType::BigInt => "BIGINT",
            DataType::Long => "LONG",
            DataType::Float => "FLOAT",
            DataType::Double => "DOUBLE",
            DataType::Year => "YEAR",
            DataType::Time => "TIME",
            DataType::DateTime => "DATETIME",
            DataType::Date => "DATE",
            DataType::Text => "TEXT",
        };
        write!(f, "{}", name)
    }
}
