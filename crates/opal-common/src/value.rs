//! Runtime column values and their byte encoding.

use crate::types::{DataType, TEXT_BASE_TAG};
use bytes::{BufMut, Bytes, BytesMut};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// A single column value.
///
/// One variant per scalar type; LONG columns carry [`Value::BigInt`] since the
/// alias shares BigInt's tag and width.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    /// Calendar year; stored on the wire as a signed byte holding `2000 - year`.
    Year(i16),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Text(String),
}

impl Value {
    /// Returns the scalar type of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null => DataType::Null,
            Value::TinyInt(_) => DataType::TinyInt,
            Value::SmallInt(_) => DataType::SmallInt,
            Value::Int(_) => DataType::Int,
            Value::BigInt(_) => DataType::BigInt,
            Value::Float(_) => DataType::Float,
            Value::Double(_) => DataType::Double,
            Value::Year(_) => DataType::Year,
            Value::Time(_) => DataType::Time,
            Value::DateTime(_) => DataType::DateTime,
            Value::Date(_) => DataType::Date,
            Value::Text(_) => DataType::Text,
        }
    }

    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the wire tag byte for this value.
    ///
    /// Constant per type, except TEXT where the tag carries the UTF-8 length.
    pub fn tag_byte(&self) -> u8 {
        match self {
            Value::Text(s) => TEXT_BASE_TAG + s.len() as u8,
            other => other.data_type().base_tag(),
        }
    }

    /// Returns the encoded byte length of this value.
    pub fn encoded_len(&self) -> usize {
        match self {
            Value::Text(s) => s.len(),
            other => other.data_type().width(),
        }
    }

    /// Appends the big-endian encoding of this value to `buf`.
    pub fn encode_into(&self, buf: &mut BytesMut) {
        match self {
            Value::Null => {}
            Value::TinyInt(v) => buf.put_i8(*v),
            Value::SmallInt(v) => buf.put_i16(*v),
            Value::Int(v) => buf.put_i32(*v),
            Value::BigInt(v) => buf.put_i64(*v),
            Value::Float(v) => buf.put_f32(*v),
            Value::Double(v) => buf.put_f64(*v),
            Value::Year(y) => buf.put_i8((2000 - y) as i8),
            Value::Time(t) => {
                let ms = t.num_seconds_from_midnight() * 1000 + t.nanosecond() / 1_000_000;
                buf.put_u32(ms);
            }
            Value::DateTime(dt) => buf.put_i64(dt.and_utc().timestamp_millis()),
            Value::Date(d) => {
                let midnight = d.and_time(NaiveTime::MIN);
                buf.put_i64(midnight.and_utc().timestamp_millis());
            }
            Value::Text(s) => buf.put_slice(s.as_bytes()),
        }
    }

    /// Returns the big-endian encoding of this value.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf.freeze()
    }

    /// Decodes a value of the given type from its exact byte encoding.
    ///
    /// Returns None if `buf` has the wrong length or holds bytes the type
    /// cannot represent (bad UTF-8, out-of-range milliseconds).
    pub fn decode(data_type: DataType, buf: &[u8]) -> Option<Value> {
        if data_type != DataType::Text && buf.len() != data_type.width() {
            return None;
        }

        match data_type {
            DataType::Null => Some(Value::Null),
            DataType::TinyInt => Some(Value::TinyInt(i8::from_be_bytes([buf[0]]))),
            DataType::SmallInt => Some(Value::SmallInt(i16::from_be_bytes([buf[0], buf[1]]))),
            DataType::Int => Some(Value::Int(i32::from_be_bytes([
                buf[0], buf[1], buf[2], buf[3],
            ]))),
            DataType::BigInt | DataType::Long => Some(Value::BigInt(i64::from_be_bytes([
                buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
            ]))),
            DataType::Float => Some(Value::Float(f32::from_be_bytes([
                buf[0], buf[1], buf[2], buf[3],
            ]))),
            DataType::Double => Some(Value::Double(f64::from_be_bytes([
                buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
            ]))),
            DataType::Year => {
                let offset = i8::from_be_bytes([buf[0]]);
                Some(Value::Year(2000 - offset as i16))
            }
            DataType::Time => {
                let ms = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
                let time = NaiveTime::from_num_seconds_from_midnight_opt(
                    ms / 1000,
                    (ms % 1000) * 1_000_000,
                )?;
                Some(Value::Time(time))
            }
            DataType::DateTime => {
                let ms = i64::from_be_bytes([
                    buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
                ]);
                let dt = chrono::DateTime::from_timestamp_millis(ms)?;
                Some(Value::DateTime(dt.naive_utc()))
            }
            DataType::Date => {
                let ms = i64::from_be_bytes([
                    buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
                ]);
                let dt = chrono::DateTime::from_timestamp_millis(ms)?;
                Some(Value::Date(dt.date_naive()))
            }
            DataType::Text => {
                let s = std::str::from_utf8(buf).ok()?;
                Some(Value::Text(s.to_string()))
            }
        }
    }
}

impl PartialOrd for Value {
    /// Same-type values order naturally; anything else is incomparable.
    fn partial_cmp(&self, other: &Value) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Value::TinyInt(a), Value::TinyInt(b)) => a.partial_cmp(b),
            (Value::SmallInt(a), Value::SmallInt(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::BigInt(a), Value::BigInt(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
            (Value::Year(a), Value::Year(b)) => a.partial_cmp(b),
            (Value::Time(a), Value::Time(b)) => a.partial_cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.partial_cmp(b),
            (Value::Date(a), Value::Date(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::TinyInt(v) => write!(f, "{}", v),
            Value::SmallInt(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Year(v) => write!(f, "{}", v),
            Value::Time(v) => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: Value) {
        let data_type = value.data_type();
        let bytes = value.to_bytes();
        let decoded = Value::decode(data_type, &bytes).unwrap();
        assert_eq!(value, decoded);
    }

    #[test]
    fn test_integer_roundtrips() {
        roundtrip(Value::TinyInt(-12));
        roundtrip(Value::SmallInt(1234));
        roundtrip(Value::Int(-1_000_000));
        roundtrip(Value::BigInt(9_000_000_000));
    }

    #[test]
    fn test_float_roundtrips() {
        roundtrip(Value::Float(3.25));
        roundtrip(Value::Double(-2.5e300));
    }

    #[test]
    fn test_year_roundtrip() {
        roundtrip(Value::Year(1999));
        roundtrip(Value::Year(2086));
    }

    #[test]
    fn test_year_stores_offset_from_2000() {
        assert_eq!(Value::Year(1999).to_bytes().as_ref(), &[0x01]);
        assert_eq!(Value::Year(2000).to_bytes().as_ref(), &[0x00]);
        // 2003 -> -3 as two's complement
        assert_eq!(Value::Year(2003).to_bytes().as_ref(), &[0xFD]);
    }

    #[test]
    fn test_temporal_roundtrips() {
        roundtrip(Value::Time(
            NaiveTime::from_hms_milli_opt(13, 45, 30, 250).unwrap(),
        ));
        roundtrip(Value::Date(
            NaiveDate::from_ymd_opt(2023, 11, 14).unwrap(),
        ));
        roundtrip(Value::DateTime(
            NaiveDate::from_ymd_opt(2023, 11, 14)
                .unwrap()
                .and_hms_milli_opt(8, 30, 0, 500)
                .unwrap(),
        ));
    }

    #[test]
    fn test_time_encoding_is_ms_since_midnight() {
        let t = Value::Time(NaiveTime::from_hms_opt(0, 0, 1).unwrap());
        assert_eq!(t.to_bytes().as_ref(), &1000u32.to_be_bytes());
    }

    #[test]
    fn test_text_roundtrip() {
        roundtrip(Value::Text("hello".to_string()));
        roundtrip(Value::Text(String::new()));
    }

    #[test]
    fn test_null_encodes_empty() {
        assert_eq!(Value::Null.encoded_len(), 0);
        assert!(Value::Null.to_bytes().is_empty());
        assert_eq!(Value::decode(DataType::Null, &[]), Some(Value::Null));
    }

    #[test]
    fn test_tag_bytes() {
        assert_eq!(Value::Null.tag_byte(), 0);
        assert_eq!(Value::Int(5).tag_byte(), 3);
        assert_eq!(Value::Double(1.0).tag_byte(), 6);
        assert_eq!(Value::Text("abcde".to_string()).tag_byte(), 17);
    }

    #[test]
    fn test_decode_rejects_wrong_width() {
        assert_eq!(Value::decode(DataType::Int, &[0, 1]), None);
        assert_eq!(Value::decode(DataType::TinyInt, &[]), None);
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        assert_eq!(Value::decode(DataType::Text, &[0xFF, 0xFE]), None);
    }

    #[test]
    fn test_big_endian_int_layout() {
        assert_eq!(
            Value::Int(0x01020304).to_bytes().as_ref(),
            &[0x01, 0x02, 0x03, 0x04]
        );
    }

    #[test]
    fn test_long_decodes_as_bigint() {
        let bytes = Value::BigInt(42).to_bytes();
        assert_eq!(
            Value::decode(DataType::Long, &bytes),
            Some(Value::BigInt(42))
        );
    }

    #[test]
    fn test_partial_ord_same_type() {
        assert!(Value::Int(1) < Value::Int(2));
        assert!(Value::Text("a".to_string()) < Value::Text("b".to_string()));
        assert!(Value::Year(1999) < Value::Year(2001));
    }

    #[test]
    fn test_partial_ord_mixed_types_incomparable() {
        assert_eq!(Value::Int(1).partial_cmp(&Value::BigInt(1)), None);
        assert_eq!(Value::Null.partial_cmp(&Value::Int(1)), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Text("abc".to_string()).to_string(), "abc");
        assert_eq!(Value::Year(2024).to_string(), "2024");
    }
}
