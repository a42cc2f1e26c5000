//! Row records and their variable-length cell encoding.

use bytes::{BufMut, Bytes, BytesMut};
use opal_common::{DataType, Value};

use crate::command::Comparator;

/// A table row: a row id plus typed column values.
///
/// Rows order by `row_id`. In memory a freshly inserted record carries one
/// type/value pair per schema column (null columns hold an explicit
/// [`Value::Null`]); a record decoded from a page omits null columns from
/// both lists, so their length can be below `column_count`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub row_id: u32,
    pub column_count: u8,
    pub types: Vec<DataType>,
    pub values: Vec<Value>,
}

impl Record {
    /// Creates a record over the given parallel type/value lists.
    pub fn new(row_id: u32, column_count: u8, types: Vec<DataType>, values: Vec<Value>) -> Self {
        Self {
            row_id,
            column_count,
            types,
            values,
        }
    }

    /// Returns the row id this record is keyed by.
    pub fn id(&self) -> u32 {
        self.row_id
    }

    /// Returns the payload length: count byte + tag bytes + value bytes.
    pub fn payload_len(&self) -> usize {
        1 + self.values.len() + self.values.iter().map(Value::encoded_len).sum::<usize>()
    }

    /// Returns the full cell length on a page (length prefix + row id + payload).
    pub fn encoded_len(&self) -> usize {
        6 + self.payload_len()
    }

    /// Serializes the record cell.
    ///
    /// Layout: payload length (2), row id (4), column count (1), one tag byte
    /// per column, then the value bytes back to back. Null columns contribute
    /// a zero tag and no value bytes.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_u16(self.payload_len() as u16);
        buf.put_u32(self.row_id);
        buf.put_u8(self.column_count);
        for value in &self.values {
            buf.put_u8(value.tag_byte());
        }
        for value in &self.values {
            value.encode_into(&mut buf);
        }
        buf.freeze()
    }

    /// Deserializes a record cell.
    ///
    /// Null columns are dropped from the decoded type/value lists (the
    /// decoded width can be below `column_count`). Returns None on a
    /// truncated cell, an unassigned type tag, or undecodable value bytes.
    pub fn from_bytes(buf: &[u8]) -> Option<Record> {
        if buf.len() < 7 {
            return None;
        }

        let payload_len = u16::from_be_bytes([buf[0], buf[1]]) as usize;
        if buf.len() < 6 + payload_len {
            return None;
        }
        let row_id = u32::from_be_bytes([buf[2], buf[3], buf[4], buf[5]]);
        let column_count = buf[6];

        let mut pos = 7;
        let mut tags = Vec::with_capacity(column_count as usize);
        for _ in 0..column_count {
            tags.push(*buf.get(pos)?);
            pos += 1;
        }

        let mut types = Vec::with_capacity(column_count as usize);
        let mut values = Vec::with_capacity(column_count as usize);
        for tag in tags {
            let (data_type, len) = DataType::from_tag(tag)?;
            if data_type == DataType::Null {
                continue;
            }
            let value_bytes = buf.get(pos..pos + len)?;
            let value = Value::decode(data_type, value_bytes)?;
            pos += len;
            types.push(data_type);
            values.push(value);
        }

        Some(Record {
            row_id,
            column_count,
            types,
            values,
        })
    }

    /// Returns true if this record satisfies the condition.
    ///
    /// A missing or incomparable column value never matches.
    pub fn matches(&self, condition: &ResolvedCondition) -> bool {
        let Some(lval) = self.values.get(condition.column_order) else {
            return false;
        };
        let rval = &condition.value;

        match condition.comparator {
            Comparator::Eq => lval == rval,
            Comparator::Ne => lval != rval,
            Comparator::Lt => matches!(lval.partial_cmp(rval), Some(std::cmp::Ordering::Less)),
            Comparator::Gt => matches!(lval.partial_cmp(rval), Some(std::cmp::Ordering::Greater)),
            Comparator::Le => matches!(
                lval.partial_cmp(rval),
                Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
            ),
            Comparator::Ge => matches!(
                lval.partial_cmp(rval),
                Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
            ),
        }
    }

    /// Replaces one column's value in place, keeping the type list in step.
    pub fn set_value(&mut self, column_order: usize, value: Value) {
        self.types[column_order] = value.data_type();
        self.values[column_order] = value;
    }
}

/// A condition with the column resolved to its position and the comparison
/// value coerced to the column's type. Negation is already folded into the
/// comparator.
#[derive(Debug, Clone)]
pub struct ResolvedCondition {
    pub column_order: usize,
    pub comparator: Comparator,
    pub value: Value,
}
