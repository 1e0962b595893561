//! Typed field access for one line type.
//!
//! Each parser declares a closed enum of field names and a [`FieldMapping`]
//! from those names to column indices. [`FieldMapper`] borrows a raw line's
//! fields together with that mapping and exposes typed accessors. Every
//! accessor fails loudly: a silently defaulted id (zone 0, player 0) would
//! corrupt the state comparisons downstream.

use chrono::{DateTime, FixedOffset};
use hashbrown::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Marker for a parser's field-name enum.
pub trait FieldName: Copy + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> FieldName for T where T: Copy + Eq + Hash + Debug + Send + Sync + 'static {}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("field {field} is not mapped for this line type")]
    Missing { field: String },

    #[error("field {field} at index {index} is past the end of the line ({len} fields)")]
    OutOfRange {
        field: String,
        index: usize,
        len: usize,
    },

    #[error("field {field} = {value:?} is not a valid {expected}")]
    Malformed {
        field: String,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct FieldMapping<F: FieldName> {
    indices: HashMap<F, usize>,
}

impl<F: FieldName> FieldMapping<F> {
    pub fn new(pairs: impl IntoIterator<Item = (F, usize)>) -> Self {
        Self {
            indices: pairs.into_iter().collect(),
        }
    }

    /// Map names to consecutive columns starting right after the line-type
    /// code, so the first name lands on index 1.
    pub fn sequential(names: &[F]) -> Self {
        Self::new(names.iter().enumerate().map(|(i, &name)| (name, i + 1)))
    }

    pub fn index_of(&self, field: F) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    /// Highest column this mapping reads, i.e. the minimum field count minus one.
    pub fn max_index(&self) -> Option<usize> {
        self.indices.values().copied().max()
    }
}

pub struct FieldMapper<'a, F: FieldName> {
    fields: &'a [String],
    mapping: &'a FieldMapping<F>,
}

impl<'a, F: FieldName> FieldMapper<'a, F> {
    pub fn new(fields: &'a [String], mapping: &'a FieldMapping<F>) -> Self {
        Self { fields, mapping }
    }

    pub fn get_string(&self, field: F) -> Result<&'a str, FieldError> {
        let Some(index) = self.mapping.index_of(field) else {
            return Err(FieldError::Missing {
                field: format!("{field:?}"),
            });
        };
        self.fields
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| FieldError::OutOfRange {
                field: format!("{field:?}"),
                index,
                len: self.fields.len(),
            })
    }

    /// Unsigned hex. Case-insensitive, leading zeros allowed, no sign or `0x`.
    pub fn get_hex(&self, field: F) -> Result<u64, FieldError> {
        let value = self.get_string(field)?;
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(malformed(field, value, "hex number"));
        }
        u64::from_str_radix(value, 16).map_err(|_| malformed(field, value, "hex number"))
    }

    pub fn get_hex_u32(&self, field: F) -> Result<u32, FieldError> {
        let value = self.get_hex(field)?;
        u32::try_from(value).map_err(|_| malformed(field, &format!("{value:X}"), "32-bit hex number"))
    }

    /// Signed decimal integer.
    pub fn get_int(&self, field: F) -> Result<i64, FieldError> {
        let value = self.get_string(field)?;
        value
            .parse::<i64>()
            .map_err(|_| malformed(field, value, "integer"))
    }

    /// Unsigned decimal integer.
    pub fn get_uint(&self, field: F) -> Result<u64, FieldError> {
        let value = self.get_string(field)?;
        if value.starts_with('+') {
            return Err(malformed(field, value, "unsigned integer"));
        }
        value
            .parse::<u64>()
            .map_err(|_| malformed(field, value, "unsigned integer"))
    }

    pub fn get_float(&self, field: F) -> Result<f64, FieldError> {
        let value = self.get_string(field)?;
        match value.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(malformed(field, value, "number")),
        }
    }

    /// RFC 3339 timestamp with offset.
    pub fn get_time(&self, field: F) -> Result<DateTime<FixedOffset>, FieldError> {
        let value = self.get_string(field)?;
        DateTime::parse_from_rfc3339(value).map_err(|_| malformed(field, value, "timestamp"))
    }
}

fn malformed<F: FieldName>(field: F, value: &str, expected: &'static str) -> FieldError {
    FieldError::Malformed {
        field: format!("{field:?}"),
        value: value.to_string(),
        expected,
    }
}
