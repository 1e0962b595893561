use chrono::{DateTime, FixedOffset};

use super::field_mapper::{FieldError, FieldMapper, FieldMapping, FieldName};
use super::raw::RawLine;
use crate::events::XivEvent;

/// Converts one line type into at most one event.
pub trait LineParser: Send + Sync {
    /// Numeric line-type code this parser handles (`01` -> 1).
    fn line_type(&self) -> u16;

    fn name(&self) -> &'static str;

    /// `Ok(None)` means the line was understood but carries nothing to publish.
    fn parse(&self, line: &RawLine) -> Result<Option<XivEvent>, FieldError>;
}

pub type ConvertFn<F> =
    fn(&FieldMapper<'_, F>, u64, DateTime<FixedOffset>) -> Result<Option<XivEvent>, FieldError>;

/// A [`LineParser`] built from a closed field enum, its column layout and a
/// conversion function.
pub struct MappedLineParser<F: FieldName> {
    line_type: u16,
    name: &'static str,
    mapping: FieldMapping<F>,
    convert: ConvertFn<F>,
}

impl<F: FieldName> MappedLineParser<F> {
    /// `fields` lists the columns after the line-type code, in order.
    pub fn new(line_type: u16, name: &'static str, fields: &[F], convert: ConvertFn<F>) -> Self {
        Self::with_mapping(line_type, name, FieldMapping::sequential(fields), convert)
    }

    pub fn with_mapping(
        line_type: u16,
        name: &'static str,
        mapping: FieldMapping<F>,
        convert: ConvertFn<F>,
    ) -> Self {
        Self {
            line_type,
            name,
            mapping,
            convert,
        }
    }
}

impl<F: FieldName> LineParser for MappedLineParser<F> {
    fn line_type(&self) -> u16 {
        self.line_type
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn parse(&self, line: &RawLine) -> Result<Option<XivEvent>, FieldError> {
        let mapper = FieldMapper::new(line.fields(), &self.mapping);
        (self.convert)(&mapper, line.line_number(), line.timestamp())
    }
}
