pub mod field_mapper;
pub mod parser;
pub mod parsers;
pub mod raw;
pub mod registry;

pub use field_mapper::{FieldError, FieldMapper, FieldMapping, FieldName};
pub use parser::{ConvertFn, LineParser, MappedLineParser};
pub use raw::{RawLine, RawLineError};
pub use registry::{Dispatch, LineError, LineParserRegistry};
