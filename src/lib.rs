pub mod parser;
pub use parser::{ParseError, SelectParser};
pub use parser::analyzer::{ChartFields, TimestampAnalysis, TimestampSelection, TIMESTAMP_COLUMN};
