pub mod timestamp_selection;
pub use timestamp_selection::*;

pub mod chart_fields;
pub use chart_fields::*;

pub mod timestamp_visitor;
pub use timestamp_visitor::*;

pub mod resolvers;
pub use resolvers::*;

#[cfg(test)]
mod _tests;

/// Name of the event-timestamp column every ingested record carries. The
/// whole analysis pivots on this literal; it is not configurable.
pub const TIMESTAMP_COLUMN: &str = "_timestamp";
