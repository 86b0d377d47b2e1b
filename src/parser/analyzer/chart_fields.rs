use serde::{Deserialize, Serialize};

use crate::parser::analyzer::ChartResolver;

/// Partition of a query's projections for chart building: the field driving
/// the time axis, the breakdown dimensions, and the measures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartFields {
    pub timestamp: Option<String>,
    pub group_by: Vec<String>,
    pub y_axis_fields: Vec<String>,
}

impl ChartFields {
    /// Never fails: malformed SQL yields the all-empty partition.
    pub fn extract(sql: &str) -> ChartFields {
        ChartResolver::extract(sql)
    }
}
