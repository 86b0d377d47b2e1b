use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::parser::analyzer::TimestampAnalysis;
use crate::parser::{ParseError, SelectParser};

/// Whether (and through which names) the outermost query selects the event
/// timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampSelection {
    pub has_timestamp: bool,
    pub column_names: Vec<String>,
}

impl TimestampSelection {
    /// Strict analysis: fails on malformed SQL, multi-statement input, or a
    /// statement that is not a SELECT.
    pub fn analyze(sql: &str) -> Result<TimestampSelection, ParseError> {
        let query = SelectParser::parse(sql)?;
        let analysis = TimestampAnalysis::of_query(&query);

        Ok(TimestampSelection {
            has_timestamp: analysis.selected,
            column_names: analysis.columns.into_iter().collect(),
        })
    }

    /// First name the timestamp is selected through, `None` when the query
    /// does not select it or does not parse.
    pub fn column_name(sql: &str) -> Option<String> {
        match Self::analyze(sql) {
            Ok(selection) => selection.column_names.into_iter().next(),
            Err(error) => {
                debug!(%error, "timestamp lookup on unparsable query");
                None
            }
        }
    }
}
