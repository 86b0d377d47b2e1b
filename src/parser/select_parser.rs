use sqlparser::ast::{Query, Statement};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use crate::parser::ParseError;

pub struct SelectParser;

impl SelectParser {
    /// Parses `sql` into the single SELECT statement it must contain.
    pub fn parse(sql: &str) -> Result<Query, ParseError> {
        let mut statements = Parser::parse_sql(&GenericDialect {}, sql)?;

        if statements.len() != 1 {
            return ParseError::new(format!(
                "expected a single SQL statement, found {}",
                statements.len()
            ))
            .err();
        }

        match statements.remove(0) {
            Statement::Query(query) => Ok(*query),
            other => {
                ParseError::new(format!("expected a SELECT statement, found: {other}")).err()
            }
        }
    }
}
