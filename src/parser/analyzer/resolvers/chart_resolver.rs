use sqlparser::ast::{
    Expr, GroupByExpr, Select, SelectItem, SetExpr, TableFactor, TableWithJoins,
};
use tracing::debug;

use crate::parser::SelectParser;
use crate::parser::analyzer::{
    CanonicalResolver, ChartFields, NameResolver, TIMESTAMP_COLUMN, TimestampAnalysis,
};

pub struct ChartResolver;

impl ChartResolver {
    /// Partitions a query's projections into timestamp, group-by dimensions
    /// and measure fields. Never fails: anything unparsable yields the
    /// all-empty partition.
    pub fn extract(sql: &str) -> ChartFields {
        let query = match SelectParser::parse(sql) {
            Ok(query) => query,
            Err(error) => {
                debug!(%error, "chart extraction on unparsable query");
                return ChartFields::default();
            }
        };

        let select = match query.body.as_ref() {
            SetExpr::Select(select) => Some(select.as_ref()),
            _ => None,
        };

        let default_table = select.and_then(Self::default_table);
        let analysis = TimestampAnalysis::of_query(&query);
        let group_columns = select.map(Self::group_by_exprs).unwrap_or_default();

        let mut timestamp = analysis.columns.first().cloned();

        // nothing selected through a projection, look at what the query
        // groups on instead
        if timestamp.is_none() {
            timestamp = group_columns.iter().find_map(|expr| {
                NameResolver::column_name(expr)
                    .filter(|name| *name == TIMESTAMP_COLUMN || analysis.aliases.contains(*name))
                    .map(str::to_string)
            });
        }

        if timestamp.is_none()
            && Self::is_bare_wildcard(select)
            && group_columns
                .iter()
                .any(|expr| NameResolver::column_name(expr) == Some(TIMESTAMP_COLUMN))
        {
            timestamp = Some(TIMESTAMP_COLUMN.to_string());
        }

        let mut group_by: Vec<String> = Vec::new();
        for expr in group_columns {
            let Some(name) = NameResolver::column_name(expr) else {
                continue;
            };
            if name == TIMESTAMP_COLUMN
                || analysis.aliases.contains(name)
                || timestamp.as_deref() == Some(name)
            {
                continue;
            }
            group_by.push(name.to_string());
        }

        let mut y_axis_fields: Vec<String> = Vec::new();
        if let Some(select) = select {
            let canonical = CanonicalResolver::new(default_table.as_deref());
            for item in &select.projection {
                let name = match item {
                    // wildcard fields cannot be enumerated without a schema
                    SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..) => continue,
                    SelectItem::ExprWithAlias { alias, .. } => alias.value.clone(),
                    SelectItem::UnnamedExpr(expr) => match NameResolver::column_name(expr) {
                        Some(column) => column.to_string(),
                        None => canonical.render(expr),
                    },
                };

                let excluded = timestamp.as_deref() == Some(name.as_str())
                    || name == TIMESTAMP_COLUMN
                    || analysis.aliases.contains(&name)
                    || group_by.contains(&name);
                if !excluded {
                    y_axis_fields.push(name);
                }
            }
        }

        ChartFields { timestamp, group_by, y_axis_fields }
    }

    /// The table used to qualify bare columns: a FROM clause resolving to
    /// exactly one plain, unaliased table.
    fn default_table(select: &Select) -> Option<String> {
        match select.from.as_slice() {
            [TableWithJoins { relation: TableFactor::Table { name, alias: None, .. }, joins }]
                if joins.is_empty() =>
            {
                NameResolver::object_name(name).map(str::to_string)
            }
            _ => None,
        }
    }

    fn group_by_exprs(select: &Select) -> &[Expr] {
        match &select.group_by {
            GroupByExpr::Expressions(exprs, _) => exprs,
            GroupByExpr::All(_) => &[],
        }
    }

    fn is_bare_wildcard(select: Option<&Select>) -> bool {
        select.is_some_and(|select| {
            matches!(select.projection.as_slice(), [SelectItem::Wildcard(_)])
        })
    }
}
