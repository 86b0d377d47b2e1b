use std::collections::VecDeque;
use std::mem;

use indexmap::{IndexMap, IndexSet};
use sqlparser::ast::{
    Expr, Function, FunctionArgExpr, FunctionArguments, Query, SelectItem, SetExpr, TableFactor,
};
use tracing::trace;

use crate::parser::analyzer::{NameResolver, TIMESTAMP_COLUMN};

/// Findings of a full visitor pass over one query tree.
#[derive(Debug, Clone)]
pub struct TimestampAnalysis {
    /// whether the outermost query actually selects the timestamp
    pub selected: bool,
    /// names the timestamp was selected through, first occurrence wins position
    pub columns: IndexSet<String>,
    /// every alias established as timestamp-denoting anywhere in the tree
    pub aliases: IndexSet<String>,
}

impl TimestampAnalysis {
    pub fn of_query(query: &Query) -> Self {
        let mut visitor = TimestampVisitor::new();
        visitor.visit(query);
        visitor.process_queued_projections();

        Self {
            selected: visitor.selected,
            columns: visitor.columns,
            aliases: visitor.aliases,
        }
    }
}

/// Scope-tracking walk over a parsed query tree. Learns which column names
/// and aliases denote the event timestamp in each lexical region, then
/// classifies the queued projection lists against that knowledge.
struct TimestampVisitor<'a> {
    depth: usize,
    /// names known to denote the timestamp in the region being visited;
    /// saved/cleared/restored around every nested visit
    scope: IndexSet<String>,
    /// append-only across the whole call, supports alias-of-alias chains
    aliases: IndexSet<String>,
    /// CTE name -> timestamp names its body exposes to later FROM clauses
    ctes: IndexMap<String, IndexSet<String>>,
    /// projection lists waiting for classification
    queue: VecDeque<PendingProjections<'a>>,
    selected: bool,
    columns: IndexSet<String>,
}

struct PendingProjections<'a> {
    items: &'a [SelectItem],
    is_main: bool,
}

impl<'a> TimestampVisitor<'a> {
    fn new() -> Self {
        Self {
            depth: 0,
            scope: IndexSet::new(),
            aliases: IndexSet::new(),
            ctes: IndexMap::new(),
            queue: VecDeque::new(),
            selected: false,
            columns: IndexSet::new(),
        }
    }

    fn visit(&mut self, query: &'a Query) {
        self.depth += 1;
        let outermost = self.depth == 1;
        trace!(depth = self.depth, "visiting query scope");

        // CTE bodies are walked before the query's own FROM list, each in a
        // scope of its own, and whatever they expose is keyed by CTE name
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                let saved = mem::take(&mut self.scope);
                self.visit(&cte.query);
                let exposed = mem::replace(&mut self.scope, saved);
                trace!(cte = %cte.alias.name.value, exposed = exposed.len(), "CTE scope registered");
                self.ctes.insert(cte.alias.name.value.clone(), exposed);
            }
        }

        // the statement owning the CTEs counts as main even while nested
        let is_main = outermost || query.with.is_some();

        if let SetExpr::Select(select) = query.body.as_ref() {
            for table in &select.from {
                self.visit_relation(&table.relation);
                for join in &table.joins {
                    self.visit_relation(&join.relation);
                }
            }

            self.seed_aliases(&select.projection);

            let pending = PendingProjections { items: &select.projection, is_main };
            if is_main {
                self.queue.push_back(pending);
            } else {
                self.queue.push_front(pending);
            }
        }

        self.depth -= 1;
    }

    fn visit_relation(&mut self, relation: &'a TableFactor) {
        match relation {
            TableFactor::Table { name, .. } => {
                if let Some(table) = NameResolver::object_name(name) {
                    if let Some(exposed) = self.ctes.get(table) {
                        self.scope.extend(exposed.iter().cloned());
                    }
                }
            }
            TableFactor::Derived { subquery, .. } => {
                // subquery findings propagate outward into the enclosing FROM
                // scope; siblings never see each other's scope while walking
                let saved = mem::take(&mut self.scope);
                self.visit(subquery);
                let exposed = mem::take(&mut self.scope);
                self.scope = saved;
                self.scope.extend(exposed);
            }
            _ => {}
        }
    }

    /// Pre-pass over a projection list that only establishes aliases, so the
    /// classification pass can resolve references in any order.
    fn seed_aliases(&mut self, projection: &'a [SelectItem]) {
        for item in projection {
            if let SelectItem::ExprWithAlias { expr, alias } = item {
                if alias.value == TIMESTAMP_COLUMN || self.expr_is_timestamp(expr) {
                    self.aliases.insert(alias.value.clone());
                    self.scope.insert(alias.value.clone());
                }
            }
        }
    }

    fn process_queued_projections(&mut self) {
        while let Some(pending) = self.queue.pop_front() {
            for item in pending.items {
                match item {
                    SelectItem::UnnamedExpr(expr) => {
                        self.classify_projection(expr, None, pending.is_main)
                    }
                    SelectItem::ExprWithAlias { expr, alias } => {
                        self.classify_projection(expr, Some(alias.value.as_str()), pending.is_main)
                    }
                    SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..) => {
                        self.classify_wildcard(pending.is_main)
                    }
                }
            }
        }
    }

    fn classify_projection(&mut self, expr: &Expr, alias: Option<&str>, is_main: bool) {
        match expr {
            Expr::Identifier(_) | Expr::CompoundIdentifier(_) => {
                self.classify_column(expr, alias, is_main)
            }
            Expr::Nested(inner) => self.classify_projection(inner, alias, is_main),
            Expr::Function(function) => self.classify_function(function, alias, is_main),
            Expr::Wildcard(_) | Expr::QualifiedWildcard(..) => self.classify_wildcard(is_main),
            _ => self.classify_other(alias, is_main),
        }
    }

    fn classify_column(&mut self, expr: &Expr, alias: Option<&str>, is_main: bool) {
        let Some(name) = NameResolver::column_name(expr) else {
            return;
        };

        // the global alias registry only resolves main-query references;
        // nested queries see their lexical scope and the literal name
        let known = name == TIMESTAMP_COLUMN
            || self.scope.contains(name)
            || (is_main && self.aliases.contains(name));
        if !known {
            return;
        }

        let name = name.to_string();
        self.scope.insert(name.clone());

        if is_main {
            self.selected = true;
            self.columns.insert(alias.map_or(name, str::to_string));
        }

        if let Some(alias) = alias {
            self.aliases.insert(alias.to_string());
            self.scope.insert(alias.to_string());
        }
    }

    fn classify_wildcard(&mut self, is_main: bool) {
        if self.scope.is_empty() {
            // a bare SELECT * always carries the timestamp along
            self.scope.insert(TIMESTAMP_COLUMN.to_string());
            if is_main {
                self.selected = true;
                self.columns.insert(TIMESTAMP_COLUMN.to_string());
            }
        } else if is_main {
            self.selected = true;
            self.columns.extend(self.scope.iter().cloned());
        }
    }

    fn classify_function(&mut self, function: &Function, alias: Option<&str>, is_main: bool) {
        // an unaliased bucketing call exposes no name to select through
        let Some(alias) = alias else {
            return;
        };
        if !self.is_histogram_over_timestamp(function) {
            return;
        }

        self.aliases.insert(alias.to_string());
        self.scope.insert(alias.to_string());
        if is_main {
            self.selected = true;
            self.columns.insert(alias.to_string());
        }
    }

    fn classify_other(&mut self, alias: Option<&str>, is_main: bool) {
        let Some(alias) = alias else {
            return;
        };
        if alias != TIMESTAMP_COLUMN {
            return;
        }

        self.aliases.insert(alias.to_string());
        self.scope.insert(alias.to_string());
        if is_main {
            self.selected = true;
            self.columns.insert(alias.to_string());
        }
    }

    fn expr_is_timestamp(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Identifier(_) | Expr::CompoundIdentifier(_) => {
                NameResolver::column_name(expr).is_some_and(|name| self.name_is_timestamp(name))
            }
            Expr::Nested(inner) => self.expr_is_timestamp(inner),
            Expr::Cast { expr, .. } => self.expr_is_timestamp(expr),
            Expr::Function(function) => self.is_histogram_over_timestamp(function),
            _ => false,
        }
    }

    fn name_is_timestamp(&self, name: &str) -> bool {
        name == TIMESTAMP_COLUMN || self.scope.contains(name) || self.aliases.contains(name)
    }

    fn is_histogram_over_timestamp(&self, function: &Function) -> bool {
        let is_histogram = NameResolver::object_name(&function.name)
            .is_some_and(|name| name.eq_ignore_ascii_case("histogram"));
        if !is_histogram {
            return false;
        }

        let FunctionArguments::List(arguments) = &function.args else {
            return false;
        };
        arguments.args.iter().any(|argument| {
            matches!(
                NameResolver::argument_expr(argument),
                Some(FunctionArgExpr::Expr(expr)) if self.expr_is_timestamp(expr)
            )
        })
    }
}
