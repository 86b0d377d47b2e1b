use sqlparser::ast::{
    DuplicateTreatment, Expr, Function, FunctionArg, FunctionArgExpr, FunctionArguments, Value,
};

use crate::parser::analyzer::NameResolver;

/// Token emitted for expression shapes the renderer does not recognize.
const UNRESOLVED: &str = "?";

/// Renders expressions the way the downstream query engine prints them, so
/// unaliased projections get stable, deterministic field names. Bare column
/// arguments are qualified with the query's default table when one exists.
pub struct CanonicalResolver<'a> {
    default_table: Option<&'a str>,
}

impl<'a> CanonicalResolver<'a> {
    pub fn new(default_table: Option<&'a str>) -> Self {
        Self { default_table }
    }

    pub fn render(&self, expr: &Expr) -> String {
        match expr {
            Expr::Identifier(ident) => self.qualified(None, &ident.value),
            Expr::CompoundIdentifier(_) => {
                let qualifier = NameResolver::column_qualifier(expr);
                match NameResolver::column_name(expr) {
                    Some(name) => self.qualified(qualifier.as_deref(), name),
                    None => UNRESOLVED.to_string(),
                }
            }
            Expr::Wildcard(_) => "*".to_string(),
            Expr::QualifiedWildcard(name, _) => format!("{name}.*"),
            Expr::Nested(inner) => self.render(inner),
            // casts are transparent, the engine names the inner expression
            Expr::Cast { expr, .. } => self.render(expr),
            Expr::Function(function) => self.render_function(function),
            Expr::BinaryOp { left, op, right } => {
                format!("{}{}{}", self.render(left), op, self.render(right))
            }
            Expr::UnaryOp { op, expr } => format!("{}{}", op, self.render(expr)),
            Expr::Value(value) => Self::render_value(&value.value),
            _ => UNRESOLVED.to_string(),
        }
    }

    fn render_function(&self, function: &Function) -> String {
        let name = match NameResolver::object_name(&function.name) {
            Some(name) => name.to_lowercase(),
            None => return UNRESOLVED.to_string(),
        };

        let (distinct, arguments) = match &function.args {
            FunctionArguments::List(list) => (
                list.duplicate_treatment == Some(DuplicateTreatment::Distinct),
                list.args
                    .iter()
                    .map(|argument| self.render_argument(argument))
                    .collect::<Vec<_>>(),
            ),
            _ => (false, Vec::new()),
        };

        // the engine prints subscript access, not the array_element call
        if name == "array_element" && arguments.len() >= 2 {
            return format!("{}[{}]", arguments[0], arguments[1]);
        }

        let joined = arguments.join(",");
        if distinct {
            format!("{name}(DISTINCT {joined})")
        } else {
            format!("{name}({joined})")
        }
    }

    fn render_argument(&self, argument: &FunctionArg) -> String {
        match NameResolver::argument_expr(argument) {
            Some(FunctionArgExpr::Expr(expr)) => self.render(expr),
            Some(FunctionArgExpr::Wildcard) => "*".to_string(),
            Some(FunctionArgExpr::QualifiedWildcard(name)) => format!("{name}.*"),
            None => UNRESOLVED.to_string(),
        }
    }

    fn render_value(value: &Value) -> String {
        match value {
            Value::Number(number, _) => format!("Int64({number})"),
            Value::SingleQuotedString(text) | Value::DoubleQuotedString(text) => {
                format!("Utf8(\"{}\")", text.replace('"', "\\\""))
            }
            Value::Boolean(value) => value.to_string(),
            Value::Null => "Null".to_string(),
            _ => UNRESOLVED.to_string(),
        }
    }

    fn qualified(&self, qualifier: Option<&str>, name: &str) -> String {
        match qualifier.or(self.default_table) {
            Some(table) => format!("{table}.{name}"),
            None => name.to_string(),
        }
    }
}
