use sqlparser::ast::{Expr, FunctionArg, FunctionArgExpr, ObjectName};

pub struct NameResolver;

impl NameResolver {
    /// Unqualified column name behind a possibly parenthesized, possibly
    /// table-qualified column reference.
    pub fn column_name(expr: &Expr) -> Option<&str> {
        match expr {
            Expr::Identifier(ident) => Some(ident.value.as_str()),
            Expr::CompoundIdentifier(parts) => parts.last().map(|ident| ident.value.as_str()),
            Expr::Nested(inner) => Self::column_name(inner),
            _ => None,
        }
    }

    /// Dotted qualifier of a compound column reference, e.g. `t` in `t.col`.
    pub fn column_qualifier(expr: &Expr) -> Option<String> {
        match expr {
            Expr::CompoundIdentifier(parts) if parts.len() > 1 => Some(
                parts[..parts.len() - 1]
                    .iter()
                    .map(|ident| ident.value.as_str())
                    .collect::<Vec<_>>()
                    .join("."),
            ),
            Expr::Nested(inner) => Self::column_qualifier(inner),
            _ => None,
        }
    }

    /// Trailing segment of a table or function name.
    pub fn object_name(name: &ObjectName) -> Option<&str> {
        name.0
            .last()
            .and_then(|part| part.as_ident())
            .map(|ident| ident.value.as_str())
    }

    /// The expression slot of a call argument, named or positional.
    pub fn argument_expr(argument: &FunctionArg) -> Option<&FunctionArgExpr> {
        match argument {
            FunctionArg::Unnamed(expr) => Some(expr),
            FunctionArg::Named { arg, .. } | FunctionArg::ExprNamed { arg, .. } => Some(arg),
        }
    }
}
