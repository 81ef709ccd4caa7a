//! Expression nodes shared by every statement.

use model::core::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub qualifier: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A quoted column reference, optionally qualified.
    Identifier(Ident),
    /// A bound parameter. Rendered as a placeholder.
    Value(Value),
    /// The SQL `NULL` literal. Never bound as a parameter.
    Null,
    /// `expr::type`
    Cast { expr: Box<Expr>, type_name: String },
    /// `expr IS NULL`
    IsNull(Box<Expr>),
    /// Conjunction of the inner expressions; `TRUE` when empty.
    And(Vec<Expr>),
    /// `expr AS "alias"`
    Alias { expr: Box<Expr>, alias: String },
}

impl Expr {
    pub fn cast(self, type_name: &str) -> Expr {
        Expr::Cast {
            expr: Box::new(self),
            type_name: type_name.to_string(),
        }
    }

    pub fn is_null(self) -> Expr {
        Expr::IsNull(Box::new(self))
    }

    pub fn alias(self, alias: &str) -> Expr {
        Expr::Alias {
            expr: Box::new(self),
            alias: alias.to_string(),
        }
    }
}
