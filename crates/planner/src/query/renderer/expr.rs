use crate::query::{
    ast::expr::Expr,
    renderer::{Render, Renderer},
};

impl Render for Expr {
    fn render(&self, r: &mut Renderer) {
        match self {
            Expr::Identifier(ident) => {
                if let Some(qualifier) = &ident.qualifier {
                    r.push_identifier(qualifier);
                    r.sql.push('.');
                }
                r.push_identifier(&ident.name);
            }
            Expr::Value(value) => r.add_param(value.clone()),
            Expr::Null => r.sql.push_str("NULL"),
            Expr::Cast { expr, type_name } => {
                expr.render(r);
                r.sql.push_str("::");
                r.sql.push_str(type_name);
            }
            Expr::IsNull(expr) => {
                expr.render(r);
                r.sql.push_str(" IS NULL");
            }
            Expr::And(exprs) => {
                if exprs.is_empty() {
                    r.sql.push_str("TRUE");
                    return;
                }
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        r.sql.push_str(" AND ");
                    }
                    expr.render(r);
                }
            }
            Expr::Alias { expr, alias } => {
                expr.render(r);
                r.sql.push_str(" AS ");
                r.push_identifier(alias);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::query::{dialect::Postgres, ident, renderer::render, value};
    use model::core::value::Value;

    #[test]
    fn renders_double_cast_placeholder() {
        let expr = value(Value::String("7".into())).cast("TEXT").cast("BIGINT");
        let (sql, params) = render(&expr, &Postgres);
        assert_eq!(sql, "$1::TEXT::BIGINT");
        assert_eq!(params, vec![Value::String("7".into())]);
    }

    #[test]
    fn renders_null_conjunction() {
        let expr = crate::query::ast::expr::Expr::And(vec![
            ident("a").is_null(),
            ident("b").is_null(),
        ]);
        let (sql, _) = render(&expr, &Postgres);
        assert_eq!(sql, r#""a" IS NULL AND "b" IS NULL"#);
    }
}
