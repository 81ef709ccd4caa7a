use crate::query::ast::{common::TableRef, expr::Expr, select::Select};

#[derive(Debug, Clone, Default)]
pub struct SelectBuilder {
    ast: Select,
}

impl SelectBuilder {
    pub fn new(columns: Vec<Expr>) -> Self {
        Self {
            ast: Select {
                columns,
                ..Default::default()
            },
        }
    }

    pub fn from(mut self, table: TableRef) -> Self {
        self.ast.from = Some(table);
        self
    }

    /// Adds a predicate, combining with any existing one using AND.
    pub fn where_clause(mut self, expr: Expr) -> Self {
        self.ast.where_clause = match self.ast.where_clause.take() {
            None => Some(expr),
            Some(Expr::And(mut exprs)) => {
                exprs.push(expr);
                Some(Expr::And(exprs))
            }
            Some(existing) => Some(Expr::And(vec![existing, expr])),
        };
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.ast.limit = Some(limit);
        self
    }

    pub fn build(self) -> Select {
        self.ast
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{dialect::Postgres, ident, renderer::render};

    #[test]
    fn test_select_builder_combines_predicates() {
        let ast = SelectBuilder::new(vec![])
            .from(TableRef::new("t"))
            .where_clause(ident("a").is_null())
            .where_clause(ident("b").is_null())
            .limit(10)
            .build();

        let (sql, _) = render(&ast, &Postgres);
        assert_eq!(
            sql,
            r#"SELECT * FROM "t" WHERE "a" IS NULL AND "b" IS NULL LIMIT 10;"#
        );
    }
}
