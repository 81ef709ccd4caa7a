use crate::query::{
    ast::select::Select,
    renderer::{Render, Renderer},
};

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("SELECT ");
        if self.columns.is_empty() {
            r.sql.push('*');
        }
        r.comma_separated(&self.columns, |r, col| col.render(r));

        if let Some(from) = &self.from {
            r.sql.push_str(" FROM ");
            r.render_table_ref(from);
        }

        if let Some(where_clause) = &self.where_clause {
            r.sql.push_str(" WHERE ");
            where_clause.render(r);
        }

        if let Some(limit) = self.limit {
            r.sql.push_str(&format!(" LIMIT {limit}"));
        }
        r.sql.push(';');
    }
}

#[cfg(test)]
mod tests {
    use crate::query::{
        ast::{common::TableRef, expr::Expr, select::Select},
        dialect::Postgres,
        ident,
        renderer::render,
    };

    #[test]
    fn test_render_select_where_all_null() {
        let ast = Select {
            columns: vec![ident("cnt").cast("TEXT").alias("total")],
            from: Some(TableRef::new("cube_x")),
            where_clause: Some(Expr::And(vec![ident("a").is_null(), ident("b").is_null()])),
            limit: Some(2),
        };

        let (sql, params) = render(&ast, &Postgres);
        assert!(params.is_empty());
        assert_eq!(
            sql,
            r#"SELECT "cnt"::TEXT AS "total" FROM "cube_x" WHERE "a" IS NULL AND "b" IS NULL LIMIT 2;"#
        );
    }
}
