use crate::query::{
    ast::insert::{Insert, Upsert},
    renderer::{Render, Renderer},
};

impl Render for Insert {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("INSERT INTO ");
        r.render_table_ref(&self.table);
        r.sql.push_str(" (");
        r.push_quoted_list(&self.columns);
        r.sql.push_str(") VALUES ");

        r.comma_separated(&self.rows, |r, row| {
            r.sql.push('(');
            r.comma_separated(row, |r, expr| expr.render(r));
            r.sql.push(')');
        });

        if let Some(upsert) = &self.upsert {
            render_upsert(upsert, r);
        }
        r.sql.push(';');
    }
}

fn render_upsert(upsert: &Upsert, r: &mut Renderer) {
    r.sql.push_str(" ON CONFLICT (");
    r.push_quoted_list(&upsert.key);
    r.sql.push(')');

    if upsert.update.is_empty() {
        r.sql.push_str(" DO NOTHING");
        return;
    }

    r.sql.push_str(" DO UPDATE SET ");
    r.comma_separated(&upsert.update, |r, column| {
        r.push_identifier(column);
        r.sql.push_str(" = EXCLUDED.");
        r.push_identifier(column);
    });
}

#[cfg(test)]
mod tests {
    use crate::query::{
        ast::{
            common::TableRef,
            expr::Expr,
            insert::{Insert, Upsert},
        },
        dialect::Postgres,
        renderer::render,
        value,
    };
    use model::core::value::Value;

    fn text(v: &str) -> Expr {
        value(Value::String(v.to_string()))
    }

    #[test]
    fn renders_multi_row_insert_with_casts() {
        let ast = Insert {
            table: TableRef::new("cube_sub"),
            columns: vec!["age".to_string(), "cnt".to_string()],
            rows: vec![
                vec![text("0-17"), text("12").cast("TEXT").cast("BIGINT")],
                vec![Expr::Null, text("30").cast("TEXT").cast("BIGINT")],
            ],
            upsert: None,
        };

        let (sql, params) = render(&ast, &Postgres);
        assert_eq!(
            sql,
            r#"INSERT INTO "cube_sub" ("age", "cnt") VALUES ($1, $2::TEXT::BIGINT), (NULL, $3::TEXT::BIGINT);"#
        );
        assert_eq!(params, vec![
            Value::String("0-17".to_string()),
            Value::String("12".to_string()),
            Value::String("30".to_string()),
        ]);
    }

    #[test]
    fn renders_upsert_from_excluded_row() {
        let ast = Insert {
            table: TableRef::new("cubeload_imports"),
            columns: vec!["table_name".to_string(), "total".to_string()],
            rows: vec![vec![text("cube_sub"), value(Value::Int(42))]],
            upsert: Some(Upsert {
                key: vec!["table_name".to_string()],
                update: vec!["total".to_string()],
            }),
        };

        let (sql, params) = render(&ast, &Postgres);
        assert_eq!(
            sql,
            concat!(
                r#"INSERT INTO "cubeload_imports" ("table_name", "total") VALUES ($1, $2) "#,
                r#"ON CONFLICT ("table_name") DO UPDATE SET "total" = EXCLUDED."total";"#
            )
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn upsert_without_updates_does_nothing() {
        let ast = Insert {
            table: TableRef::new("t"),
            columns: vec!["a".to_string()],
            rows: vec![vec![value(Value::Int(1))]],
            upsert: Some(Upsert {
                key: vec!["a".to_string()],
                update: vec![],
            }),
        };

        let (sql, _) = render(&ast, &Postgres);
        assert!(sql.ends_with(r#"ON CONFLICT ("a") DO NOTHING;"#));
    }
}
