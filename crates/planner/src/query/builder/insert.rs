use crate::query::ast::{
    common::TableRef,
    expr::Expr,
    insert::{Insert, Upsert},
};

#[derive(Debug, Clone)]
pub struct InsertBuilder {
    ast: Insert,
}

impl InsertBuilder {
    pub fn new(table: TableRef, columns: &[String]) -> Self {
        Self {
            ast: Insert {
                table,
                columns: columns.to_vec(),
                ..Default::default()
            },
        }
    }

    pub fn row(mut self, row: Vec<Expr>) -> Self {
        self.ast.rows.push(row);
        self
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = Vec<Expr>>) -> Self {
        self.ast.rows.extend(rows);
        self
    }

    /// Replaces every non-key column of a conflicting row.
    pub fn upsert_on(mut self, key: &[String]) -> Self {
        let update = self
            .ast
            .columns
            .iter()
            .filter(|c| !key.contains(c))
            .cloned()
            .collect();
        self.ast.upsert = Some(Upsert {
            key: key.to_vec(),
            update,
        });
        self
    }

    pub fn build(self) -> Insert {
        self.ast
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{dialect::Postgres, renderer::render, value};
    use model::core::value::Value;

    #[test]
    fn upsert_updates_non_key_columns() {
        let cols = vec!["table_name".to_string(), "columns".to_string()];
        let ast = InsertBuilder::new(TableRef::new("meta"), &cols)
            .row(vec![
                value(Value::String("t".into())),
                value(Value::String("[]".into())).cast("JSONB"),
            ])
            .upsert_on(&cols[..1])
            .build();

        assert_eq!(ast.upsert.as_ref().map(|u| u.update.clone()), Some(vec!["columns".to_string()]));
        let (sql, _) = render(&ast, &Postgres);
        assert_eq!(
            sql,
            concat!(
                r#"INSERT INTO "meta" ("table_name", "columns") VALUES ($1, $2::JSONB) "#,
                r#"ON CONFLICT ("table_name") DO UPDATE SET "columns" = EXCLUDED."columns";"#
            )
        );
    }

    #[test]
    fn rows_keep_input_order() {
        let cols = vec!["a".to_string()];
        let ast = InsertBuilder::new(TableRef::new("t"), &cols)
            .rows((1..=3).map(|i| vec![value(Value::Int(i))]))
            .build();
        let (sql, params) = render(&ast, &Postgres);
        assert_eq!(sql, r#"INSERT INTO "t" ("a") VALUES ($1), ($2), ($3);"#);
        assert_eq!(params, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }
}
