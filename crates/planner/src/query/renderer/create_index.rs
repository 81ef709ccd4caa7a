use crate::query::{
    ast::{common::NullsOrder, create_index::CreateIndex},
    renderer::{Render, Renderer},
};

impl Render for CreateIndex {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(if self.unique {
            "CREATE UNIQUE INDEX "
        } else {
            "CREATE INDEX "
        });
        r.push_identifier(&self.name);
        r.sql.push_str(" ON ");
        r.render_table_ref(&self.table);
        r.sql.push_str(" (");
        r.comma_separated(&self.columns, |r, col| {
            r.push_identifier(&col.name);
            match col.nulls {
                Some(NullsOrder::First) => r.sql.push_str(" NULLS FIRST"),
                Some(NullsOrder::Last) => r.sql.push_str(" NULLS LAST"),
                None => {}
            }
        });
        r.sql.push_str(");");
    }
}

#[cfg(test)]
mod tests {
    use crate::query::{
        ast::{
            common::{NullsOrder, TableRef},
            create_index::{CreateIndex, IndexColumn},
        },
        dialect::Postgres,
        renderer::render,
    };

    #[test]
    fn test_render_unique_index_nulls_last() {
        let ast = CreateIndex {
            name: "cube_x_dims".into(),
            table: TableRef::new("cube_x"),
            columns: vec![
                IndexColumn {
                    name: "a".into(),
                    nulls: Some(NullsOrder::Last),
                },
                IndexColumn {
                    name: "b".into(),
                    nulls: Some(NullsOrder::Last),
                },
            ],
            unique: true,
        };

        let (sql, _) = render(&ast, &Postgres);
        assert_eq!(
            sql,
            r#"CREATE UNIQUE INDEX "cube_x_dims" ON "cube_x" ("a" NULLS LAST, "b" NULLS LAST);"#
        );
    }
}
