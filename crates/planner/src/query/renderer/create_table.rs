use crate::query::{
    ast::create_table::CreateTable,
    renderer::{Render, Renderer},
};

impl Render for CreateTable {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("CREATE TABLE ");
        if self.if_not_exists {
            r.sql.push_str("IF NOT EXISTS ");
        }
        r.render_table_ref(&self.table);
        r.sql.push_str(" (");
        r.comma_separated(&self.columns, |r, col| {
            r.push_identifier(&col.name);
            r.sql.push(' ');
            r.sql.push_str(&col.type_name);
            if !col.is_nullable {
                r.sql.push_str(" NOT NULL");
            }
        });

        let key: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.clone())
            .collect();
        if !key.is_empty() {
            r.sql.push_str(", PRIMARY KEY (");
            r.push_quoted_list(&key);
            r.sql.push(')');
        }
        r.sql.push_str(");");
    }
}

#[cfg(test)]
mod tests {
    use crate::query::{
        ast::{
            common::TableRef,
            create_table::{ColumnDef, CreateTable},
        },
        dialect::Postgres,
        renderer::render,
    };

    #[test]
    fn test_render_create_table() {
        let ast = CreateTable {
            table: TableRef::new("imports"),
            columns: vec![
                ColumnDef {
                    name: "table_name".into(),
                    type_name: "TEXT".into(),
                    is_nullable: false,
                    is_primary_key: true,
                },
                ColumnDef {
                    name: "total".into(),
                    type_name: "BIGINT".into(),
                    is_nullable: true,
                    is_primary_key: false,
                },
            ],
            if_not_exists: true,
        };

        let (sql, params) = render(&ast, &Postgres);
        assert!(params.is_empty());
        assert_eq!(
            sql,
            r#"CREATE TABLE IF NOT EXISTS "imports" ("table_name" TEXT NOT NULL, "total" BIGINT, PRIMARY KEY ("table_name"));"#
        );
    }
}
