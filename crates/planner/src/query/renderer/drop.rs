use crate::query::{
    ast::drop::DropObject,
    renderer::{Render, Renderer},
};

impl Render for DropObject {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("DROP ");
        r.sql.push_str(self.kind.keyword());
        if self.if_exists {
            r.sql.push_str(" IF EXISTS");
        }
        r.sql.push(' ');
        r.render_table_ref(&self.target);
        r.sql.push(';');
    }
}

#[cfg(test)]
mod tests {
    use crate::query::{
        ast::{
            common::TableRef,
            drop::{DropObject, ObjectKind},
        },
        dialect::Postgres,
        renderer::render,
    };

    #[test]
    fn renders_drop_table_if_exists() {
        let (sql, params) = render(&DropObject::table(TableRef::new("cube_sub")), &Postgres);
        assert!(params.is_empty());
        assert_eq!(sql, r#"DROP TABLE IF EXISTS "cube_sub";"#);
    }

    #[test]
    fn renders_qualified_drop_index() {
        let ast = DropObject {
            kind: ObjectKind::Index,
            target: TableRef::qualified("public", "cube_x_dims"),
            if_exists: false,
        };
        let (sql, _) = render(&ast, &Postgres);
        assert_eq!(sql, r#"DROP INDEX "public"."cube_x_dims";"#);
    }
}
