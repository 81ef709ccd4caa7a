use model::{
    column::{AGGREGATE_COLUMNS, ColumnDescriptor, is_aggregate},
    core::{data_type::DataType, identifiers::{MAX_IDENTIFIER_LEN, TableName}},
};
use planner::query::{
    ast::{
        common::{NullsOrder, TableRef},
        create_index::{CreateIndex, IndexColumn},
        create_table::{ColumnDef, CreateTable},
        drop::DropObject,
    },
    dialect::{Dialect, Postgres},
    renderer::render,
};

const INDEX_SUFFIX: &str = "_dims";

/// Physical layout of an import table.
///
/// One column per header entry, in header order, followed by any reserved
/// aggregate column the header did not name. Aggregates are always integer.
/// Every other column is a dimension and takes part in the unique index.
#[derive(Debug, Clone)]
pub struct SchemaPlan {
    table: TableName,
    columns: Vec<(String, DataType)>,
    dimensions: Vec<String>,
}

impl SchemaPlan {
    pub fn new(table: &TableName, header: &[ColumnDescriptor]) -> Self {
        let mut columns: Vec<(String, DataType)> = header
            .iter()
            .map(|c| {
                let data_type = if c.is_aggregate() {
                    DataType::Integer
                } else {
                    c.data_type
                };
                (c.name.clone(), data_type)
            })
            .collect();

        for aggregate in AGGREGATE_COLUMNS {
            if !header.iter().any(|c| c.name == aggregate) {
                columns.push((aggregate.to_string(), DataType::Integer));
            }
        }

        let dimensions = header
            .iter()
            .filter(|c| !is_aggregate(&c.name))
            .map(|c| c.name.clone())
            .collect();

        Self {
            table: table.clone(),
            columns,
            dimensions,
        }
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    pub fn columns(&self) -> &[(String, DataType)] {
        &self.columns
    }

    /// `<table>_dims`, with the table part shortened to keep the name
    /// within the identifier limit.
    pub fn index_name(&self) -> String {
        let budget = MAX_IDENTIFIER_LEN - INDEX_SUFFIX.len();
        let mut base = self.table.as_str();
        if base.len() > budget {
            let mut cut = budget;
            while !base.is_char_boundary(cut) {
                cut -= 1;
            }
            base = &base[..cut];
        }
        format!("{base}{INDEX_SUFFIX}")
    }

    /// DDL in execution order. Existing objects are dropped first because
    /// re-imports reuse the table name. No index is created when the table
    /// has no dimension columns.
    pub fn statements(&self) -> Vec<String> {
        let dialect = Postgres;
        let table = TableRef::new(self.table.as_str());

        let mut statements = vec![
            render(&DropObject::table(table.clone()), &dialect).0,
            render(
                &CreateTable {
                    table: table.clone(),
                    columns: self
                        .columns
                        .iter()
                        .map(|(name, data_type)| ColumnDef {
                            name: name.clone(),
                            type_name: dialect.render_data_type(data_type),
                            is_nullable: true,
                            is_primary_key: false,
                        })
                        .collect(),
                    if_not_exists: false,
                },
                &dialect,
            )
            .0,
            render(&DropObject::index(TableRef::new(self.index_name())), &dialect).0,
        ];

        if !self.dimensions.is_empty() {
            let index = CreateIndex {
                name: self.index_name(),
                table,
                columns: self
                    .dimensions
                    .iter()
                    .map(|name| IndexColumn {
                        name: name.clone(),
                        nulls: Some(NullsOrder::Last),
                    })
                    .collect(),
                unique: true,
            };
            statements.push(render(&index, &dialect).0);
        }

        statements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cols: &[(&str, DataType)]) -> Vec<ColumnDescriptor> {
        cols.iter()
            .map(|(n, t)| ColumnDescriptor::new(n, n, "", *t))
            .collect()
    }

    #[test]
    fn builds_ddl_in_order() {
        let table = TableName::new("cube_x").unwrap();
        let plan = SchemaPlan::new(
            &table,
            &header(&[
                ("a", DataType::Integer),
                ("b", DataType::String),
                ("cnt", DataType::String),
            ]),
        );

        assert_eq!(
            plan.statements(),
            vec![
                r#"DROP TABLE IF EXISTS "cube_x";"#.to_string(),
                r#"CREATE TABLE "cube_x" ("a" BIGINT, "b" TEXT, "cnt" BIGINT, "cnt_min" BIGINT, "cnt_max" BIGINT);"#.to_string(),
                r#"DROP INDEX IF EXISTS "cube_x_dims";"#.to_string(),
                r#"CREATE UNIQUE INDEX "cube_x_dims" ON "cube_x" ("a" NULLS LAST, "b" NULLS LAST);"#.to_string(),
            ]
        );
    }

    #[test]
    fn aggregates_are_not_dimensions() {
        let table = TableName::new("cube_x").unwrap();
        let plan = SchemaPlan::new(
            &table,
            &header(&[("cnt_min", DataType::Integer), ("sex", DataType::String)]),
        );
        assert_eq!(plan.dimensions(), ["sex".to_string()]);
        let names: Vec<&str> = plan.columns().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["cnt_min", "sex", "cnt", "cnt_max"]);
    }

    #[test]
    fn skips_index_without_dimensions() {
        let table = TableName::new("cube_x").unwrap();
        let plan = SchemaPlan::new(&table, &header(&[("cnt", DataType::Integer)]));
        assert_eq!(plan.statements().len(), 3);
    }

    #[test]
    fn index_name_fits_identifier_limit() {
        let table = TableName::new("t".repeat(63)).unwrap();
        let plan = SchemaPlan::new(&table, &[]);
        assert_eq!(plan.index_name().len(), MAX_IDENTIFIER_LEN);
        assert!(plan.index_name().ends_with("_dims"));
    }
}
