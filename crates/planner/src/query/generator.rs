use crate::query::{
    ast::{delete::DeletePartition, insert::InsertSelect, select::CountRows},
    builder::{create_table_as::CreateTableAsBuilder, drop_table::DropTableBuilder},
    dialect::Dialect,
    renderer::{Render, Renderer},
    table_ref,
};
use model::core::{date::TargetDate, table::TableIdent, value::QueryParam};

/// Column alias carried by [`QueryGenerator::count_rows`].
pub const ROW_COUNT_ALIAS: &str = "row_count";

/// Parameter name bound by [`QueryGenerator::delete_partition`].
pub const PARTITION_DATE_PARAM: &str = "partition_date";

/// Renders the fixed set of statements used to stage and commit a partition.
pub struct QueryGenerator<'a> {
    dialect: &'a dyn Dialect,
}

impl<'a> QueryGenerator<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self { dialect }
    }

    pub fn create_table_as(
        &self,
        table: &TableIdent,
        query: &str,
        expiration_hours: Option<u32>,
    ) -> String {
        let mut builder = CreateTableAsBuilder::new(table_ref(table), query).or_replace();
        if let Some(hours) = expiration_hours {
            builder = builder.expires_after_hours(hours);
        }
        self.render_sql(builder.build())
    }

    pub fn count_rows(&self, table: &TableIdent) -> String {
        self.render_sql(CountRows {
            table: table_ref(table),
            alias: ROW_COUNT_ALIAS.to_string(),
        })
    }

    pub fn delete_partition(
        &self,
        table: &TableIdent,
        column: &str,
        date: TargetDate,
    ) -> (String, Vec<QueryParam>) {
        self.render_ast(DeletePartition {
            table: table_ref(table),
            column: column.to_string(),
            date,
            param_name: PARTITION_DATE_PARAM.to_string(),
        })
    }

    pub fn insert_from(&self, table: &TableIdent, columns: &[&str], source: &TableIdent) -> String {
        self.render_sql(InsertSelect {
            table: table_ref(table),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            source: table_ref(source),
        })
    }

    pub fn drop_table(&self, table: &TableIdent) -> String {
        self.render_sql(DropTableBuilder::new(table_ref(table)).if_exists().build())
    }

    pub fn render_ast<T: Render>(&self, ast: T) -> (String, Vec<QueryParam>) {
        let mut renderer = Renderer::new(self.dialect);
        ast.render(&mut renderer);
        renderer.finish()
    }

    fn render_sql<T: Render>(&self, ast: T) -> String {
        let (sql, _) = self.render_ast(ast);
        sql
    }
}
