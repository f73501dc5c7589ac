use crate::query::ast::{
    common::TableRef,
    create_table::{ColumnDef, CreateTable, PartitionSpec},
};
use model::core::data_type::DataType;

#[derive(Debug, Clone)]
pub struct CreateTableBuilder {
    ast: CreateTable,
}

impl CreateTableBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            ast: CreateTable {
                table,
                ..Default::default()
            },
        }
    }

    pub fn if_not_exists(mut self) -> Self {
        self.ast.if_not_exists = true;
        self
    }

    pub fn column(mut self, name: &str, data_type: DataType) -> Self {
        self.ast.columns.push(ColumnDef {
            name: name.to_string(),
            data_type,
        });
        self
    }

    pub fn partition_by_date(mut self, column: &str) -> Self {
        self.ast.partition_by = Some(PartitionSpec::Date(column.to_string()));
        self
    }

    pub fn cluster_by(mut self, columns: &[&str]) -> Self {
        self.ast.cluster_by = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn build(self) -> CreateTable {
        self.ast
    }
}
