use crate::query::ast::common::TableRef;

/// `INSERT INTO t (cols) SELECT * FROM source`
#[derive(Debug, Clone)]
pub struct InsertSelect {
    pub table: TableRef,
    pub columns: Vec<String>,
    pub source: TableRef,
}
