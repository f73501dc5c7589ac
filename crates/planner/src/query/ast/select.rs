use crate::query::ast::common::TableRef;

/// `SELECT COUNT(*) AS alias FROM t`
#[derive(Debug, Clone)]
pub struct CountRows {
    pub table: TableRef,
    pub alias: String,
}
