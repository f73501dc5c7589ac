use crate::query::ast::common::TableRef;

/// `CREATE [OR REPLACE] TABLE t [OPTIONS(...)] AS <query>`
#[derive(Debug, Clone)]
pub struct CreateTableAs {
    pub table: TableRef,
    pub or_replace: bool,
    /// Hours after creation at which the warehouse drops the table.
    pub expiration_hours: Option<u32>,
    pub query: String,
}
