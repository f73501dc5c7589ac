use crate::query::ast::common::TableRef;
use model::core::date::TargetDate;

/// Deletes every row whose partition column falls on `date`.
#[derive(Debug, Clone)]
pub struct DeletePartition {
    pub table: TableRef,
    pub column: String,
    pub date: TargetDate,
    pub param_name: String,
}
