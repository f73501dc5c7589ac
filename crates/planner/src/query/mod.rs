use model::core::table::TableIdent;

use crate::query::ast::common::TableRef;

pub mod ast;
pub mod builder;
pub mod dialect;
pub mod generator;
pub mod impressions;
pub mod renderer;

pub fn table_ref(table: &TableIdent) -> TableRef {
    TableRef::from(table)
}
