pub mod common;
pub mod create_table;
pub mod create_table_as;
pub mod delete;
pub mod drop_table;
pub mod insert;
pub mod select;
