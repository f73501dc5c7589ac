pub mod create_table;
pub mod create_table_as;
pub mod drop_table;
