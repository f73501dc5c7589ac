pub mod base;
pub mod bigquery;
