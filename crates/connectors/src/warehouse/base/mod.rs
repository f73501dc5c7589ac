pub mod adapter;
pub mod error;
