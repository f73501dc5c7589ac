pub mod data_type;
pub mod date;
pub mod table;
pub mod value;
