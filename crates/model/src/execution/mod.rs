pub mod errors;
pub mod result;
