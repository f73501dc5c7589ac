pub mod adapter;
pub mod auth;
pub mod params;
pub mod row;
pub mod wire;
