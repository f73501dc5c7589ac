pub mod env;
pub mod environment;
pub mod error;
pub mod logging;
pub mod settings;
