pub mod config;
pub mod decoder;
pub mod forward;
pub mod host;
pub mod logger;
pub mod message;
pub mod node;
pub mod payload;
pub mod process;
pub mod schema;
