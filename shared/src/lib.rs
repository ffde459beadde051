pub mod config;
pub mod crypto;
pub mod database;
pub mod entity;
pub mod error;
pub mod models;

pub use config::Config;
pub use database::get_db_connection;
pub use error::Error;
pub use models::*;
