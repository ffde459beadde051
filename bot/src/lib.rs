pub mod exchange;
pub mod http;
pub mod notify;
pub mod services;
pub mod state;
pub mod strategy;
