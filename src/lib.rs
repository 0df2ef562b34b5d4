pub mod config;
pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod services;
pub mod state;
pub mod validation;

pub use state::AppState;
