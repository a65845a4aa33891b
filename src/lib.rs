pub mod api;
pub mod config;
pub mod error;
pub mod prediction;
pub mod state;
pub mod weather;
