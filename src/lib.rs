pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod progress;
pub mod query;
pub mod refresh;
pub mod server;
