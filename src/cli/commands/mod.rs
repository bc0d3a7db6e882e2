pub mod config;
pub mod fetch;
pub mod search;
pub mod serve;
pub mod version;
