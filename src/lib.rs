pub mod bridges;
pub mod calendar;
pub mod config;
pub mod engine;
pub mod holidays;
pub mod metrics;
pub mod optimizer;
pub mod output;
pub mod server;
pub mod types;
