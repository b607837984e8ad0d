pub mod caller;
pub mod common;
pub mod config;
pub mod connection;
pub mod endpoints;
pub mod logging;
pub mod manager;
pub mod mapper;
pub mod observability;
pub mod query;
pub mod template;

// Trait seams and the adapters behind them
pub mod app;
pub mod infra;
