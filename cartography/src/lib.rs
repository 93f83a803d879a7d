pub mod api;
pub mod config;
pub mod error;
pub mod graph;
pub mod hub;
pub mod ingest;
pub mod models;
pub mod services;
pub mod snapshot;
pub mod store;
