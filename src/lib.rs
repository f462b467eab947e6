pub mod analysis;
pub mod api;
pub mod auth;
pub mod cache;
pub mod clients;
pub mod config;
pub mod domain;
pub mod ml;
pub mod state;
pub mod store;
pub mod telemetry;
