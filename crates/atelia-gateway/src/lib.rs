//! The HTTP edge: webhook intake, health, and configuration discovery.

pub mod config;
pub mod server;

pub use {
    config::{AteliaConfig, discover_and_load, load_config},
    server::build_app,
};
