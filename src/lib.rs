//! Pricewatch - Zalando.nl price monitor Telegram bot
//! Built with Domain-Driven Design principles

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::monitor::PriceMonitor;
pub use config::Config;
pub use domain::diff::DiffEngine;
pub use domain::registry::ProductRegistry;
pub use infrastructure::store::JsonFileStore;
