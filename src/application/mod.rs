//! Application layer - scheduler loop, command handling, user-facing texts

pub mod commands;
pub mod messages;
pub mod monitor;

pub use commands::{Command, CommandHandler};
pub use monitor::{Jitter, MonitorConfig, PriceMonitor, RandomJitter};
