//! Shared types and utilities

pub mod errors;
pub mod types;
