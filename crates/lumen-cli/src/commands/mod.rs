//! CLI command implementations

pub mod config;
pub mod probe;
pub mod simulate;
