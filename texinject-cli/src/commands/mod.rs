//! Command implementations.

pub mod common;
pub mod config;
pub mod inject;
pub mod scan;
pub mod stage;
