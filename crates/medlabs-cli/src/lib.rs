//! CLI library components for the lab report pipeline.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod summary;
