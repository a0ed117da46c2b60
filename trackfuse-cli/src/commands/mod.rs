//! CLI command implementations.

pub mod common;
pub mod config;
pub mod once;
pub mod output;
pub mod run;
pub mod status;
