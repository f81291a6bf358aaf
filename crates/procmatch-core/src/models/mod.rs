//! Data models: catalog, decision trace, configuration.

pub mod catalog;
pub mod config;
pub mod trace;
