//! Shared types, error model, and configuration for DocAuditor.
//!
//! This crate is the foundation depended on by all other DocAuditor crates.
//! It provides:
//! - [`AuditError`] — the unified error type
//! - Domain types ([`SessionId`], [`Scenario`], the scenario catalog)
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ServerConfig, SessionConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{AuditError, Result};
pub use types::{Scenario, SessionId, find_scenario, scenario_catalog};
