//! Shared types, error model, and configuration for docsnap.
//!
//! This crate is the foundation depended on by all other docsnap crates.
//! It provides:
//! - [`DocsnapError`]: the unified error type
//! - Domain types ([`AssetMap`], [`FileMeta`]), the [`AssetSink`] seam, and service constants
//! - Configuration ([`AppConfig`], config loading, session token resolution)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, ServiceConfig, SessionConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, resolve_session_token,
};
pub use error::{DocsnapError, Result};
pub use types::{AssetMap, AssetSink, DEFAULT_ORIGIN, DEFAULT_TITLE, FileMeta, absolute_url};
