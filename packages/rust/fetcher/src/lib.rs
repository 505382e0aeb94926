//! Document service access and media resolution.
//!
//! This crate provides:
//! - [`client`]: the [`DocumentSource`] retrieval interface and its HTTP implementation
//! - [`assets`]: concurrent download of referenced media into an [`AssetSink`]
//!
//! [`AssetSink`]: docsnap_shared::AssetSink

pub mod assets;
pub mod client;

pub use assets::{asset_name, extension_for, resolve_assets};
pub use client::{DocsClient, DocumentSource, FetchedAsset};
