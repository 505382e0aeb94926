//! On-disk artifacts for parsed documents.
//!
//! This crate provides:
//! - [`OutputDir`]: the per-document directory; also the [`AssetSink`] media is stored through
//! - [`sanitize_filename`]: title → directory name
//! - [`replace_illegal_chars`]: identifier → file name prefix
//!
//! [`AssetSink`]: docsnap_shared::AssetSink

pub mod output;
pub mod sanitize;

pub use output::{IMAGES_DIR, OutputDir};
pub use sanitize::{MAX_NAME_CHARS, replace_illegal_chars, sanitize_filename};
