//! Core domain types shared across docsnap crates.

use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};

/// Origin of the hosted document service.
pub const DEFAULT_ORIGIN: &str = "https://alidocs.dingtalk.com";

/// Title used when the embedded payload carries no document name.
pub const DEFAULT_TITLE: &str = "Untitled document";

// ---------------------------------------------------------------------------
// AssetMap
// ---------------------------------------------------------------------------

/// Absolute media URL → path of the local copy, relative to the HTML file
/// (e.g. `images/<hash>.png`).
///
/// A URL missing from the map was attempted and could not be resolved.
pub type AssetMap = BTreeMap<String, String>;

/// Turn a media reference into an absolute URL.
///
/// Relative references (path-absolute, path-relative, or protocol-relative)
/// are joined onto `origin`. An origin that does not parse falls back to
/// plain prefixing.
pub fn absolute_url(src: &str, origin: &str) -> String {
    if src.starts_with("http") {
        return src.to_string();
    }

    match url::Url::parse(origin).and_then(|base| base.join(src)) {
        Ok(joined) => joined.to_string(),
        Err(_) => format!("{}{src}", origin.trim_end_matches('/')),
    }
}

// ---------------------------------------------------------------------------
// AssetSink
// ---------------------------------------------------------------------------

/// Destination for downloaded media files.
///
/// Paths handed out by a sink are relative to the rendered HTML file.
pub trait AssetSink: Send + Sync {
    /// Path of an already stored asset whose file stem is `stem`, if any.
    fn find_asset(&self, stem: &str) -> Option<String>;

    /// Store `bytes` under `file_name` and return its relative path.
    fn write_asset(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> impl Future<Output = crate::Result<String>> + Send;
}

// ---------------------------------------------------------------------------
// FileMeta
// ---------------------------------------------------------------------------

/// File metadata carried by the document-data response (`data.fileMetaInfo`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    /// Display name of the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Service-side document type label.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl FileMeta {
    /// Read `data.fileMetaInfo` from a document-data response; missing or
    /// malformed metadata yields an empty value.
    pub fn from_document_data(document_data: &serde_json::Value) -> Self {
        document_data
            .pointer("/data/fileMetaInfo")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }
}
