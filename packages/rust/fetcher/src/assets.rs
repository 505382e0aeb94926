//! Concurrent resolution of media references to local files.

use std::collections::BTreeSet;

use futures::future::join_all;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};
use url::Url;

use docsnap_shared::{AssetMap, AssetSink, Result};

use crate::client::DocumentSource;

/// Extension used when neither the content type nor the URL names one.
const DEFAULT_EXTENSION: &str = "jpg";

/// Declared content type → file extension.
const CONTENT_TYPE_EXTENSIONS: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/svg+xml", "svg"),
    ("image/bmp", "bmp"),
    ("image/x-icon", "ico"),
    ("image/avif", "avif"),
    ("image/tiff", "tiff"),
];

/// Extensions accepted when inferring from a URL path.
const KNOWN_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "svg", "bmp", "ico", "avif", "tiff",
];

/// Stable local file stem for a media URL: hex SHA-256 of the URL string.
pub fn asset_name(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// File extension for a downloaded asset.
///
/// Tries the declared content type, then the extension of the final URL's
/// path, then falls back to `jpg`.
pub fn extension_for(content_type: Option<&str>, final_url: &str) -> &'static str {
    content_type
        .and_then(extension_from_content_type)
        .or_else(|| extension_from_url(final_url))
        .unwrap_or(DEFAULT_EXTENSION)
}

fn extension_from_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    CONTENT_TYPE_EXTENSIONS
        .iter()
        .find(|(ct, _)| *ct == mime)
        .map(|(_, ext)| *ext)
}

fn extension_from_url(url: &str) -> Option<&'static str> {
    let parsed = Url::parse(url).ok()?;
    let file = parsed.path_segments()?.next_back()?;
    let (_, ext) = file.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();

    KNOWN_EXTENSIONS
        .iter()
        .find(|known| **known == ext)
        .map(|known| if *known == "jpeg" { "jpg" } else { *known })
}

/// Resolve every URL in `urls` to a local asset stored through `sink`.
///
/// Assets already present in the sink (by content-derived name) are reused
/// without fetching. All remaining fetches run concurrently and the call
/// returns only once each has succeeded or failed. Failed URLs are logged
/// and left out of the returned map.
#[instrument(skip_all, fields(urls = urls.len()))]
pub async fn resolve_assets<S, K>(
    urls: &BTreeSet<String>,
    token: &str,
    source: &S,
    sink: &K,
) -> AssetMap
where
    S: DocumentSource,
    K: AssetSink,
{
    let outcomes = join_all(urls.iter().map(|url| resolve_one(url, token, source, sink))).await;

    let mut assets = AssetMap::new();
    for (url, outcome) in urls.iter().zip(outcomes) {
        match outcome {
            Ok(local) => {
                assets.insert(url.clone(), local);
            }
            Err(e) => {
                warn!(%url, code = e.code(), error = %e, "asset not resolved");
            }
        }
    }

    info!(
        resolved = assets.len(),
        failed = urls.len() - assets.len(),
        "asset resolution finished"
    );

    assets
}

async fn resolve_one<S, K>(url: &str, token: &str, source: &S, sink: &K) -> Result<String>
where
    S: DocumentSource,
    K: AssetSink,
{
    let stem = asset_name(url);

    if let Some(existing) = sink.find_asset(&stem) {
        debug!(%url, path = %existing, "reusing stored asset");
        return Ok(existing);
    }

    let asset = source.fetch_binary(url, token).await?;
    let extension = extension_for(asset.content_type.as_deref(), &asset.final_url);
    let local = sink
        .write_asset(&format!("{stem}.{extension}"), &asset.bytes)
        .await?;

    debug!(%url, path = %local, bytes = asset.bytes.len(), "asset stored");
    Ok(local)
}
