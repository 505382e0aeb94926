//! Per-document output directory.
//!
//! Layout:
//! ```text
//! <base>/<sanitized-title>/
//! ├── {id}_mainsite.json
//! ├── {id}_document.json
//! ├── {id}_content.json
//! ├── {id}.html
//! └── images/
//!     └── <hash>.<ext>
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, info, instrument};

use docsnap_shared::{AssetSink, DocsnapError, Result};

use crate::sanitize::sanitize_filename;

/// Media subdirectory, also the prefix of the paths used in the HTML.
pub const IMAGES_DIR: &str = "images";

/// A created output directory for one document.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
    /// Stored media, file stem → file name. Listed once at creation and
    /// kept current by [`AssetSink::write_asset`].
    stored: Arc<Mutex<HashMap<String, String>>>,
}

impl OutputDir {
    /// Create `<base>/<sanitized title>/images/`, reusing existing directories.
    #[instrument(skip_all, fields(base = %base.display()))]
    pub fn create(base: &Path, title: &str) -> Result<Self> {
        let root = base.join(sanitize_filename(title));
        let images = root.join(IMAGES_DIR);
        std::fs::create_dir_all(&images).map_err(|e| DocsnapError::io(&images, e))?;
        let stored = list_assets(&images)?;

        info!(path = %root.display(), stored = stored.len(), "output directory ready");
        Ok(Self {
            root,
            stored: Arc::new(Mutex::new(stored)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    /// Write `data` as pretty-printed JSON to `file_name`.
    pub fn write_json<T: Serialize + ?Sized>(&self, file_name: &str, data: &T) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(data)?;
        self.write_text(file_name, &json)
    }

    /// Write a text file, replacing any previous content.
    pub fn write_text(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        let path = self.root.join(file_name);
        write_atomic(&path, content.as_bytes())?;
        debug!(path = %path.display(), len = content.len(), "wrote file");
        Ok(path)
    }
}

impl AssetSink for OutputDir {
    fn find_asset(&self, stem: &str) -> Option<String> {
        let stored = self.stored.lock().ok()?;
        stored.get(stem).map(|name| format!("{IMAGES_DIR}/{name}"))
    }

    async fn write_asset(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        let path = self.images_dir().join(file_name);
        let temp = temp_path(&path);

        tokio::fs::write(&temp, bytes)
            .await
            .map_err(|e| DocsnapError::io(&temp, e))?;
        tokio::fs::rename(&temp, &path)
            .await
            .map_err(|e| DocsnapError::io(&path, e))?;

        if let (Some(stem), Ok(mut stored)) = (Path::new(file_name).file_stem(), self.stored.lock()) {
            stored.insert(stem.to_string_lossy().into_owned(), file_name.to_string());
        }
        Ok(format!("{IMAGES_DIR}/{file_name}"))
    }
}

/// Visible files in `images`, keyed by stem.
fn list_assets(images: &Path) -> Result<HashMap<String, String>> {
    let entries = std::fs::read_dir(images).map_err(|e| DocsnapError::io(images, e))?;

    Ok(entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| !name.starts_with('.'))
        .filter_map(|name| {
            let stem = Path::new(&name).file_stem()?.to_string_lossy().into_owned();
            Some((stem, name))
        })
        .collect())
}

/// Hidden sibling used as the write target before the rename.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Write through a hidden temp file and rename into place, so readers never
/// see a partial file.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp = temp_path(path);

    std::fs::write(&temp, bytes).map_err(|e| DocsnapError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| DocsnapError::io(path, e))?;
    Ok(())
}
