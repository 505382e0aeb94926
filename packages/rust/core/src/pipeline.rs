//! End-to-end parse pipeline: identifier → page → document data → decode →
//! media → HTML, with optional persistence of every intermediate.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{info, instrument, warn};

use docsnap_artifacts::{OutputDir, replace_illegal_chars};
use docsnap_fetcher::{DocumentSource, resolve_assets};
use docsnap_model::{
    Document, collect_image_urls, extract_content_envelope, extract_document_identifier,
    extract_embedded_json, extract_title, resolve_document_id,
};
use docsnap_render::{RenderContext, render};
use docsnap_shared::{AssetMap, DocsnapError, FileMeta, Result};

/// Input to [`run_pipeline`].
#[derive(Debug, Clone)]
pub struct ParseRequest {
    /// Full document URL or bare document id.
    pub url_or_id: String,
    /// Opaque session token, sent as the request cookie.
    pub token: String,
    /// Base directory for persisted artifacts. `None` renders in memory only
    /// and skips media download.
    pub output_root: Option<PathBuf>,
}

/// Everything one pipeline run produced.
#[derive(Debug)]
pub struct ParseResult {
    pub document_id: String,
    /// Key that authorised the document-data request.
    pub entry_key: String,
    pub title: String,
    /// Page-embedded payload.
    pub embedded: Value,
    /// Raw document-data response.
    pub document_data: Value,
    /// Decoded content envelope; `None` when the body is encrypted or otherwise unsupported.
    pub content: Option<Value>,
    pub document: Option<Document>,
    /// Rendered page; `None` when there was no content or no main part.
    pub html: Option<String>,
    /// Directory holding the artifacts, when persisting.
    pub output_dir: Option<PathBuf>,
    /// Files written, in write order. Media files are not listed.
    pub files: Vec<PathBuf>,
    /// Distinct images referenced by the main part.
    pub image_count: usize,
    /// Media resolution outcome; `None` when resolution was skipped.
    pub assets: Option<AssetMap>,
    pub elapsed: Duration,
}

impl ParseResult {
    /// File metadata from the document-data response.
    pub fn file_meta(&self) -> FileMeta {
        FileMeta::from_document_data(&self.document_data)
    }

    /// Number of parts in the decoded document (0 without content).
    pub fn part_count(&self) -> usize {
        self.document.as_ref().map_or(0, |d| d.parts().len())
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once media resolution has settled.
    fn assets_resolved(&self, resolved: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &ParseResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn assets_resolved(&self, _resolved: usize, _total: usize) {}
    fn done(&self, _result: &ParseResult) {}
}

/// Run the parse pipeline.
///
/// 1. Resolve the document id and retrieve the page
/// 2. Extract the embedded payload, entry key, and title
/// 3. Retrieve the document data and decode the content envelope
/// 4. Collect media; download it only when persisting
/// 5. Render HTML
///
/// Each stage's output is written to the output directory as it becomes
/// available. The first hard failure aborts the run; undecodable content
/// does not, it yields a result without `content` and `html`.
#[instrument(skip_all, fields(input = %request.url_or_id, persist = request.output_root.is_some()))]
pub async fn run_pipeline<S: DocumentSource>(
    source: &S,
    request: &ParseRequest,
    progress: &dyn ProgressReporter,
) -> Result<ParseResult> {
    let start = Instant::now();
    let token = request.token.trim();
    if token.is_empty() {
        return Err(DocsnapError::config("session token is empty"));
    }

    let document_id = resolve_document_id(&request.url_or_id)?;
    let file_stem = replace_illegal_chars(&document_id);
    info!(%document_id, "starting parse pipeline");

    // --- Phase 1: Page ---
    progress.phase("Fetching document page");
    let page = source.fetch_page(&document_id, token).await?;
    let embedded = extract_embedded_json(&page)?;
    let entry_key = extract_document_identifier(&embedded)?;
    let title = extract_title(&embedded);
    info!(%title, "document identified");

    let output = request
        .output_root
        .as_deref()
        .map(|base| OutputDir::create(base, &title))
        .transpose()?;

    let mut files = Vec::new();
    if let Some(out) = &output {
        files.push(out.write_json(&format!("{file_stem}_mainsite.json"), &embedded)?);
    }

    // --- Phase 2: Document data ---
    progress.phase("Fetching document data");
    let document_data = source.fetch_document_data(token, &entry_key).await?;
    if let Some(out) = &output {
        files.push(out.write_json(&format!("{file_stem}_document.json"), &document_data)?);
    }

    // --- Phase 3: Decode ---
    progress.phase("Decoding content");
    let content = extract_content_envelope(&document_data);
    let document = content.as_ref().map(Document::from_value);

    let mut image_count = 0;
    let mut assets = None;
    let mut html = None;

    match (&content, &document) {
        (Some(content), Some(document)) => {
            if let Some(out) = &output {
                files.push(out.write_json(&format!("{file_stem}_content.json"), content)?);
            }

            // --- Phase 4: Media ---
            let urls = collect_image_urls(document, source.origin());
            image_count = urls.len();
            if let Some(out) = &output {
                progress.phase("Downloading images");
                let resolved = resolve_assets(&urls, token, source, out).await;
                progress.assets_resolved(resolved.len(), urls.len());
                assets = Some(resolved);
            } else {
                info!(images = urls.len(), "not persisting, image download skipped");
            }

            // --- Phase 5: Render ---
            progress.phase("Rendering HTML");
            let ctx = RenderContext {
                origin: source.origin(),
                assets: assets.as_ref(),
            };
            html = render(document, &title, &ctx);

            match (&html, &output) {
                (Some(page), Some(out)) => {
                    files.push(out.write_text(&format!("{file_stem}.html"), page)?);
                }
                (None, _) => warn!("main part not found, nothing rendered"),
                _ => {}
            }
        }
        _ => {
            warn!("content could not be decoded (possibly encrypted, unsupported)");
        }
    }

    let result = ParseResult {
        document_id,
        entry_key,
        title,
        embedded,
        document_data,
        content,
        document,
        html,
        output_dir: output.map(|out| out.path().to_path_buf()),
        files,
        image_count,
        assets,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        document_id = %result.document_id,
        decoded = result.content.is_some(),
        rendered = result.html.is_some(),
        files = result.files.len(),
        elapsed_ms = result.elapsed.as_millis(),
        "parse pipeline complete"
    );

    Ok(result)
}
