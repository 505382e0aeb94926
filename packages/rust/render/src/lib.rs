//! HTML rendering of decoded documents.
//!
//! Each top-level block is dispatched on its [`NodeKind`] to a
//! [`BlockRenderer`] held by a [`RendererRegistry`]; kinds without a
//! registered renderer fall back to [`ParagraphRenderer`]. The rendered
//! blocks are joined and wrapped in a standalone page by [`template`].

mod code;
mod escape;
mod image;
mod inline;
mod table;
pub mod template;

use std::collections::HashMap;

use tracing::{debug, instrument};

use docsnap_model::{Document, Node, NodeKind};
use docsnap_shared::{AssetMap, DEFAULT_ORIGIN};

pub use code::{CodeRenderer, language_for_syntax};
pub use escape::escape_html;
pub use image::render_image;
pub use inline::{ParagraphRenderer, paragraph_content, render_span, text_style};
pub use table::{TableRenderer, render_cell, render_row};

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Inputs shared by all renderers for one document.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Service origin used to absolutize relative media references.
    pub origin: &'a str,
    /// URL → local path map. `None` means asset resolution was skipped;
    /// `Some` means it ran, and a missing key means that asset failed.
    pub assets: Option<&'a AssetMap>,
}

impl Default for RenderContext<'_> {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN,
            assets: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Renders one top-level block of a given kind to an HTML fragment.
///
/// An empty string means "omit this block".
pub trait BlockRenderer: Send + Sync {
    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String;

    /// Human-readable renderer name for tracing.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps node kinds to block renderers, with a paragraph fallback.
pub struct RendererRegistry {
    renderers: HashMap<NodeKind, Box<dyn BlockRenderer>>,
    fallback: Box<dyn BlockRenderer>,
}

impl RendererRegistry {
    /// Registry with the built-in renderers.
    pub fn new() -> Self {
        let mut registry = Self {
            renderers: HashMap::new(),
            fallback: Box::new(ParagraphRenderer),
        };
        registry.register(NodeKind::Paragraph, Box::new(ParagraphRenderer));
        registry.register(NodeKind::Image, Box::new(ParagraphRenderer));
        registry.register(NodeKind::Table, Box::new(TableRenderer));
        registry.register(NodeKind::Code, Box::new(CodeRenderer));
        registry
    }

    /// Register (or replace) the renderer for `kind`.
    pub fn register(&mut self, kind: NodeKind, renderer: Box<dyn BlockRenderer>) {
        self.renderers.insert(kind, renderer);
    }

    /// The renderer responsible for `kind`.
    pub fn renderer_for(&self, kind: NodeKind) -> &dyn BlockRenderer {
        &**self.renderers.get(&kind).unwrap_or(&self.fallback)
    }

    /// Render the content blocks of `document` into an HTML fragment.
    ///
    /// Returns `None` when the main part cannot be located. Text leaves at
    /// block level are skipped, as are blocks that render to nothing.
    pub fn render_blocks(&self, document: &Document, ctx: &RenderContext<'_>) -> Option<String> {
        let blocks = document.blocks()?;

        let fragments: Vec<String> = blocks
            .iter()
            .filter_map(|child| child.as_node())
            .map(|node| {
                let renderer = self.renderer_for(node.kind());
                let html = renderer.render(node, ctx);
                if html.is_empty() {
                    debug!(kind = %node.kind(), tag = node.tag(), renderer = renderer.name(), "block omitted");
                }
                html
            })
            .filter(|html| !html.is_empty())
            .collect();

        Some(fragments.join("\n"))
    }

    /// Render `document` into a complete HTML page titled `title`.
    #[instrument(skip_all, fields(title = %title))]
    pub fn render_document(
        &self,
        document: &Document,
        title: &str,
        ctx: &RenderContext<'_>,
    ) -> Option<String> {
        let content = self.render_blocks(document, ctx)?;
        debug!(content_len = content.len(), "document rendered");
        Some(template::wrap_page(title, &content))
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Render `document` with the built-in renderers.
///
/// `None` when the document's main part cannot be located.
pub fn render(document: &Document, title: &str, ctx: &RenderContext<'_>) -> Option<String> {
    RendererRegistry::new().render_document(document, title, ctx)
}
