//! Paragraphs and styled text spans.

use docsnap_model::{Child, Node, NodeKind};

use crate::escape::{escape_html, escape_with_breaks};
use crate::image::render_image;
use crate::{BlockRenderer, RenderContext};

/// Placeholder that keeps empty paragraphs and cells visible.
pub(crate) const NBSP: &str = "&nbsp;";

/// Inline CSS for a span's attributes; empty when none apply.
///
/// - `bold` → `font-weight: bold`
/// - `color` → `color: <value>`
/// - `sz` + `szUnit` (both required) → `font-size: <sz><unit>`
pub fn text_style(span: &Node) -> String {
    let mut styles: Vec<String> = Vec::new();

    if span.attr_truthy("bold") {
        styles.push("font-weight: bold".into());
    }
    if let Some(color) = span.attr_display("color") {
        styles.push(format!("color: {}", escape_html(&color)));
    }
    if let (Some(size), Some(unit)) = (span.attr_display("sz"), span.attr_display("szUnit")) {
        styles.push(format!(
            "font-size: {}{}",
            escape_html(&size),
            escape_html(&unit)
        ));
    }

    styles.join("; ")
}

/// Render a span and its nested spans. Non-span nodes render as nothing.
pub fn render_span(span: &Node) -> String {
    if span.kind() != NodeKind::Span {
        return String::new();
    }

    let style = text_style(span);
    let mut html = String::new();

    for child in span.children() {
        match child {
            Child::Text(text) => {
                let text = escape_with_breaks(text);
                if text.is_empty() {
                    continue;
                }
                if style.is_empty() {
                    html.push_str(&text);
                } else {
                    html.push_str(&format!(r#"<span style="{style}">{text}</span>"#));
                }
            }
            Child::Node(nested) => html.push_str(&render_span(nested)),
        }
    }

    html
}

/// Inner HTML of a paragraph: spans, inline images and raw text, in order.
pub fn paragraph_content(paragraph: &Node, ctx: &RenderContext<'_>) -> String {
    paragraph
        .children()
        .iter()
        .map(|child| match child {
            Child::Node(node) if node.kind() == NodeKind::Image => render_image(node, ctx),
            Child::Node(node) => render_span(node),
            Child::Text(text) => escape_html(text),
        })
        .collect()
}

/// `<p>` block renderer; also the fallback for kinds without a renderer.
///
/// Only paragraphs and images produce output here; other kinds reaching the
/// fallback render as nothing.
pub struct ParagraphRenderer;

impl BlockRenderer for ParagraphRenderer {
    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        match node.kind() {
            NodeKind::Paragraph => {
                let content = paragraph_content(node, ctx);
                if content.trim().is_empty() {
                    format!("<p>{NBSP}</p>")
                } else {
                    format!("<p>{content}</p>")
                }
            }
            NodeKind::Image => render_image(node, ctx),
            _ => String::new(),
        }
    }

    fn name(&self) -> &str {
        "paragraph"
    }
}
