//! Tables with merged cells.

use docsnap_model::{Node, NodeKind};

use crate::escape::escape_html;
use crate::inline::{NBSP, paragraph_content};
use crate::{BlockRenderer, RenderContext};

/// Render a `<td>`, including span counts and fill/alignment styling.
pub fn render_cell(cell: &Node, ctx: &RenderContext<'_>) -> String {
    let mut attrs = String::new();

    for (key, html_attr) in [("rowSpan", "rowspan"), ("colSpan", "colspan")] {
        if let Some(span) = cell.attr_u64(key).filter(|n| *n > 1) {
            attrs.push_str(&format!(r#" {html_attr}="{span}""#));
        }
    }

    let mut styles: Vec<String> = Vec::new();
    if let Some(fill) = cell.attr_display("fill") {
        styles.push(format!("background-color: {}", escape_html(&fill)));
    }
    if let Some(align) = cell.attr_display("vAlign") {
        styles.push(format!("vertical-align: {}", escape_html(&align)));
    }
    if !styles.is_empty() {
        attrs.push_str(&format!(r#" style="{}""#, styles.join("; ")));
    }

    let content = cell
        .children_of_kind(NodeKind::Paragraph)
        .map(|p| paragraph_content(p, ctx))
        .collect::<Vec<_>>()
        .join("<br>");

    let content = if content.trim().is_empty() {
        NBSP.to_string()
    } else {
        content
    };

    format!("<td{attrs}>{content}</td>")
}

/// Render a `<tr>`; empty when the row has no cells.
pub fn render_row(row: &Node, ctx: &RenderContext<'_>) -> String {
    let cells: String = row
        .children_of_kind(NodeKind::Cell)
        .map(|cell| render_cell(cell, ctx))
        .collect();

    if cells.is_empty() {
        String::new()
    } else {
        format!("<tr>{cells}</tr>")
    }
}

/// Table block renderer; omits tables without any non-empty row.
pub struct TableRenderer;

impl BlockRenderer for TableRenderer {
    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        let rows: String = node
            .children_of_kind(NodeKind::Row)
            .map(|row| render_row(row, ctx))
            .collect();

        if rows.is_empty() {
            return String::new();
        }

        format!(
            "<div class=\"table-container\">\n    <table class=\"doc-table\">\n        {rows}\n    </table>\n</div>"
        )
    }

    fn name(&self) -> &str {
        "table"
    }
}
