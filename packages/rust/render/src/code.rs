//! Code blocks with a language label.

use docsnap_model::Node;

use crate::escape::escape_html;
use crate::{BlockRenderer, RenderContext};

/// Syntax identifier assumed when a code node declares none.
const DEFAULT_SYNTAX: &str = "text/plain";

/// Known syntax identifiers and their display language.
const SYNTAX_LANGUAGES: &[(&str, &str)] = &[
    ("text/x-java", "java"),
    ("text/x-python", "python"),
    ("text/x-javascript", "javascript"),
    ("text/x-go", "go"),
    ("text/x-c++", "cpp"),
    ("text/x-sql", "sql"),
    ("text/x-sh", "bash"),
    ("text/plain", "text"),
    ("application/json", "json"),
    ("text/html", "html"),
    ("text/css", "css"),
];

/// Generic prefixes stripped from unmapped identifiers, most specific first.
const GENERIC_PREFIXES: &[&str] = &["text/x-", "text/", "application/x-", "application/"];

/// Display language for a syntax identifier.
pub fn language_for_syntax(syntax: &str) -> String {
    if let Some((_, language)) = SYNTAX_LANGUAGES.iter().find(|(id, _)| *id == syntax) {
        return (*language).to_string();
    }

    GENERIC_PREFIXES
        .iter()
        .find_map(|prefix| syntax.strip_prefix(prefix))
        .unwrap_or(syntax)
        .to_string()
}

/// Class-safe form of a language label. Whitespace runs become `-`;
/// characters outside `[a-z0-9+#_-]` are dropped.
fn language_class(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '#' | '_' | '-'))
        .collect()
}

/// Code block renderer. Blocks with empty code are omitted.
pub struct CodeRenderer;

impl BlockRenderer for CodeRenderer {
    fn render(&self, node: &Node, _ctx: &RenderContext<'_>) -> String {
        let code = node.attr_str("code").unwrap_or_default();
        if code.is_empty() {
            return String::new();
        }

        let syntax = node
            .attr_str("syntax")
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SYNTAX);
        let label = language_for_syntax(syntax);
        let class = language_class(&label);
        let language = escape_html(&label);

        format!(
            r#"<div class="code-block">
    <div class="code-header">
        <span class="code-language">{language}</span>
        <button class="code-copy" onclick="copyCode(this)" title="Copy code">Copy</button>
    </div>
    <pre><code class="language-{class}">{code}</code></pre>
</div>"#,
            code = escape_html(code),
        )
    }

    fn name(&self) -> &str {
        "code"
    }
}
