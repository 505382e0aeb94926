//! Static page template wrapped around the rendered blocks.

use crate::escape::escape_html;

const STYLE: &str = r#"    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'PingFang SC', sans-serif;
            line-height: 1.6;
            color: #333;
            background: #f0f2f5;
            min-height: 100vh;
            padding: 2rem;
        }
        .container { max-width: 900px; margin: 0 auto; background: white; border-radius: 12px;
                     box-shadow: 0 12px 40px rgba(0, 0, 0, 0.15); overflow: hidden; }
        .header { background: #3b5bdb; color: white; padding: 2rem; text-align: center; }
        .header h1 { font-size: 2rem; font-weight: 600; }
        .content { padding: 2rem 3rem; }
        .content p { margin-bottom: 1rem; font-size: 1rem; line-height: 1.8; }
        .table-container { margin: 1.5rem 0; overflow-x: auto; }
        .doc-table { width: 100%; border-collapse: collapse; margin: 1rem 0; }
        .doc-table td { border: 1px solid #ddd; padding: 0.75rem; font-size: 0.95rem; vertical-align: top; }
        .image-container { margin: 1.5rem 0; text-align: center; }
        .image-container img { max-width: 100%; height: auto; border-radius: 8px; }
        .image-placeholder { color: #999; }
        .image-failed { color: #999; padding: 1rem; border: 1px dashed #ddd; border-radius: 4px; }
        .code-block { margin: 1.5rem 0; border-radius: 8px; overflow: hidden; background: #282c34; }
        .code-header { background: #21252b; padding: 0.5rem 1rem; display: flex;
                       justify-content: space-between; align-items: center; }
        .code-language { color: #61dafb; font-size: 0.85rem; font-weight: 600; text-transform: uppercase; }
        .code-copy { background: #61dafb; color: #282c34; border: none; padding: 0.25rem 0.75rem;
                     border-radius: 4px; cursor: pointer; font-size: 0.85rem; }
        .code-block pre { margin: 0; padding: 1rem; overflow-x: auto; }
        .code-block code { font-family: 'Monaco', 'Menlo', 'Consolas', monospace; font-size: 0.9rem;
                           color: #abb2bf; display: block; white-space: pre; }
        .footer { text-align: center; padding: 1.5rem; background: #f8f9fa; color: #666;
                  font-size: 0.85rem; border-top: 1px solid #e9ecef; }
    </style>
"#;

const SCRIPT: &str = r#"    <script>
        function copyCode(button) {
            const code = button.closest('.code-block').querySelector('code').textContent;
            navigator.clipboard.writeText(code).then(() => {
                const label = button.textContent;
                button.textContent = 'Copied';
                setTimeout(() => { button.textContent = label; }, 2000);
            });
        }
    </script>
"#;

/// Language declared on the `<html>` element.
const PAGE_LANG: &str = "zh-CN";

/// Wrap rendered blocks in the standalone HTML page.
pub fn wrap_page(title: &str, content: &str) -> String {
    let title = escape_html(title);

    let mut html = String::with_capacity(STYLE.len() + SCRIPT.len() + content.len() + 1024);
    html.push_str(&format!("<!DOCTYPE html>\n<html lang=\"{PAGE_LANG}\">\n<head>\n"));
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str(&format!("    <title>{title}</title>\n"));
    html.push_str(STYLE);
    html.push_str(SCRIPT);
    html.push_str("</head>\n<body>\n    <div class=\"container\">\n");
    html.push_str(&format!(
        "        <div class=\"header\">\n            <h1>{title}</h1>\n        </div>\n"
    ));
    html.push_str("        <div class=\"content\">\n");
    html.push_str(content);
    html.push_str("\n        </div>\n");
    html.push_str(concat!(
        "        <div class=\"footer\">Generated by docsnap ",
        env!("CARGO_PKG_VERSION"),
        "</div>\n"
    ));
    html.push_str("    </div>\n</body>\n</html>\n");
    html
}
