//! Image nodes and local-asset substitution.

use docsnap_model::Node;
use docsnap_shared::absolute_url;

use crate::escape::{escape_html, truncate_chars};
use crate::RenderContext;

/// Label used when an image node has no `name`.
const DEFAULT_IMAGE_NAME: &str = "image";

/// Characters of the remote URL shown in a failure placeholder.
const LINK_DISPLAY_CHARS: usize = 50;

/// Render an image node.
///
/// The `src` is looked up (in absolute form) in the context's asset map:
/// - hit: the local asset path is used;
/// - miss with a map present: resolution was attempted and failed, so a
///   visible placeholder with the remote link is emitted;
/// - no map at all: resolution was skipped, the absolute remote URL is used.
///
/// A node without `src` renders as a textual placeholder.
pub fn render_image(node: &Node, ctx: &RenderContext<'_>) -> String {
    let name = node
        .attr_str("name")
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_IMAGE_NAME);
    let name = escape_html(name);

    let Some(src) = node.attr_str("src").filter(|s| !s.is_empty()) else {
        return format!(r#"<p class="image-placeholder">[image: {name}]</p>"#);
    };

    let remote = absolute_url(src, ctx.origin);

    let src = match ctx.assets {
        Some(assets) => match assets.get(&remote) {
            Some(local) => local.clone(),
            None => return failure_placeholder(&name, &remote),
        },
        None => remote,
    };

    let style = match node.attr_display("width") {
        Some(width) => format!("max-width: {}px; height: auto;", escape_html(&width)),
        None => "height: auto;".to_string(),
    };

    format!(
        r#"<div class="image-container"><img src="{}" alt="{name}" style="{style}" loading="lazy" /></div>"#,
        escape_html(&src)
    )
}

fn failure_placeholder(name: &str, remote: &str) -> String {
    format!(
        concat!(
            r#"<div class="image-container"><p class="image-failed">[image download failed: {name}]<br>"#,
            r#"<small>original link: <a href="{href}" target="_blank">{shown}</a></small></p></div>"#
        ),
        name = name,
        href = escape_html(remote),
        shown = escape_html(&truncate_chars(remote, LINK_DISPLAY_CHARS)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsnap_shared::AssetMap;
    use serde_json::json;

    const ORIGIN: &str = "https://docs.example.com";

    fn image(value: serde_json::Value) -> Node {
        Node::from_value(&value)
    }

    fn ctx(assets: Option<&AssetMap>) -> RenderContext<'_> {
        RenderContext {
            origin: ORIGIN,
            assets,
        }
    }

    #[test]
    fn resolved_image_uses_local_path() {
        let mut assets = AssetMap::new();
        assets.insert(
            "https://docs.example.com/res/a.png".into(),
            "images/abc.png".into(),
        );
        let html = render_image(
            &image(json!(["img", {"src": "/res/a.png", "name": "diagram", "width": 640}])),
            &ctx(Some(&assets)),
        );
        assert_eq!(
            html,
            r#"<div class="image-container"><img src="images/abc.png" alt="diagram" style="max-width: 640px; height: auto;" loading="lazy" /></div>"#
        );
    }

    #[test]
    fn unresolved_with_map_is_failure_placeholder() {
        let assets = AssetMap::new();
        let long_src = format!("/res/{}.png", "x".repeat(80));
        let html = render_image(&image(json!(["img", {"src": long_src}])), &ctx(Some(&assets)));

        let remote = format!("https://docs.example.com{long_src}");
        assert!(html.contains("image download failed: image"));
        assert!(html.contains(&format!(r#"href="{remote}""#)));
        assert!(html.contains(&format!(">{}...</a>", &remote[..LINK_DISPLAY_CHARS])));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn without_map_uses_remote_url() {
        let html = render_image(&image(json!(["img", {"src": "/res/a.png"}])), &ctx(None));
        assert!(html.contains(r#"<img src="https://docs.example.com/res/a.png""#));
        assert!(html.contains(r#"style="height: auto;""#));
        assert!(!html.contains("download failed"));
    }

    #[test]
    fn missing_src_is_text_placeholder() {
        let html = render_image(&image(json!(["img", {"name": "chart"}])), &ctx(None));
        assert_eq!(html, r#"<p class="image-placeholder">[image: chart]</p>"#);

        let html = render_image(&image(json!(["img", {}])), &ctx(None));
        assert_eq!(html, r#"<p class="image-placeholder">[image: image]</p>"#);
    }

    #[test]
    fn remote_url_is_escaped() {
        let html = render_image(
            &image(json!(["img", {"src": "https://cdn.example.com/a.png?x=1&y=2"}])),
            &ctx(None),
        );
        assert!(html.contains(r#"src="https://cdn.example.com/a.png?x=1&amp;y=2""#));
    }
}
