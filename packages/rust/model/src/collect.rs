//! Collection of media references from a decoded document.

use std::collections::BTreeSet;

use docsnap_shared::absolute_url;

use crate::node::{Child, Document, NodeKind};

/// Distinct absolute image URLs referenced by the main part's body.
///
/// Image nodes are leaves for this walk; every other node (including
/// untagged groups) is descended into. Relative `src` values are prefixed
/// with `origin`.
pub fn collect_image_urls(document: &Document, origin: &str) -> BTreeSet<String> {
    let mut urls = BTreeSet::new();

    if let Some(part) = document.main_part() {
        for child in &part.body {
            visit(child, origin, &mut urls);
        }
    }

    urls
}

fn visit(child: &Child, origin: &str, urls: &mut BTreeSet<String>) {
    let Child::Node(node) = child else {
        return;
    };

    if node.kind() == NodeKind::Image {
        if let Some(src) = node.attr_str("src").filter(|s| !s.is_empty()) {
            urls.insert(absolute_url(src, origin));
        }
        return;
    }

    for child in node.children() {
        visit(child, origin, urls);
    }
}
