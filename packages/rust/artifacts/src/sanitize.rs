//! Filesystem-safe directory names derived from document titles.

use docsnap_shared::DEFAULT_TITLE;

/// Characters replaced with `_`.
const ILLEGAL_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Source-format suffix dropped from titles.
const SOURCE_SUFFIX: &str = ".adoc";

/// Longest name produced, in characters.
pub const MAX_NAME_CHARS: usize = 200;

/// Turn a document title into a directory name.
///
/// Illegal characters become `_`, a trailing `.adoc` (any case) is dropped,
/// and surrounding spaces and dots are trimmed. Titles with nothing left
/// but replaced characters fall back to [`DEFAULT_TITLE`]. The result is
/// cut to [`MAX_NAME_CHARS`].
pub fn sanitize_filename(title: &str) -> String {
    let mut name = replace_illegal_chars(title);

    if name.to_ascii_lowercase().ends_with(SOURCE_SUFFIX) {
        name.truncate(name.len() - SOURCE_SUFFIX.len());
    }

    let trimmed = name.trim_matches(|c: char| c == ' ' || c == '.');

    let meaningful = title
        .chars()
        .any(|c| !ILLEGAL_CHARS.contains(&c) && c != ' ' && c != '.');
    if trimmed.is_empty() || !meaningful {
        return DEFAULT_TITLE.to_string();
    }

    trimmed.chars().take(MAX_NAME_CHARS).collect()
}

/// Replace path-illegal characters in `name` with `_`, leaving everything
/// else untouched. Used for identifier-derived file name prefixes.
pub fn replace_illegal_chars(name: &str) -> String {
    name.chars()
        .map(|c| if ILLEGAL_CHARS.contains(&c) { '_' } else { c })
        .collect()
}
