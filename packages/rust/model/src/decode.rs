//! Extraction of the embedded page payload and decoding of the content envelope.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};

use docsnap_shared::{DEFAULT_TITLE, DocsnapError, Result};

use crate::node::Document;

/// Id of the `<script>` element holding the page-embedded JSON payload.
const EMBEDDED_SCRIPT_SELECTOR: &str = "script#mainsite_server_content";

/// Primary location of the entry key inside the embedded payload.
const ENTRY_KEY_PATH: &str = "/dentryInfo/data/dentryKey";

/// Fallback location: the node id carried in the page data.
const NODE_ID_PATH: &str = "/data/nodeId";

const TITLE_PATH: &str = "/dentryInfo/data/name";

/// Location of the serialized content envelope inside the document-data response.
const CONTENT_ENVELOPE_PATH: &str = "/data/documentContent/checkpoint/content";

// ---------------------------------------------------------------------------
// Document id
// ---------------------------------------------------------------------------

/// Resolve a document id from a full document URL or a bare id.
///
/// URLs (anything starting with `http`) must contain `/i/nodes/<id>`; the id
/// ends at the next `/` or `?`. Any other input is taken as the id itself.
pub fn resolve_document_id(url_or_id: &str) -> Result<String> {
    static NODE_PATH_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"/i/nodes/([^?/#]+)").expect("valid regex"));

    let input = url_or_id.trim();
    if !input.starts_with("http") {
        if input.is_empty() {
            return Err(DocsnapError::extraction("document id is empty"));
        }
        return Ok(input.to_string());
    }

    NODE_PATH_RE
        .captures(input)
        .map(|c| c[1].to_string())
        .ok_or_else(|| {
            DocsnapError::extraction(format!("cannot extract document id from URL: {input}"))
        })
}

// ---------------------------------------------------------------------------
// Embedded payload
// ---------------------------------------------------------------------------

/// Locate the embedded script payload in the page markup and parse it as JSON.
pub fn extract_embedded_json(page_html: &str) -> Result<Value> {
    let doc = Html::parse_document(page_html);
    let selector = Selector::parse(EMBEDDED_SCRIPT_SELECTOR)
        .map_err(|e| DocsnapError::extraction(format!("invalid selector: {e}")))?;

    let script = doc
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            DocsnapError::extraction(
                "embedded payload not found in page (the session token may be expired or lack access)",
            )
        })?;

    debug!(len = script.len(), "found embedded payload");

    serde_json::from_str(script.trim())
        .map_err(|e| DocsnapError::extraction(format!("embedded payload is not valid JSON: {e}")))
}

/// Entry key that authorizes the document-data request.
///
/// Read from `dentryInfo.data.dentryKey`, falling back to `data.nodeId`.
pub fn extract_document_identifier(embedded: &Value) -> Result<String> {
    [ENTRY_KEY_PATH, NODE_ID_PATH]
        .iter()
        .find_map(|path| embedded.pointer(path).and_then(scalar_string))
        .ok_or_else(|| {
            DocsnapError::extraction("entry key not found (neither dentryKey nor nodeId present)")
        })
}

/// Document title, or [`DEFAULT_TITLE`] when the payload has none.
pub fn extract_title(embedded: &Value) -> String {
    embedded
        .pointer(TITLE_PATH)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Content envelope
// ---------------------------------------------------------------------------

/// Parse the serialized content envelope out of a document-data response.
///
/// Returns `None` when the envelope is missing or is not a JSON string
/// holding JSON. That is the shape of server-side encrypted bodies, which
/// are reported to the caller rather than treated as failures.
pub fn extract_content_envelope(document_data: &Value) -> Option<Value> {
    let Some(raw) = document_data
        .pointer(CONTENT_ENVELOPE_PATH)
        .and_then(Value::as_str)
    else {
        debug!("content envelope missing from document data");
        return None;
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, len = raw.len(), "content envelope is not JSON (possibly encrypted)");
            None
        }
    }
}

/// Decode the document body of a document-data response.
///
/// `None` means unsupported content (see [`extract_content_envelope`]).
pub fn decode_document_content(document_data: &Value) -> Option<Document> {
    extract_content_envelope(document_data).map(|envelope| Document::from_value(&envelope))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page_with_payload(payload: &str) -> String {
        format!(
            r#"<html><head><title>x</title></head><body>
            <div id="root"></div>
            <script id="mainsite_server_content" type="application/json">{payload}</script>
            </body></html>"#
        )
    }

    #[test]
    fn resolve_document_id_from_url() {
        let id = resolve_document_id("https://alidocs.dingtalk.com/i/nodes/AbC123xyz?utm_scene=team")
            .unwrap();
        assert_eq!(id, "AbC123xyz");

        let id = resolve_document_id("https://alidocs.dingtalk.com/i/nodes/AbC123xyz/").unwrap();
        assert_eq!(id, "AbC123xyz");
    }

    #[test]
    fn resolve_document_id_passthrough() {
        assert_eq!(resolve_document_id(" AbC123xyz ").unwrap(), "AbC123xyz");
    }

    #[test]
    fn resolve_document_id_rejects_foreign_url() {
        let err = resolve_document_id("https://example.com/docs/page").unwrap_err();
        assert_eq!(err.code(), "extraction_error");
        assert!(resolve_document_id("  ").is_err());
    }

    #[test]
    fn extracts_embedded_json() {
        let html = page_with_payload(r#"{"dentryInfo":{"data":{"dentryKey":"k1","name":"Plan"}}}"#);
        let value = extract_embedded_json(&html).unwrap();
        assert_eq!(value.pointer("/dentryInfo/data/dentryKey"), Some(&json!("k1")));
    }

    #[test]
    fn embedded_json_with_markup_characters() {
        let html = page_with_payload(r#"{"data":{"nodeId":"n1","note":"a < b && c > d"}}"#);
        let value = extract_embedded_json(&html).unwrap();
        assert_eq!(value.pointer("/data/note"), Some(&json!("a < b && c > d")));
    }

    #[test]
    fn missing_embedded_payload_is_extraction_error() {
        let err = extract_embedded_json("<html><body>login required</body></html>").unwrap_err();
        assert_eq!(err.code(), "extraction_error");
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn malformed_embedded_payload_is_extraction_error() {
        let err = extract_embedded_json(&page_with_payload("{not json")).unwrap_err();
        assert_eq!(err.code(), "extraction_error");
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn identifier_prefers_entry_key() {
        let embedded = json!({
            "dentryInfo": { "data": { "dentryKey": "entry-1" } },
            "data": { "nodeId": "node-1" }
        });
        assert_eq!(extract_document_identifier(&embedded).unwrap(), "entry-1");
    }

    #[test]
    fn identifier_falls_back_to_node_id() {
        let embedded = json!({ "dentryInfo": { "data": {} }, "data": { "nodeId": "node-1" } });
        assert_eq!(extract_document_identifier(&embedded).unwrap(), "node-1");
    }

    #[test]
    fn identifier_missing_is_error() {
        let err = extract_document_identifier(&json!({ "data": {} })).unwrap_err();
        assert_eq!(err.code(), "extraction_error");
    }

    #[test]
    fn title_with_default() {
        let embedded = json!({ "dentryInfo": { "data": { "name": "Q3 Roadmap.adoc" } } });
        assert_eq!(extract_title(&embedded), "Q3 Roadmap.adoc");
        assert_eq!(extract_title(&json!({})), DEFAULT_TITLE);
        assert_eq!(extract_title(&json!({ "dentryInfo": { "data": { "name": "" } } })), DEFAULT_TITLE);
    }

    #[test]
    fn decodes_content_envelope() {
        let envelope = json!({
            "main": "m",
            "parts": { "m": { "data": { "body": ["root", {}, ["p", {}, "hello"]] } } }
        });
        let document_data = json!({
            "data": { "documentContent": { "checkpoint": { "content": envelope.to_string() } } }
        });
        let doc = decode_document_content(&document_data).expect("decoded");
        assert_eq!(doc.main_key(), Some("m"));
        assert_eq!(doc.blocks().map(<[_]>::len), Some(1));
    }

    #[test]
    fn missing_content_path_is_none() {
        let document_data = json!({ "data": { "documentContent": {} } });
        assert!(decode_document_content(&document_data).is_none());
    }

    #[test]
    fn encrypted_content_is_none() {
        let document_data = json!({
            "data": { "documentContent": { "checkpoint": { "content": "U2FsdGVkX1+abc/def==" } } }
        });
        assert!(decode_document_content(&document_data).is_none());
    }
}
