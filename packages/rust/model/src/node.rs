//! Tagged-tree document model.
//!
//! The service serializes documents as nested JSON arrays of the shape
//! `[tag, {attrs}, child, child, ...]`, where each child is either a text
//! string or another array. Decoding here is total: shapes that do not fit
//! become [`NodeKind::Unknown`] nodes instead of errors, so a damaged
//! subtree degrades the rendered output rather than aborting it.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

/// Number of leading entries of a part body that form the body envelope
/// (root tag + root attributes) rather than content blocks.
///
/// Every payload observed so far carries exactly this envelope. If a body
/// is ever seen whose third entry is not a block node, revisit this.
pub const BODY_ENVELOPE_LEN: usize = 2;

// ---------------------------------------------------------------------------
// NodeKind
// ---------------------------------------------------------------------------

/// Discriminator of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Paragraph,
    Span,
    Table,
    Row,
    Cell,
    Code,
    Image,
    Unknown,
}

impl NodeKind {
    /// Map a wire tag to its kind.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "p" => Self::Paragraph,
            "span" => Self::Span,
            "table" => Self::Table,
            "tr" => Self::Row,
            "tc" => Self::Cell,
            "code" => Self::Code,
            "img" => Self::Image,
            _ => Self::Unknown,
        }
    }

    /// Human-readable name for tracing.
    pub fn name(self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Span => "span",
            Self::Table => "table",
            Self::Row => "row",
            Self::Cell => "cell",
            Self::Code => "code",
            Self::Image => "image",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// A scalar attribute value. Nested objects and arrays in attribute
/// position are not kept.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl AttrValue {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::Bool(b) => Some(Self::Bool(*b)),
            _ => None,
        }
    }

    /// The string value, if this is a text attribute.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Non-negative integer value. Numeric strings are accepted.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }

    /// Loose truthiness: `false`, `0` and `""` are false, everything else true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Text(s) => !s.is_empty(),
            Self::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Self::Bool(b) => *b,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Attribute mapping of a node.
pub type Attrs = BTreeMap<String, AttrValue>;

fn attrs_from_map(map: &Map<String, Value>) -> Attrs {
    map.iter()
        .filter_map(|(k, v)| AttrValue::from_value(v).map(|v| (k.clone(), v)))
        .collect()
}

// ---------------------------------------------------------------------------
// Node / Child
// ---------------------------------------------------------------------------

/// One child of a node: a nested node or a raw text leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Node(Node),
    Text(String),
}

impl Child {
    /// Decode any JSON value into a child. Never fails.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s.clone()),
            other => Self::Node(Node::from_value(other)),
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Node(_) => None,
        }
    }
}

/// A decoded document element.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    tag: String,
    attrs: Attrs,
    children: Vec<Child>,
}

impl Node {
    /// Decode a JSON value into a node.
    ///
    /// - `[tag, {attrs}, children...]` with a string tag: a tagged node
    ///   (unrecognized tags keep their children as [`NodeKind::Unknown`]).
    /// - Any other non-empty array, or an object: an untagged `Unknown`
    ///   group whose children are its nested values, so traversals still
    ///   see what is inside.
    /// - Scalars and empty arrays: `Unknown` with no children.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => match items.first() {
                Some(Value::String(tag)) => {
                    let attrs = match items.get(1) {
                        Some(Value::Object(map)) => attrs_from_map(map),
                        _ => Attrs::new(),
                    };
                    let children = items.iter().skip(2).map(Child::from_value).collect();
                    Self {
                        kind: NodeKind::from_tag(tag),
                        tag: tag.clone(),
                        attrs,
                        children,
                    }
                }
                Some(_) => Self::group(Attrs::new(), items.iter()),
                None => Self::unknown(),
            },
            Value::Object(map) => Self::group(
                attrs_from_map(map),
                map.values().filter(|v| v.is_array() || v.is_object()),
            ),
            _ => Self::unknown(),
        }
    }

    /// An empty `Unknown` node.
    pub fn unknown() -> Self {
        Self {
            kind: NodeKind::Unknown,
            tag: String::new(),
            attrs: Attrs::new(),
            children: Vec::new(),
        }
    }

    fn group<'a>(attrs: Attrs, values: impl Iterator<Item = &'a Value>) -> Self {
        Self {
            kind: NodeKind::Unknown,
            tag: String::new(),
            attrs,
            children: values.map(Child::from_value).collect(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The wire tag this node was decoded from (empty for untagged groups).
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// Attribute as a string; only text attributes qualify.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attr(key).and_then(AttrValue::as_str)
    }

    /// Attribute rendered as a string, whatever its scalar type.
    /// Falsy values (`""`, `0`, `false`) count as absent.
    pub fn attr_display(&self, key: &str) -> Option<String> {
        self.attr(key)
            .filter(|v| v.is_truthy())
            .map(|v| v.to_string())
    }

    pub fn attr_u64(&self, key: &str) -> Option<u64> {
        self.attr(key).and_then(AttrValue::as_u64)
    }

    pub fn attr_truthy(&self, key: &str) -> bool {
        self.attr(key).is_some_and(AttrValue::is_truthy)
    }

    /// Iterate over child nodes, skipping text leaves.
    pub fn child_nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(Child::as_node)
    }

    /// Iterate over child nodes of the given kind.
    pub fn children_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.child_nodes().filter(move |n| n.kind == kind)
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// One part of a document. Only the body is modelled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Part {
    pub body: Vec<Child>,
}

/// A decoded document: a `main` key plus its parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    main: Option<String>,
    parts: BTreeMap<String, Part>,
}

impl Document {
    /// Decode a content envelope of the shape
    /// `{"main": key, "parts": {key: {"data": {"body": [...]}}}}`.
    ///
    /// Missing pieces decode to empty values; use [`Document::main_part`]
    /// to find out whether the result is renderable.
    pub fn from_value(value: &Value) -> Self {
        let main = value
            .get("main")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let parts = value
            .get("parts")
            .and_then(Value::as_object)
            .map(|parts| {
                parts
                    .iter()
                    .map(|(key, part)| (key.clone(), Part::from_value(part)))
                    .collect()
            })
            .unwrap_or_default();

        Self { main, parts }
    }

    pub fn main_key(&self) -> Option<&str> {
        self.main.as_deref()
    }

    pub fn parts(&self) -> &BTreeMap<String, Part> {
        &self.parts
    }

    /// The part referenced by `main`, if both exist.
    pub fn main_part(&self) -> Option<&Part> {
        self.main.as_ref().and_then(|key| self.parts.get(key))
    }

    /// Content blocks of the main part: its body without the envelope.
    pub fn blocks(&self) -> Option<&[Child]> {
        self.main_part()
            .map(|part| part.body.get(BODY_ENVELOPE_LEN..).unwrap_or(&[]))
    }
}

impl Part {
    fn from_value(value: &Value) -> Self {
        let body = value
            .pointer("/data/body")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(Child::from_value).collect())
            .unwrap_or_default();
        Self { body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_tagged_node() {
        let node = Node::from_value(&json!(["span", {"bold": true, "sz": 12}, "hi", ["span", {}, "x"]]));
        assert_eq!(node.kind(), NodeKind::Span);
        assert_eq!(node.tag(), "span");
        assert!(node.attr_truthy("bold"));
        assert_eq!(node.attr_display("sz").as_deref(), Some("12"));
        assert_eq!(node.children().len(), 2);
        assert_eq!(node.children()[0].as_text(), Some("hi"));
        assert_eq!(node.children()[1].as_node().map(Node::kind), Some(NodeKind::Span));
    }

    #[test]
    fn unknown_tag_keeps_children() {
        let node = Node::from_value(&json!(["quote", {}, ["img", {"src": "/a.png"}]]));
        assert_eq!(node.kind(), NodeKind::Unknown);
        assert_eq!(node.tag(), "quote");
        assert_eq!(node.child_nodes().count(), 1);
    }

    #[test]
    fn malformed_shapes_degrade_to_unknown() {
        for value in [json!(42), json!(null), json!(true), json!([])] {
            let node = Node::from_value(&value);
            assert_eq!(node.kind(), NodeKind::Unknown);
            assert!(node.children().is_empty());
        }
    }

    #[test]
    fn non_object_attrs_are_ignored() {
        let node = Node::from_value(&json!(["p", "not-attrs", "text"]));
        assert_eq!(node.kind(), NodeKind::Paragraph);
        assert!(node.attrs().is_empty());
        // Children always start after the attribute slot.
        assert_eq!(node.children().len(), 1);
        assert_eq!(node.children()[0].as_text(), Some("text"));
    }

    #[test]
    fn nested_attr_values_are_dropped() {
        let node = Node::from_value(&json!(["tc", {"rowSpan": 2, "extra": {"a": 1}, "n": null}]));
        assert_eq!(node.attr_u64("rowSpan"), Some(2));
        assert!(node.attr("extra").is_none());
        assert!(node.attr("n").is_none());
    }

    #[test]
    fn mapping_becomes_group() {
        let node = Node::from_value(&json!({"label": "x", "inner": ["img", {"src": "/a.png"}]}));
        assert_eq!(node.kind(), NodeKind::Unknown);
        assert_eq!(node.attr_str("label"), Some("x"));
        assert_eq!(node.children_of_kind(NodeKind::Image).count(), 1);
    }

    #[test]
    fn attr_value_coercions() {
        assert_eq!(AttrValue::Text("3".into()).as_u64(), Some(3));
        assert!(!AttrValue::Number(serde_json::Number::from(0)).is_truthy());
        assert!(!AttrValue::Text(String::new()).is_truthy());
        assert_eq!(AttrValue::Bool(true).as_u64(), None);
    }

    #[test]
    fn document_blocks_skip_envelope() {
        let doc = Document::from_value(&json!({
            "main": "m",
            "parts": {
                "m": { "data": { "body": ["root", {}, ["p", {}, "hello"]] } },
                "other": { "data": {} }
            }
        }));
        assert_eq!(doc.main_key(), Some("m"));
        assert_eq!(doc.parts().len(), 2);
        let blocks = doc.blocks().expect("main part");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].as_node().map(Node::kind), Some(NodeKind::Paragraph));
    }

    #[test]
    fn short_body_has_no_blocks() {
        let doc = Document::from_value(&json!({
            "main": "m",
            "parts": { "m": { "data": { "body": ["root"] } } }
        }));
        assert_eq!(doc.blocks().map(<[Child]>::len), Some(0));
    }

    #[test]
    fn missing_main_part() {
        let doc = Document::from_value(&json!({ "main": "m", "parts": {} }));
        assert!(doc.main_part().is_none());
        assert!(doc.blocks().is_none());

        let doc = Document::from_value(&json!({ "parts": { "m": {} } }));
        assert!(doc.main_key().is_none());
        assert!(doc.blocks().is_none());
    }
}
