//! Document model, payload decoding, and media collection.
//!
//! This crate provides:
//! - [`node`]: the tagged-tree model ([`Document`], [`Node`], [`NodeKind`])
//! - [`decode`]: extraction of the page-embedded payload and the content envelope
//! - [`collect`]: the set of media URLs a document references

pub mod collect;
pub mod decode;
pub mod node;

pub use collect::collect_image_urls;
pub use decode::{
    decode_document_content, extract_content_envelope, extract_document_identifier,
    extract_embedded_json, extract_title, resolve_document_id,
};
pub use node::{AttrValue, Attrs, BODY_ENVELOPE_LEN, Child, Document, Node, NodeKind, Part};
