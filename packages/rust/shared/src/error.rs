//! Error types for docsnap.
//!
//! Library crates use [`DocsnapError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Content that cannot be decoded (server-side encrypted bodies) is not an
//! error: it surfaces as an absent decoded document in the parse result.

use std::path::PathBuf;

/// Top-level error type for all docsnap operations.
#[derive(Debug, thiserror::Error)]
pub enum DocsnapError {
    /// Missing or invalid configuration, including a missing session token.
    #[error("config error: {message}")]
    Config { message: String },

    /// Non-2xx status or transport failure while talking to the document service.
    #[error("retrieval error: {message}")]
    Retrieval {
        status: Option<u16>,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Embedded payload missing or malformed, or a required field absent.
    #[error("extraction error: {message}")]
    Extraction { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON serialization of a persisted artifact failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocsnapError>;

impl DocsnapError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an extraction error from any displayable message.
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction {
            message: msg.into(),
        }
    }

    /// Create a retrieval error for a transport-level failure (no HTTP status).
    pub fn retrieval(msg: impl Into<String>) -> Self {
        Self::Retrieval {
            status: None,
            message: msg.into(),
            source: None,
        }
    }

    /// Create a retrieval error for a failed request, keeping `source` as the
    /// cause. The message ends with the full cause chain.
    pub fn transport(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        let mut message = context.into();
        let mut cause: Option<&dyn std::error::Error> = Some(&source as &dyn std::error::Error);
        while let Some(err) = cause {
            message.push_str(": ");
            message.push_str(&err.to_string());
            cause = err.source();
        }
        Self::Retrieval {
            status: None,
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create a retrieval error for a non-2xx HTTP response.
    pub fn http_status(status: u16, msg: impl Into<String>) -> Self {
        Self::Retrieval {
            status: Some(status),
            message: msg.into(),
            source: None,
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable machine-readable code for this error class.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config_error",
            Self::Retrieval { .. } => "retrieval_error",
            Self::Extraction { .. } => "extraction_error",
            Self::Io { .. } => "io_error",
            Self::Serialization(_) => "serialization_error",
        }
    }
}

impl From<serde_json::Error> for DocsnapError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DocsnapError::config("missing session token");
        assert_eq!(err.to_string(), "config error: missing session token");

        let err = DocsnapError::http_status(403, "https://example.com/i/nodes/abc: HTTP 403");
        assert!(err.to_string().contains("HTTP 403"));
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(DocsnapError::config("x").code(), "config_error");
        assert_eq!(DocsnapError::extraction("x").code(), "extraction_error");
        assert_eq!(DocsnapError::retrieval("x").code(), "retrieval_error");
        assert_eq!(DocsnapError::http_status(500, "x").code(), "retrieval_error");
        let io = DocsnapError::io("/tmp/x", std::io::Error::other("boom"));
        assert_eq!(io.code(), "io_error");
    }

    #[test]
    fn transport_error_keeps_cause_chain() {
        #[derive(Debug, thiserror::Error)]
        #[error("error sending request")]
        struct Outer(#[source] std::io::Error);

        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let err = DocsnapError::transport("http://127.0.0.1:1/x", Outer(refused));

        assert_eq!(
            err.to_string(),
            "retrieval error: http://127.0.0.1:1/x: error sending request: connection refused"
        );
        let source = std::error::Error::source(&err).expect("cause attached");
        assert_eq!(source.to_string(), "error sending request");
        assert!(matches!(err, DocsnapError::Retrieval { status: None, .. }));
    }

    #[test]
    fn http_status_is_preserved() {
        match DocsnapError::http_status(404, "not found") {
            DocsnapError::Retrieval { status, .. } => assert_eq!(status, Some(404)),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
