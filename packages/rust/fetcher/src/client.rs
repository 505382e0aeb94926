//! Authenticated access to the remote document service.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, ORIGIN, REFERER};
use reqwest::{Client, Response};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use docsnap_shared::{DocsnapError, Result, ServiceConfig};

/// Maximum redirects followed for any request.
const MAX_REDIRECTS: usize = 10;

/// Header carrying the entry key on document-data requests.
const ENTRY_KEY_HEADER: &str = "a-dentry-key";

const PAGE_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const IMAGE_ACCEPT: &str = "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8";

// ---------------------------------------------------------------------------
// Retrieval interface
// ---------------------------------------------------------------------------

/// A downloaded binary resource.
#[derive(Debug, Clone)]
pub struct FetchedAsset {
    pub bytes: Vec<u8>,
    /// Value of the `content-type` response header, if sent.
    pub content_type: Option<String>,
    /// URL the response was served from, after redirects.
    pub final_url: String,
}

/// The calls the pipeline makes against the document service.
///
/// Every call takes the opaque session token. Non-2xx responses and
/// transport failures surface as [`DocsnapError::Retrieval`].
pub trait DocumentSource: Send + Sync {
    /// Origin that relative media references are resolved against.
    fn origin(&self) -> &str;

    /// Fetch the document page markup for `document_id`.
    fn fetch_page(
        &self,
        document_id: &str,
        token: &str,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Fetch the document-data response authorised by `entry_key`.
    fn fetch_document_data(
        &self,
        token: &str,
        entry_key: &str,
    ) -> impl Future<Output = Result<Value>> + Send;

    /// Fetch a binary resource, following redirects.
    fn fetch_binary(
        &self,
        url: &str,
        token: &str,
    ) -> impl Future<Output = Result<FetchedAsset>> + Send;
}

// ---------------------------------------------------------------------------
// DocsClient
// ---------------------------------------------------------------------------

/// [`DocumentSource`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct DocsClient {
    client: Client,
    origin: String,
}

impl DocsClient {
    /// Build a client from the `[service]` configuration.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DocsnapError::transport("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            origin: config.origin.trim_end_matches('/').to_string(),
        })
    }
}

impl DocumentSource for DocsClient {
    fn origin(&self) -> &str {
        &self.origin
    }

    #[instrument(skip_all, fields(document_id = %document_id))]
    async fn fetch_page(&self, document_id: &str, token: &str) -> Result<String> {
        let url = format!(
            "{}/i/nodes/{document_id}?rnd={}",
            self.origin,
            Utc::now().timestamp_millis()
        );
        debug!(%url, "fetching document page");

        let response = self
            .client
            .get(&url)
            .header(COOKIE, token)
            .header(ACCEPT, PAGE_ACCEPT)
            .header(REFERER, self.origin.as_str())
            .send()
            .await
            .map_err(|e| DocsnapError::transport(url.as_str(), e))?;

        let response = ensure_success(&url, response)?;
        response
            .text()
            .await
            .map_err(|e| DocsnapError::transport(format!("{url}: body read failed"), e))
    }

    #[instrument(skip_all)]
    async fn fetch_document_data(&self, token: &str, entry_key: &str) -> Result<Value> {
        let url = format!("{}/api/document/data", self.origin);
        debug!(%url, "fetching document data");

        let response = self
            .client
            .post(&url)
            .header(COOKIE, token)
            .header(ENTRY_KEY_HEADER, entry_key)
            .header(ORIGIN, self.origin.as_str())
            .header(REFERER, format!("{}/", self.origin))
            .header(CONTENT_TYPE, "application/json")
            .json(&json!({ "fetchBody": true }))
            .send()
            .await
            .map_err(|e| DocsnapError::transport(url.as_str(), e))?;

        let response = ensure_success(&url, response)?;
        response
            .json::<Value>()
            .await
            .map_err(|e| DocsnapError::transport(format!("{url}: invalid JSON body"), e))
    }

    async fn fetch_binary(&self, url: &str, token: &str) -> Result<FetchedAsset> {
        let response = self
            .client
            .get(url)
            .header(COOKIE, token)
            .header(ACCEPT, IMAGE_ACCEPT)
            .header(REFERER, format!("{}/", self.origin))
            .send()
            .await
            .map_err(|e| DocsnapError::transport(url, e))?;

        let response = ensure_success(url, response)?;
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DocsnapError::transport(format!("{url}: body read failed"), e))?;

        debug!(%url, %final_url, len = bytes.len(), "fetched binary");

        Ok(FetchedAsset {
            bytes: bytes.to_vec(),
            content_type,
            final_url,
        })
    }
}

fn ensure_success(url: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(DocsnapError::http_status(
            status.as_u16(),
            format!("{url}: HTTP {status}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> DocsClient {
        let config = ServiceConfig {
            origin: server.uri(),
            ..ServiceConfig::default()
        };
        DocsClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn page_request_sends_session_cookie() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/i/nodes/abc123"))
            .and(header("cookie", "session=1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>page</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let html = client_for(&server)
            .fetch_page("abc123", "session=1")
            .await
            .unwrap();
        assert_eq!(html, "<html>page</html>");
    }

    #[tokio::test]
    async fn document_data_request_carries_entry_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/document/data"))
            .and(header("a-dentry-key", "key-1"))
            .and(header("cookie", "session=1"))
            .and(body_json(json!({ "fetchBody": true })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "ok": 1 } })))
            .expect(1)
            .mount(&server)
            .await;

        let data = client_for(&server)
            .fetch_document_data("session=1", "key-1")
            .await
            .unwrap();
        assert_eq!(data["data"]["ok"], 1);
    }

    #[tokio::test]
    async fn non_success_status_is_retrieval_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/i/nodes/missing"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_page("missing", "session=1")
            .await
            .unwrap_err();

        assert_eq!(err.code(), "retrieval_error");
        assert!(matches!(
            err,
            DocsnapError::Retrieval {
                status: Some(403),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn transport_failure_has_no_status() {
        let config = ServiceConfig {
            origin: "http://127.0.0.1:1".into(),
            timeout_secs: 2,
            ..ServiceConfig::default()
        };
        let err = DocsClient::new(&config)
            .unwrap()
            .fetch_page("x", "t")
            .await
            .unwrap_err();
        assert!(matches!(err, DocsnapError::Retrieval { status: None, .. }));

        // The innermost cause (the refused connection) must reach the message.
        let mut root: &dyn std::error::Error = std::error::Error::source(&err).expect("cause attached");
        while let Some(next) = root.source() {
            root = next;
        }
        assert!(err.to_string().contains(&root.to_string()));
        assert!(!root.to_string().starts_with("error sending request"));
    }

    #[tokio::test]
    async fn binary_fetch_follows_redirects() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/old.png"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", "/store/new.png"),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/store/new.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(vec![0x89, b'P', b'N', b'G']),
            )
            .mount(&server)
            .await;

        let asset = client_for(&server)
            .fetch_binary(&format!("{}/old.png", server.uri()), "session=1")
            .await
            .unwrap();

        assert_eq!(asset.bytes, vec![0x89, b'P', b'N', b'G']);
        assert_eq!(asset.content_type.as_deref(), Some("image/png"));
        assert!(asset.final_url.ends_with("/store/new.png"));
    }

    #[test]
    fn origin_is_normalised() {
        let config = ServiceConfig {
            origin: "https://docs.example.com/".into(),
            ..ServiceConfig::default()
        };
        assert_eq!(
            DocsClient::new(&config).unwrap().origin(),
            "https://docs.example.com"
        );
    }
}
