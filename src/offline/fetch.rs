//! The outbound request seam and its ureq-backed implementation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::time::Duration;

/// Hard timeout applied to every outbound call.
pub const FETCH_TIMEOUT_MS: u64 = 10_000;

/// Responses larger than this are treated as malformed.
const MAX_BODY_BYTES: u64 = 2 * 1024 * 1024;

const USER_AGENT: &str = "HabitatLocator/0.3 (locate-me dossier)";

/// Request identity: method plus URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".into(),
            url: url.into(),
        }
    }

    /// The cache key for this request.
    pub fn identity(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

/// A fetched response, as stored and replayed by the shell cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    /// UTC millis at fetch time, for cache diagnostics.
    pub fetched_at_ms: i64,
}

impl HttpResponse {
    pub fn new(status: u16, content_type: Option<String>, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type,
            body,
            fetched_at_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Transport-level failures, before any pipeline-step classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    TimedOut,
    Status(u16),
    Network(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimedOut => write!(f, "request timed out"),
            Self::Status(code) => write!(f, "HTTP {}", code),
            Self::Network(msg) => write!(f, "network error: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

/// The single seam for outbound requests. The offline cache decorates it,
/// and tests substitute it.
pub trait Fetch {
    fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError>;
}

impl<F: Fetch + ?Sized> Fetch for &F {
    fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        (**self).fetch(request)
    }
}

/// Blocking HTTP fetcher with the shared timeout and User-Agent.
pub struct UreqFetcher {
    agent: ureq::Agent,
}

impl UreqFetcher {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_millis(FETCH_TIMEOUT_MS))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl Default for UreqFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetch for UreqFetcher {
    fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        let response = self
            .agent
            .request(&request.method, &request.url)
            .set("User-Agent", USER_AGENT)
            .call()
            .map_err(classify)?;

        let status = response.status();
        let content_type = Some(response.content_type().to_string());

        let mut body = Vec::new();
        response
            .into_reader()
            .take(MAX_BODY_BYTES)
            .read_to_end(&mut body)
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(HttpResponse::new(status, content_type, body))
    }
}

fn classify(err: ureq::Error) -> FetchError {
    match err {
        ureq::Error::Status(code, _) => FetchError::Status(code),
        ureq::Error::Transport(transport) => {
            if is_timeout(&transport) {
                FetchError::TimedOut
            } else {
                FetchError::Network(transport.to_string())
            }
        }
    }
}

fn is_timeout(transport: &ureq::Transport) -> bool {
    use std::error::Error as _;

    if transport.kind() != ureq::ErrorKind::Io {
        return false;
    }
    match transport
        .source()
        .and_then(|source| source.downcast_ref::<std::io::Error>())
    {
        Some(io_err) => matches!(
            io_err.kind(),
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
        ),
        // No reachable io::Error; fall back to the transport message.
        None => transport.to_string().contains("timed out"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_identity() {
        let req = HttpRequest::get("https://habitat-locator.app/manifest.json");
        assert_eq!(req.identity(), "GET https://habitat-locator.app/manifest.json");
    }

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(FetchError::Status(404).to_string(), "HTTP 404");
        assert_eq!(FetchError::TimedOut.to_string(), "request timed out");
    }

    #[test]
    fn test_unresponsive_server_classified_as_timeout() {
        // A bound listener that never answers: the connect succeeds via the
        // accept backlog, then the read hits the agent timeout.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let fetcher = UreqFetcher::with_timeout(Duration::from_millis(200));
        let request = HttpRequest::get(format!("http://{}/", addr));
        assert_eq!(fetcher.fetch(&request), Err(FetchError::TimedOut));
    }

    #[test]
    fn test_response_records_fetch_time() {
        let before = chrono::Utc::now().timestamp_millis();
        let resp = HttpResponse::new(200, None, b"ok".to_vec());
        assert!(resp.fetched_at_ms >= before);
    }
}
