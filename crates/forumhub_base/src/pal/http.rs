/* 📖 # Why a dedicated HTTP module in the PAL?

The REST API is written against these plain types instead of tiny_http's, so the
same service can run behind the real server (RealPal) or be driven in-process by
tests (MockPal::simulate_request). Everything stays synchronous: one thread per
request is plenty for an in-memory topic board.
*/

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// HTTP methods understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    /// Parse an HTTP method, case-insensitively.
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            "PATCH" => Some(Self::Patch),
            "HEAD" => Some(Self::Head),
            "OPTIONS" => Some(Self::Options),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// HTTP headers. Names are matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    inner: HashMap<String, (String, String)>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing any previous value under the same name.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.inner
            .insert(key.to_ascii_lowercase(), (key, value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner
            .get(&key.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(&key.to_ascii_lowercase())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.inner
            .remove(&key.to_ascii_lowercase())
            .map(|(_, value)| value)
    }

    /// Iterate headers with their original spelling.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .values()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// HTTP request structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    method: HttpMethod,
    url: String,
    headers: HttpHeaders,
    body: Vec<u8>,
}

impl HttpRequest {
    /// Create a new request for the given URL (path plus optional query string).
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HttpHeaders::new(),
            body: vec![],
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The full request target, including any query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The request path without the query string.
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }

    /// The raw query string, if any.
    pub fn query(&self) -> Option<&str> {
        self.url.split_once('?').map(|(_, query)| query)
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HttpHeaders {
        &mut self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }
}

/// HTTP status codes used by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatusCode {
    Ok = 200,
    Created = 201,
    NoContent = 204,
    BadRequest = 400,
    NotFound = 404,
    MethodNotAllowed = 405,
    InternalServerError = 500,
}

impl HttpStatusCode {
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Created => "Created",
            Self::NoContent => "No Content",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::InternalServerError => "Internal Server Error",
        }
    }
}

/// HTTP response structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: HttpStatusCode,
    headers: HttpHeaders,
    body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: HttpStatusCode) -> Self {
        Self {
            status,
            headers: HttpHeaders::new(),
            body: vec![],
        }
    }

    pub fn ok() -> Self {
        Self::new(HttpStatusCode::Ok)
    }

    pub fn created() -> Self {
        Self::new(HttpStatusCode::Created)
    }

    pub fn no_content() -> Self {
        Self::new(HttpStatusCode::NoContent)
    }

    pub fn bad_request() -> Self {
        Self::new(HttpStatusCode::BadRequest)
    }

    pub fn not_found() -> Self {
        Self::new(HttpStatusCode::NotFound)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(HttpStatusCode::MethodNotAllowed)
    }

    pub fn internal_error() -> Self {
        Self::new(HttpStatusCode::InternalServerError)
    }

    pub fn status(&self) -> HttpStatusCode {
        self.status
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body as UTF-8 text, if it is valid UTF-8.
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header("Content-Type", content_type)
    }

    pub fn with_status(mut self, status: HttpStatusCode) -> Self {
        self.status = status;
        self
    }

    /// Create a 200 JSON response.
    pub fn json(body: impl Into<String>) -> Self {
        Self::ok()
            .with_content_type("application/json")
            .with_body(body.into())
    }
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on. If None, the OS will assign an available port.
    pub port: Option<u16>,
    /// Sent as the `Server` header.
    pub server_name: String,
}

impl HttpServerConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    /// The bind address; port 0 lets the OS pick.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port.unwrap_or(0))
    }
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: None,
            server_name: "forumhub".to_string(),
        }
    }
}

/* 📖 # Why a single HttpService trait?

The service receives every request and does its own routing. With a single resource
(`/topico`) a routing table would be more machinery than the routes themselves, and the
trait stays trivial to drive from tests.
*/

/// Trait for handling HTTP requests.
pub trait HttpService: std::fmt::Debug + Send + Sync + 'static {
    /// Handle an HTTP request and return a response.
    ///
    /// Expected failures (missing entities, malformed input) should already be mapped
    /// to responses. Errors returned here are treated as server faults and answered
    /// with HTTP 500 by the real server.
    fn handle_request(&self, request: HttpRequest) -> crate::ForumResult<HttpResponse>;
}

#[derive(Debug)]
struct ServerHandleInner {
    port: u16,
    shutdown: Arc<AtomicBool>,
}

impl Drop for ServerHandleInner {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

/// Handle to a running HTTP server.
///
/// Clones share the same server. The server stops accepting connections when
/// `shutdown()` is called or when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct HttpServerHandle {
    inner: Arc<ServerHandleInner>,
}

impl HttpServerHandle {
    pub fn new(port: u16) -> Self {
        Self::with_flag(port, Arc::new(AtomicBool::new(false)))
    }

    /// Create a handle around a shutdown flag the server loop is polling.
    pub fn with_flag(port: u16, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            inner: Arc::new(ServerHandleInner { port, shutdown }),
        }
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.inner.port
    }

    pub fn address(&self, host: &str) -> String {
        format!("{}:{}", host, self.inner.port)
    }

    /// Signal the server to shut down.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.inner.shutdown.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_parse() {
        assert_eq!(HttpMethod::parse("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("put"), Some(HttpMethod::Put));
        assert_eq!(HttpMethod::parse("BREW"), None);
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let mut headers = HttpHeaders::new();
        headers.insert("Content-Type", "application/json");
        headers.insert("host", "localhost:8080");

        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert_eq!(headers.get("Host"), Some("localhost:8080"));
        assert!(headers.iter().any(|(k, _)| k == "Content-Type"));

        headers.insert("CONTENT-TYPE", "text/plain");
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.remove("Content-Type"), Some("text/plain".to_string()));
        assert!(!headers.contains("content-type"));
    }

    #[test]
    fn test_request_path_and_query() {
        let request = HttpRequest::new(HttpMethod::Get, "/topico/3?verbose=true")
            .with_header("Accept", "application/json")
            .with_body("{}");

        assert_eq!(request.path(), "/topico/3");
        assert_eq!(request.query(), Some("verbose=true"));
        assert_eq!(request.url(), "/topico/3?verbose=true");
        assert_eq!(request.body(), b"{}");

        let plain = HttpRequest::new(HttpMethod::Get, "/topico");
        assert_eq!(plain.path(), "/topico");
        assert_eq!(plain.query(), None);
    }

    #[test]
    fn test_response_helpers() {
        let json = HttpResponse::json("[]");
        assert_eq!(json.status(), HttpStatusCode::Ok);
        assert_eq!(json.headers().get("content-type"), Some("application/json"));
        assert_eq!(json.body_text(), Some("[]"));

        assert_eq!(HttpResponse::no_content().status().as_u16(), 204);
        assert_eq!(
            HttpResponse::created()
                .with_status(HttpStatusCode::NotFound)
                .status()
                .reason_phrase(),
            "Not Found"
        );
    }

    #[test]
    fn test_server_config_address() {
        let config = HttpServerConfig::new("0.0.0.0").with_port(8080);
        assert_eq!(config.address(), "0.0.0.0:8080");
        assert_eq!(config.server_name, "forumhub");
        assert_eq!(HttpServerConfig::default().address(), "127.0.0.1:0");
    }

    #[test]
    fn test_server_handle_shutdown_on_last_drop() {
        let flag = Arc::new(AtomicBool::new(false));
        let handle = HttpServerHandle::with_flag(8080, flag.clone());
        let clone = handle.clone();
        assert_eq!(clone.address("localhost"), "localhost:8080");

        drop(clone);
        assert!(!flag.load(Ordering::SeqCst));

        drop(handle);
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn test_server_handle_explicit_shutdown() {
        let handle = HttpServerHandle::new(9000);
        assert!(!handle.is_shutdown());
        handle.shutdown();
        assert!(handle.is_shutdown());
    }
}
