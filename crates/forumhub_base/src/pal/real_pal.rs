use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use chrono::NaiveDateTime;
use tiny_http::{Header, Response, Server, StatusCode};
use tracing::{debug, error, info, instrument, warn};

use crate::{ErrorKind, ForumError, ForumResult};

use super::FilePath;
use super::http::{
    HttpMethod, HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle, HttpService,
};
use super::traits::Pal;

/// How often the accept loop checks the shutdown flag.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// PAL implementation backed by the real filesystem, the local clock and tiny_http.
///
/// File paths are resolved relative to a configured base directory.
#[derive(Debug)]
pub struct RealPal {
    base_dir: PathBuf,
}

impl RealPal {
    /// Create a new RealPal resolving paths against `base_dir`.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn resolve_path(&self, path: &FilePath) -> PathBuf {
        path.resolve(&self.base_dir)
    }
}

impl Pal for RealPal {
    #[instrument(skip(self), fields(path = %path))]
    fn file_exists(&self, path: &FilePath) -> ForumResult<bool> {
        let resolved = self.resolve_path(path);
        let exists = resolved.exists();
        debug!(exists, resolved = %resolved.display(), "checked file existence");
        Ok(exists)
    }

    #[instrument(skip(self), fields(path = %path))]
    fn read_file(&self, path: &FilePath) -> ForumResult<Vec<u8>> {
        let resolved = self.resolve_path(path);
        fs::read(&resolved).map_err(|e| {
            debug!(error = %e, "failed to read file");
            Box::new(ForumError::new(ErrorKind::FileError {
                path: resolved,
                source: e,
            }))
        })
    }

    fn current_time(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }

    #[instrument(skip(self, service), fields(address = %config.address()))]
    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> ForumResult<HttpServerHandle> {
        let server = Server::http(config.address()).map_err(|e| {
            crate::err!("Failed to bind HTTP server to {}: {}", config.address(), e)
        })?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .ok_or_else(|| crate::err!("HTTP server is not listening on an IP address"))?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let handle = HttpServerHandle::with_flag(port, shutdown.clone());
        let service: Arc<dyn HttpService> = Arc::from(service);
        let server_name = config.server_name.clone();

        thread::Builder::new()
            .name(format!("{}-accept", server_name))
            .spawn(move || accept_loop(server, service, server_name, shutdown))
            .map_err(|e| crate::err!("Failed to spawn HTTP accept thread: {}", e))?;

        info!(host = %config.host, port, "HTTP server listening");
        Ok(handle)
    }
}

fn accept_loop(
    server: Server,
    service: Arc<dyn HttpService>,
    server_name: String,
    shutdown: Arc<AtomicBool>,
) {
    while !shutdown.load(Ordering::SeqCst) {
        match server.recv_timeout(ACCEPT_POLL_INTERVAL) {
            Ok(Some(request)) => {
                let service = service.clone();
                let server_name = server_name.clone();
                thread::spawn(move || respond(service.as_ref(), request, &server_name));
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to receive HTTP request"),
        }
    }
    info!("HTTP server stopped");
}

#[instrument(skip_all, fields(method = %request.method(), url = %request.url()))]
fn respond(service: &dyn HttpService, mut request: tiny_http::Request, server_name: &str) {
    let response = match to_http_request(&mut request) {
        Ok(http_request) => service.handle_request(http_request).unwrap_or_else(|e| {
            error!("request failed: {:?}", e);
            HttpResponse::internal_error()
                .with_content_type("text/plain")
                .with_body(e.to_string())
        }),
        Err(response) => response,
    };
    debug!(status = response.status().as_u16(), "sending response");

    let status = StatusCode(response.status().as_u16());
    let mut tiny_response = Response::from_data(response.body().to_vec()).with_status_code(status);
    for (key, value) in response.headers().iter() {
        match Header::from_bytes(key.as_bytes(), value.as_bytes()) {
            Ok(header) => tiny_response.add_header(header),
            Err(()) => warn!(header = key, "dropping invalid response header"),
        }
    }
    if let Ok(header) = Header::from_bytes(&b"Server"[..], server_name.as_bytes()) {
        tiny_response.add_header(header);
    }

    if let Err(e) = request.respond(tiny_response) {
        warn!(error = %e, "failed to write HTTP response");
    }
}

/// Convert a tiny_http request, or produce the response to send instead.
fn to_http_request(request: &mut tiny_http::Request) -> Result<HttpRequest, HttpResponse> {
    let Some(method) = HttpMethod::parse(&request.method().to_string()) else {
        return Err(HttpResponse::method_not_allowed());
    };
    let mut http_request = HttpRequest::new(method, request.url());
    for header in request.headers() {
        http_request
            .headers_mut()
            .insert(header.field.to_string(), header.value.to_string());
    }
    let mut body = Vec::new();
    if let Err(e) = request.as_reader().read_to_end(&mut body) {
        warn!(error = %e, "failed to read request body");
        return Err(HttpResponse::bad_request());
    }
    Ok(http_request.with_body(body))
}
