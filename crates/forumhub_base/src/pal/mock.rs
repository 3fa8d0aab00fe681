use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveDateTime};

use crate::{ErrorKind, ForumError, ForumResult};

use super::FilePath;
use super::http::{HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle, HttpService};
use super::traits::Pal;

/// In-memory PAL implementation for testing.
///
/// Files live in a map, the clock stands still until moved with `set_current_time`,
/// and started servers are kept in a registry that `simulate_request` dispatches to.
///
/// ```
/// use forumhub_base::{FilePath, MockPal, Pal};
///
/// let mock = MockPal::new();
/// mock.add_file(FilePath::from("forumhub.toml"), b"port = 8080".to_vec());
/// let content = mock.read_file_to_string(&FilePath::from("forumhub.toml")).unwrap();
/// assert_eq!(content, "port = 8080");
/// ```
#[derive(Debug, Clone)]
pub struct MockPal {
    files: Arc<Mutex<HashMap<FilePath, Vec<u8>>>>,
    now: Arc<Mutex<NaiveDateTime>>,
    http_servers: Arc<Mutex<HashMap<u16, HttpServerInfo>>>,
    next_port: Arc<AtomicU16>,
}

#[derive(Debug)]
struct HttpServerInfo {
    service: Arc<dyn HttpService>,
    shutdown: Arc<AtomicBool>,
}

impl HttpServerInfo {
    fn is_running(&self) -> bool {
        !self.shutdown.load(Ordering::SeqCst)
    }
}

/// Lock a mutex, recovering the data if a panicking test poisoned it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockPal {
    /// Create a new MockPal whose clock reads [`MockPal::default_time`].
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            now: Arc::new(Mutex::new(Self::default_time())),
            http_servers: Arc::new(Mutex::new(HashMap::new())),
            next_port: Arc::new(AtomicU16::new(10000)),
        }
    }

    /// The initial mock clock value: 2024-01-15T10:30:00.
    pub fn default_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .and_then(|date| date.and_hms_opt(10, 30, 0))
            .unwrap_or_default()
    }

    pub fn add_file(&self, path: FilePath, content: Vec<u8>) {
        lock(&self.files).insert(path, content);
    }

    pub fn set_current_time(&self, time: NaiveDateTime) {
        *lock(&self.now) = time;
    }

    /// Simulate an HTTP request to a running server.
    ///
    /// Fails if no server was started on `port` or if it has been shut down.
    pub fn simulate_request(&self, port: u16, request: HttpRequest) -> ForumResult<HttpResponse> {
        let service = {
            let servers = lock(&self.http_servers);
            let info = servers
                .get(&port)
                .ok_or_else(|| crate::err!("No HTTP server registered on port {}", port))?;
            if !info.is_running() {
                crate::bail!("HTTP server on port {} has been shut down", port);
            }
            info.service.clone()
        };
        service.handle_request(request)
    }

    pub fn http_server_count(&self) -> usize {
        lock(&self.http_servers).len()
    }
}

impl Default for MockPal {
    fn default() -> Self {
        Self::new()
    }
}

impl Pal for MockPal {
    fn file_exists(&self, path: &FilePath) -> ForumResult<bool> {
        Ok(lock(&self.files).contains_key(path))
    }

    fn read_file(&self, path: &FilePath) -> ForumResult<Vec<u8>> {
        lock(&self.files).get(path).cloned().ok_or_else(|| {
            Box::new(ForumError::new(ErrorKind::FileError {
                path: path.as_path().to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ),
            }))
        })
    }

    fn current_time(&self) -> NaiveDateTime {
        *lock(&self.now)
    }

    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> ForumResult<HttpServerHandle> {
        let port = match config.port {
            Some(p) => p,
            None => self.next_port.fetch_add(1, Ordering::SeqCst),
        };

        let mut servers = lock(&self.http_servers);
        if servers
            .get(&port)
            .is_some_and(HttpServerInfo::is_running)
        {
            crate::bail!("Port {} is already in use", port);
        }
        // Only the flag is registered; dropping the caller's last handle stops the server.
        let shutdown = Arc::new(AtomicBool::new(false));
        servers.insert(
            port,
            HttpServerInfo {
                service: Arc::from(service),
                shutdown: shutdown.clone(),
            },
        );
        Ok(HttpServerHandle::with_flag(port, shutdown))
    }
}
