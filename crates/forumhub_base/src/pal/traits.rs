use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::ForumResult;

use super::file_path::FilePath;
use super::http::{HttpServerConfig, HttpServerHandle, HttpService};

/* 📖 # Why is Pal a trait instead of a struct?

Everything the service needs from the outside world goes through it: the config file,
the wall clock that stamps new topics, and the listening socket. MockPal replaces all
three in tests, so creation timestamps are deterministic and HTTP tests never open a port.
*/

/// Platform Abstraction Layer (PAL) trait.
///
/// Two implementations are provided:
/// - `RealPal`: the real filesystem, local clock and a tiny_http server
/// - `MockPal`: in-memory files, a settable clock and an in-process server registry
pub trait Pal: std::fmt::Debug + Send + Sync + 'static {
    /// Check if a file exists at the given path.
    fn file_exists(&self, path: &FilePath) -> ForumResult<bool>;

    /// Read the entire file as raw bytes.
    fn read_file(&self, path: &FilePath) -> ForumResult<Vec<u8>>;

    /// Read the entire file as a UTF-8 string.
    fn read_file_to_string(&self, path: &FilePath) -> ForumResult<String> {
        let contents = self.read_file(path)?;
        String::from_utf8(contents).map_err(|_e| crate::err!("File is not valid UTF-8: {}", path))
    }

    /// Current local wall-clock time.
    fn current_time(&self) -> NaiveDateTime;

    /// Start an HTTP server with the given service.
    ///
    /// Returns once the server is listening. The server stops when the returned handle
    /// (and all its clones) are dropped or `shutdown()` is called.
    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> ForumResult<HttpServerHandle>;
}

/// Shared handle to a PAL implementation.
///
/// ```no_run
/// use forumhub_base::{PalHandle, RealPal};
///
/// let pal = PalHandle::new(RealPal::new(".".into()));
/// let pal_clone = pal.clone();
/// ```
#[derive(Debug, Clone)]
pub struct PalHandle(Arc<dyn Pal>);

impl PalHandle {
    pub fn new(pal: impl Pal + 'static) -> Self {
        Self(Arc::new(pal))
    }
}

impl std::ops::Deref for PalHandle {
    type Target = dyn Pal;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}
