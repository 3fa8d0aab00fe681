/* 📖 # Why have forumhub_base as a core library?
forumhub_base provides the error type, tracing setup and platform abstraction shared by
the engine and the binary. Keeping them here prevents the engine from depending on the
real network or filesystem directly.
*/

pub mod error;
pub mod pal;
pub mod tracing;

// Re-export commonly used types for convenience
pub use error::{ErrorKind, ForumError, ForumResult, ResultExt};
pub use pal::{FilePath, MockPal, Pal, PalHandle, RealPal};
