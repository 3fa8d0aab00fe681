/* 📖 # What is the Platform Abstraction Layer?

The PAL is the seam between the forum engine and the machine it runs on: config files,
the clock and the HTTP listener. Code depends on the Pal trait, so the whole API can be
exercised in-process with MockPal while RealPal serves real traffic.
*/

mod file_path;
pub mod http;
pub mod mock;
pub mod real_pal;
mod traits;

pub use file_path::FilePath;
pub use mock::MockPal;
pub use real_pal::RealPal;
pub use traits::{Pal, PalHandle};
