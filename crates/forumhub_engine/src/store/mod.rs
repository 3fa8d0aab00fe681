pub mod memory;
pub mod traits;

pub use memory::InMemoryTopicStore;
pub use traits::{StoreHandle, TopicStore};
