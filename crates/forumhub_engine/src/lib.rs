pub mod api;
pub mod config;
pub mod service;
pub mod store;
pub mod topic;

pub use api::TopicApi;
pub use config::{Config, load_config};
pub use service::TopicService;
pub use store::{InMemoryTopicStore, StoreHandle, TopicStore};
pub use topic::{DEFAULT_STATUS, NewTopic, Topic, TopicDetail, TopicId, TopicSummary, TopicUpdate};
