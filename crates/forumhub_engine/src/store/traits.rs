/* 📖 # Why create a TopicStore trait?

The service only needs five things from storage: insert with a fresh id, list in
creation order, look up, patch and remove. Putting them behind a trait keeps the
HTTP and service layers independent of how topics are held, and lets a persistent
backend slot in later without touching them.
*/

use std::sync::Arc;

use chrono::NaiveDateTime;
use parking_lot::RwLock;

use forumhub_base::ForumResult;

use crate::topic::{NewTopic, Topic, TopicId, TopicUpdate};

/// Storage for topics, keyed by their server-assigned id.
pub trait TopicStore: Send + Sync + 'static {
    /// Store a new topic under the next unused id.
    ///
    /// Ids start at 1, grow by one per insert and are never handed out twice,
    /// even after the topic holding them is removed.
    fn insert(&mut self, new_topic: NewTopic, created_at: NaiveDateTime) -> ForumResult<Topic>;

    /// All topics in creation order.
    fn list(&self) -> ForumResult<Vec<Topic>>;

    /// Look up a topic.
    ///
    /// # Returns
    /// * `Ok(Some(topic))` - If the topic exists
    /// * `Ok(None)` - If no topic with that id exists
    fn get(&self, id: TopicId) -> ForumResult<Option<Topic>>;

    /// Apply a partial update and return the topic as it is afterwards.
    ///
    /// Returns `Ok(None)` if no topic with that id exists.
    fn update(&mut self, id: TopicId, update: &TopicUpdate) -> ForumResult<Option<Topic>>;

    /// Remove a topic, returning it if it existed.
    fn remove(&mut self, id: TopicId) -> ForumResult<Option<Topic>>;

    fn len(&self) -> ForumResult<usize>;

    fn is_empty(&self) -> ForumResult<bool>;
}

/// A thread-safe handle to a topic store.
///
/// Cloning is cheap (Arc). Reads share the lock; insert, update and remove take it
/// exclusively, so id assignment and the collection change happen as one step.
#[derive(Clone)]
pub struct StoreHandle(Arc<RwLock<dyn TopicStore>>);

impl StoreHandle {
    pub fn new<S: TopicStore>(store: S) -> Self {
        Self(Arc::new(RwLock::new(store)))
    }

    /// See [`TopicStore::insert`].
    pub fn insert(&self, new_topic: NewTopic, created_at: NaiveDateTime) -> ForumResult<Topic> {
        self.0.write().insert(new_topic, created_at)
    }

    /// See [`TopicStore::list`].
    pub fn list(&self) -> ForumResult<Vec<Topic>> {
        self.0.read().list()
    }

    /// See [`TopicStore::get`].
    pub fn get(&self, id: TopicId) -> ForumResult<Option<Topic>> {
        self.0.read().get(id)
    }

    /// See [`TopicStore::update`].
    pub fn update(&self, id: TopicId, update: &TopicUpdate) -> ForumResult<Option<Topic>> {
        self.0.write().update(id, update)
    }

    /// See [`TopicStore::remove`].
    pub fn remove(&self, id: TopicId) -> ForumResult<Option<Topic>> {
        self.0.write().remove(id)
    }

    pub fn len(&self) -> ForumResult<usize> {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> ForumResult<bool> {
        self.0.read().is_empty()
    }
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("len", &self.0.read().len().ok())
            .finish()
    }
}
