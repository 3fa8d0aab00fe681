/* 📖 # Why a BTreeMap and not a Vec or HashMap?

Topics must be listed in creation order and looked up by id. Ids are handed out in
increasing order, so ordering the map by id gives creation order for free, while
lookups, updates and removals avoid a linear scan.
*/

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use forumhub_base::ForumResult;

use crate::store::traits::TopicStore;
use crate::topic::{NewTopic, Topic, TopicId, TopicUpdate};

/// Unpersisted topic store living for the lifetime of the process.
///
/// # Example
///
/// ```
/// use forumhub_engine::{InMemoryTopicStore, NewTopic, TopicStore};
/// use forumhub_base::MockPal;
///
/// let mut store = InMemoryTopicStore::new();
/// let topic = store
///     .insert(
///         NewTopic {
///             title: "Lifetimes".to_string(),
///             message: "What does 'a mean?".to_string(),
///             author: "ana".to_string(),
///             course: "Rust".to_string(),
///         },
///         MockPal::default_time(),
///     )
///     .unwrap();
///
/// assert_eq!(topic.id().value(), 1);
/// assert_eq!(store.len().unwrap(), 1);
/// ```
#[derive(Debug)]
pub struct InMemoryTopicStore {
    topics: BTreeMap<TopicId, Topic>,
    next_id: TopicId,
}

impl InMemoryTopicStore {
    pub fn new() -> Self {
        Self {
            topics: BTreeMap::new(),
            next_id: TopicId::FIRST,
        }
    }
}

impl Default for InMemoryTopicStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TopicStore for InMemoryTopicStore {
    fn insert(&mut self, new_topic: NewTopic, created_at: NaiveDateTime) -> ForumResult<Topic> {
        let id = self.next_id;
        self.next_id = id.next();
        let topic = Topic::new(id, new_topic, created_at);
        self.topics.insert(id, topic.clone());
        Ok(topic)
    }

    fn list(&self) -> ForumResult<Vec<Topic>> {
        Ok(self.topics.values().cloned().collect())
    }

    fn get(&self, id: TopicId) -> ForumResult<Option<Topic>> {
        Ok(self.topics.get(&id).cloned())
    }

    fn update(&mut self, id: TopicId, update: &TopicUpdate) -> ForumResult<Option<Topic>> {
        Ok(self.topics.get_mut(&id).map(|topic| {
            topic.apply(update);
            topic.clone()
        }))
    }

    fn remove(&mut self, id: TopicId) -> ForumResult<Option<Topic>> {
        Ok(self.topics.remove(&id))
    }

    fn len(&self) -> ForumResult<usize> {
        Ok(self.topics.len())
    }

    fn is_empty(&self) -> ForumResult<bool> {
        Ok(self.topics.is_empty())
    }
}
