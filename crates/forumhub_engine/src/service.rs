use forumhub_base::{ForumError, ForumResult, PalHandle};
use tracing::{debug, info, instrument};

use crate::store::StoreHandle;
use crate::topic::{NewTopic, TopicDetail, TopicId, TopicSummary, TopicUpdate};

const TOPIC: &str = "topic";

/// The five topic operations, independent of any transport.
///
/// Missing ids surface as [`forumhub_base::ErrorKind::NotFound`].
#[derive(Debug, Clone)]
pub struct TopicService {
    store: StoreHandle,
    pal: PalHandle,
}

impl TopicService {
    pub fn new(store: StoreHandle, pal: PalHandle) -> Self {
        Self { store, pal }
    }

    /// Create a topic stamped with the current time and status `UNANSWERED`.
    #[instrument(skip(self, new_topic), fields(title = %new_topic.title))]
    pub fn create(&self, new_topic: NewTopic) -> ForumResult<TopicDetail> {
        let topic = self.store.insert(new_topic, self.pal.current_time())?;
        info!(id = %topic.id(), "Topic created: {}", topic.title());
        Ok(topic.detail())
    }

    pub fn list(&self) -> ForumResult<Vec<TopicSummary>> {
        Ok(self.store.list()?.iter().map(|t| t.summary()).collect())
    }

    #[instrument(skip(self))]
    pub fn detail(&self, id: TopicId) -> ForumResult<TopicDetail> {
        self.store
            .get(id)?
            .map(|topic| topic.detail())
            .ok_or_else(|| Box::new(ForumError::not_found(TOPIC, id)))
    }

    #[instrument(skip(self, update))]
    pub fn update(&self, id: TopicId, update: TopicUpdate) -> ForumResult<TopicDetail> {
        let topic = self
            .store
            .update(id, &update)?
            .ok_or_else(|| Box::new(ForumError::not_found(TOPIC, id)))?;
        debug!(status = topic.status(), "Topic updated");
        Ok(topic.detail())
    }

    /// Remove a topic. A second delete of the same id reports NotFound.
    #[instrument(skip(self))]
    pub fn delete(&self, id: TopicId) -> ForumResult<()> {
        match self.store.remove(id)? {
            Some(topic) => {
                info!("Topic deleted: {}", topic.title());
                Ok(())
            }
            None => Err(Box::new(ForumError::not_found(TOPIC, id))),
        }
    }
}
