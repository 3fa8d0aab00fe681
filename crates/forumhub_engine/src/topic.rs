use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Status given to every topic when it is created.
pub const DEFAULT_STATUS: &str = "UNANSWERED";

/// Server-assigned topic identifier. Ids start at 1 and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(u64);

impl TopicId {
    pub const FIRST: TopicId = TopicId(1);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for TopicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Body of a create request. All four fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewTopic {
    pub title: String,
    pub message: String,
    pub author: String,
    pub course: String,
}

/// Body of an update request.
///
/// `None` leaves the stored value alone. An absent key and an explicit JSON `null`
/// both deserialize to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TopicUpdate {
    pub title: Option<String>,
    pub message: Option<String>,
    pub status: Option<String>,
}

impl TopicUpdate {
    /// True if applying this update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.message.is_none() && self.status.is_none()
    }
}

/// A discussion topic as held by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    id: TopicId,
    title: String,
    message: String,
    creation_timestamp: NaiveDateTime,
    status: String,
    author: String,
    course: String,
}

impl Topic {
    /// Build a freshly created topic with the default status.
    pub fn new(id: TopicId, new_topic: NewTopic, creation_timestamp: NaiveDateTime) -> Self {
        let NewTopic {
            title,
            message,
            author,
            course,
        } = new_topic;
        Self {
            id,
            title,
            message,
            creation_timestamp,
            status: DEFAULT_STATUS.to_string(),
            author,
            course,
        }
    }

    pub fn id(&self) -> TopicId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn creation_timestamp(&self) -> NaiveDateTime {
        self.creation_timestamp
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    /// Overwrite title, message and status with whichever of them the update carries.
    /// Id, author, course and creation timestamp never change.
    pub fn apply(&mut self, update: &TopicUpdate) {
        if let Some(title) = &update.title {
            self.title.clone_from(title);
        }
        if let Some(message) = &update.message {
            self.message.clone_from(message);
        }
        if let Some(status) = &update.status {
            self.status.clone_from(status);
        }
    }

    pub fn detail(&self) -> TopicDetail {
        TopicDetail {
            id: self.id,
            title: self.title.clone(),
            message: self.message.clone(),
            creation_timestamp: self.creation_timestamp,
            status: self.status.clone(),
            author: self.author.clone(),
            course: self.course.clone(),
        }
    }

    pub fn summary(&self) -> TopicSummary {
        TopicSummary {
            id: self.id,
            title: self.title.clone(),
            author: self.author.clone(),
            course: self.course.clone(),
            status: self.status.clone(),
        }
    }
}

/// Full view of a topic, returned by create, detail and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDetail {
    pub id: TopicId,
    pub title: String,
    pub message: String,
    pub creation_timestamp: NaiveDateTime,
    pub status: String,
    pub author: String,
    pub course: String,
}

/// Reduced view of a topic, returned by list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSummary {
    pub id: TopicId,
    pub title: String,
    pub author: String,
    pub course: String,
    pub status: String,
}
