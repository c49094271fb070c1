//! Comments attached to tasks.

use super::{CommentId, TaskDomainError, TaskId};
use crate::identifier::bounded_text;
use crate::worker::domain::{Requester, WorkerId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Trimmed, non-empty comment body of at most 5000 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentContent(String);

impl CommentContent {
    /// Maximum stored length.
    pub const MAX_CHARS: usize = 5000;

    /// Creates validated comment content.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyComment`] or
    /// [`TaskDomainError::CommentTooLong`].
    pub fn new(value: &str) -> Result<Self, TaskDomainError> {
        bounded_text(
            value,
            Self::MAX_CHARS,
            || TaskDomainError::EmptyComment,
            TaskDomainError::CommentTooLong,
        )
        .map(Self)
    }

    /// Returns the content as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A worker's remark on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    id: CommentId,
    task: TaskId,
    author: WorkerId,
    content: CommentContent,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a comment by `author` on `task`.
    #[must_use]
    pub fn new(task: TaskId, author: WorkerId, content: CommentContent, clock: &impl Clock) -> Self {
        let now = clock.utc();
        Self {
            id: CommentId::new(),
            task,
            author,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstructs a comment from storage.
    #[must_use]
    pub const fn from_persisted(
        id: CommentId,
        task: TaskId,
        author: WorkerId,
        content: CommentContent,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            task,
            author,
            content,
            created_at,
            updated_at,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> CommentId {
        self.id
    }

    /// Returns the task the comment belongs to.
    #[must_use]
    pub const fn task(&self) -> TaskId {
        self.task
    }

    /// Returns the author.
    #[must_use]
    pub const fn author(&self) -> WorkerId {
        self.author
    }

    /// Returns the content.
    #[must_use]
    pub const fn content(&self) -> &CommentContent {
        &self.content
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last edit timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` when the requester may edit or delete the comment.
    #[must_use]
    pub fn can_be_edited_by(&self, requester: &Requester) -> bool {
        requester.is_staff() || self.author == requester.worker_id()
    }

    /// Returns an edited copy.
    #[must_use]
    pub fn edited(&self, content: CommentContent, clock: &impl Clock) -> Self {
        Self {
            content,
            updated_at: clock.utc(),
            ..self.clone()
        }
    }
}
