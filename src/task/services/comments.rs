//! Comment posting, editing and removal.

use super::{MutationHooks, TaskError, TaskResult};
use crate::task::{
    domain::{Comment, CommentContent, CommentId, TaskChangeSet, TaskId, TaskWrite},
    ports::TaskRepository,
};
use crate::worker::domain::{AccessDenied, Requester};
use crate::worker::ports::WorkerRepository;
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, warn};

/// A stored comment together with its author's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedComment {
    /// The stored comment.
    pub comment: Comment,
    /// Author's full name.
    pub author_name: String,
}

/// Comment orchestration.
pub struct CommentService<R, C>
where
    R: TaskRepository + WorkerRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    hooks: MutationHooks,
}

impl<R, C> Clone for CommentService<R, C>
where
    R: TaskRepository + WorkerRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            hooks: self.hooks,
        }
    }
}

impl<R, C> CommentService<R, C>
where
    R: TaskRepository + WorkerRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new comment service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>, hooks: MutationHooks) -> Self {
        Self {
            repository,
            clock,
            hooks,
        }
    }

    /// Posts a comment on a task and notifies the people following it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Domain`] for empty or oversized content and
    /// [`TaskError::NotFound`] for an unknown task.
    pub async fn add(
        &self,
        requester: &Requester,
        task_id: TaskId,
        content: &str,
    ) -> TaskResult<PostedComment> {
        let content = CommentContent::new(content)?;
        let task = self
            .repository
            .find_task(task_id)
            .await?
            .ok_or(TaskError::NotFound(task_id))?;
        let author_name = self
            .repository
            .find_by_id(requester.worker_id())
            .await?
            .map_or_else(|| requester.worker_id().to_string(), |worker| worker.full_name());
        let comment = Comment::new(task_id, requester.worker_id(), content, &*self.clock);
        let change_set =
            self.hooks
                .comment_added(&task, comment.clone(), &author_name, self.clock.utc());
        let recipients = change_set.notifications.len();
        self.repository.apply(change_set).await?;
        info!(
            comment_id = %comment.id(),
            task_id = %task_id,
            recipients,
            "comment added"
        );
        Ok(PostedComment {
            comment,
            author_name,
        })
    }

    /// Replaces a comment's content.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::CommentNotFound`] and [`TaskError::AccessDenied`]
    /// unless the requester wrote the comment or is staff.
    pub async fn edit(
        &self,
        requester: &Requester,
        id: CommentId,
        content: &str,
    ) -> TaskResult<Comment> {
        let content = CommentContent::new(content)?;
        let comment = self.owned(requester, id, "edit this comment").await?;
        let edited = comment.edited(content, &*self.clock);
        self.repository
            .apply(TaskChangeSet::bare(TaskWrite::UpdateComment(edited.clone())))
            .await?;
        info!(comment_id = %id, actor = %requester.worker_id(), "comment edited");
        Ok(edited)
    }

    /// Deletes a comment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::CommentNotFound`] and [`TaskError::AccessDenied`]
    /// as for [`Self::edit`].
    pub async fn delete(&self, requester: &Requester, id: CommentId) -> TaskResult<Comment> {
        let comment = self.owned(requester, id, "delete this comment").await?;
        self.repository
            .apply(TaskChangeSet::bare(TaskWrite::DeleteComment(id)))
            .await?;
        info!(comment_id = %id, actor = %requester.worker_id(), "comment deleted");
        Ok(comment)
    }

    /// Loads a comment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::CommentNotFound`] when absent.
    pub async fn get(&self, id: CommentId) -> TaskResult<Comment> {
        self.repository
            .find_comment(id)
            .await?
            .ok_or(TaskError::CommentNotFound(id))
    }

    /// Lists a task's comments, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Repository`] when the lookup fails.
    pub async fn list(&self, task: TaskId) -> TaskResult<Vec<Comment>> {
        Ok(self.repository.list_comments(task).await?)
    }

    async fn owned(&self, requester: &Requester, id: CommentId, action: &str) -> TaskResult<Comment> {
        let comment = self.get(id).await?;
        if !comment.can_be_edited_by(requester) {
            warn!(comment_id = %id, actor = %requester.worker_id(), action, "comment access denied");
            return Err(AccessDenied::new(action).into());
        }
        Ok(comment)
    }
}
