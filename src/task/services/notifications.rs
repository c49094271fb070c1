//! Notification read state, badge count and polling.

use super::{TaskError, TaskResult};
use crate::persistence::{PageRequest, Paged};
use crate::task::{
    domain::{Notification, NotificationFilter, NotificationId},
    ports::{NotificationQuery, NotificationRepository},
};
use crate::worker::domain::{Requester, WorkerId};
use std::sync::Arc;
use tracing::info;

/// Unread notifications returned by a poll.
pub const POLL_PREVIEW_LIMIT: usize = 5;

/// What the client's polling loop receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSnapshot {
    /// Badge count.
    pub unread_count: usize,
    /// Newest unread notifications, at most [`POLL_PREVIEW_LIMIT`].
    pub latest: Vec<Notification>,
}

/// Delivery and read-state transitions for notifications.
///
/// Notifications are only ever created by the mutation hooks; this service
/// never inserts.
pub struct NotificationService<R>
where
    R: NotificationRepository + ?Sized,
{
    repository: Arc<R>,
}

impl<R> Clone for NotificationService<R>
where
    R: NotificationRepository + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R> NotificationService<R>
where
    R: NotificationRepository + ?Sized,
{
    /// Creates a new notification service.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// One page of `worker`'s notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Repository`] when the lookup fails.
    pub async fn list(
        &self,
        worker: WorkerId,
        filter: NotificationFilter,
        page: PageRequest,
    ) -> TaskResult<Paged<Notification>> {
        let query = NotificationQuery::inbox(worker, filter);
        Ok(self.repository.list_notifications(&query, page).await?)
    }

    /// Marks one of the requester's notifications as read.
    ///
    /// Returns `false` when it was already read.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotificationNotFound`] when the notification
    /// does not exist or belongs to another worker.
    pub async fn mark_read(&self, id: NotificationId, requester: &Requester) -> TaskResult<bool> {
        let owned = self
            .repository
            .find_notification(id)
            .await?
            .filter(|notification| notification.recipient() == requester.worker_id());
        let Some(notification) = owned else {
            return Err(TaskError::NotificationNotFound(id));
        };
        if notification.is_read() {
            return Ok(false);
        }
        let changed = self.repository.set_read_state(&[id], true).await? > 0;
        Ok(changed)
    }

    /// Marks every unread notification of `worker` as read.
    ///
    /// Returns how many changed; a second call returns zero.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Repository`] when the update fails.
    pub async fn mark_all_read(&self, worker: WorkerId) -> TaskResult<usize> {
        let changed = self.repository.mark_all_read(worker).await?;
        info!(worker_id = %worker, changed, "notifications marked read");
        Ok(changed)
    }

    /// Badge count.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Repository`] when the lookup fails.
    pub async fn unread_count(&self, worker: WorkerId) -> TaskResult<usize> {
        Ok(self.repository.unread_count(worker).await?)
    }

    /// Badge count plus the newest unread notifications.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Repository`] when the lookup fails.
    pub async fn poll(&self, worker: WorkerId) -> TaskResult<NotificationSnapshot> {
        let unread = self
            .list(
                worker,
                NotificationFilter::Unread,
                PageRequest::first(POLL_PREVIEW_LIMIT),
            )
            .await?;
        Ok(NotificationSnapshot {
            unread_count: unread.total,
            latest: unread.items,
        })
    }

    /// One page of the admin listing across recipients.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::AccessDenied`] for non-staff requesters.
    pub async fn admin_list(
        &self,
        requester: &Requester,
        query: &NotificationQuery,
        page: PageRequest,
    ) -> TaskResult<Paged<Notification>> {
        requester.ensure_staff("view all notifications")?;
        Ok(self.repository.list_notifications(query, page).await?)
    }

    /// Admin bulk action setting the read flag of `ids`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::AccessDenied`] for non-staff requesters.
    pub async fn set_read_state(
        &self,
        requester: &Requester,
        ids: &[NotificationId],
        read: bool,
    ) -> TaskResult<usize> {
        requester.ensure_staff("change notification state")?;
        let changed = self.repository.set_read_state(ids, read).await?;
        info!(actor = %requester.worker_id(), read, changed, "notification bulk action");
        Ok(changed)
    }
}
