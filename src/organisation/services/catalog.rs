//! Tags and task types.

use super::{OrganisationError, OrganisationResult};
use crate::organisation::{
    domain::{CatalogName, Tag, TagId, TaskType, TaskTypeId},
    ports::CatalogRepository,
};
use crate::worker::domain::Requester;
use std::sync::Arc;
use tracing::info;

/// Maintains the tag and task-type catalogues.
///
/// Any signed-in worker may create or rename tags; deleting tags and every
/// task-type change need staff.
pub struct CatalogService<R>
where
    R: CatalogRepository + ?Sized,
{
    repository: Arc<R>,
}

impl<R> Clone for CatalogService<R>
where
    R: CatalogRepository + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R> CatalogService<R>
where
    R: CatalogRepository + ?Sized,
{
    /// Creates a new catalogue service.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Creates a tag.
    ///
    /// # Errors
    ///
    /// Returns validation errors and
    /// [`OrganisationRepositoryError::DuplicateTag`](crate::organisation::ports::OrganisationRepositoryError::DuplicateTag)
    /// for a taken name.
    pub async fn create_tag(&self, requester: &Requester, name: &str) -> OrganisationResult<Tag> {
        let tag = Tag::new(CatalogName::new(name)?);
        self.repository.store_tag(&tag).await?;
        info!(tag_id = %tag.id(), actor = %requester.worker_id(), "tag created");
        Ok(tag)
    }

    /// Renames a tag.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::TagNotFound`] plus validation and
    /// duplicate-name errors.
    pub async fn rename_tag(
        &self,
        requester: &Requester,
        id: TagId,
        name: &str,
    ) -> OrganisationResult<Tag> {
        let mut tag = self.get_tag(id).await?;
        tag.rename(CatalogName::new(name)?);
        self.repository.update_tag(&tag).await?;
        info!(tag_id = %id, actor = %requester.worker_id(), "tag renamed");
        Ok(tag)
    }

    /// Deletes a tag and removes it from every task.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::AccessDenied`] for non-staff requesters.
    pub async fn delete_tag(&self, requester: &Requester, id: TagId) -> OrganisationResult<()> {
        requester.ensure_staff("delete tags")?;
        self.repository.delete_tag(id).await?;
        info!(tag_id = %id, actor = %requester.worker_id(), "tag deleted");
        Ok(())
    }

    /// Loads a tag.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::TagNotFound`] when absent.
    pub async fn get_tag(&self, id: TagId) -> OrganisationResult<Tag> {
        self.repository
            .find_tag(id)
            .await?
            .ok_or(OrganisationError::TagNotFound(id))
    }

    /// Lists tags by name.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::Repository`] when the lookup fails.
    pub async fn list_tags(&self, search: Option<&str>) -> OrganisationResult<Vec<Tag>> {
        Ok(self.repository.list_tags(search).await?)
    }

    /// Creates a task type.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::AccessDenied`] for non-staff requesters,
    /// plus validation and duplicate-name errors.
    pub async fn create_task_type(
        &self,
        requester: &Requester,
        name: &str,
    ) -> OrganisationResult<TaskType> {
        requester.ensure_staff("manage task types")?;
        let task_type = TaskType::new(CatalogName::new(name)?);
        self.repository.store_task_type(&task_type).await?;
        info!(task_type_id = %task_type.id(), "task type created");
        Ok(task_type)
    }

    /// Renames a task type.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::AccessDenied`] for non-staff requesters,
    /// plus not-found, validation and duplicate-name errors.
    pub async fn rename_task_type(
        &self,
        requester: &Requester,
        id: TaskTypeId,
        name: &str,
    ) -> OrganisationResult<TaskType> {
        requester.ensure_staff("manage task types")?;
        let mut task_type = self.get_task_type(id).await?;
        task_type.rename(CatalogName::new(name)?);
        self.repository.update_task_type(&task_type).await?;
        info!(task_type_id = %id, "task type renamed");
        Ok(task_type)
    }

    /// Deletes a task type; tasks using it keep existing untyped.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::AccessDenied`] for non-staff requesters.
    pub async fn delete_task_type(
        &self,
        requester: &Requester,
        id: TaskTypeId,
    ) -> OrganisationResult<()> {
        requester.ensure_staff("manage task types")?;
        self.repository.delete_task_type(id).await?;
        info!(task_type_id = %id, "task type deleted");
        Ok(())
    }

    /// Loads a task type.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::TaskTypeNotFound`] when absent.
    pub async fn get_task_type(&self, id: TaskTypeId) -> OrganisationResult<TaskType> {
        self.repository
            .find_task_type(id)
            .await?
            .ok_or(OrganisationError::TaskTypeNotFound(id))
    }

    /// Lists task types by name.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::Repository`] when the lookup fails.
    pub async fn list_task_types(&self) -> OrganisationResult<Vec<TaskType>> {
        Ok(self.repository.list_task_types().await?)
    }
}
