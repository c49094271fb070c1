//! Registration, authentication and account administration.

use crate::worker::{
    domain::{
        AccessDenied, PasswordHash, Position, PositionId, PositionName, Requester, Username,
        Worker, WorkerDomainError, WorkerId, WorkerProfile,
    },
    ports::{PositionRepository, WorkerQuery, WorkerRepository, WorkerRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Raw registration form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationRequest {
    /// Requested login name.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Optional position.
    pub position: Option<PositionId>,
    /// Password.
    pub password1: String,
    /// Password confirmation.
    pub password2: String,
}

/// Service-level errors for the worker directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] WorkerDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] WorkerRepositoryError),
    /// The requester lacks the privilege.
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),
    /// The worker does not exist.
    #[error("worker not found: {0}")]
    NotFound(WorkerId),
    /// The position does not exist.
    #[error("position not found: {0}")]
    PositionNotFound(PositionId),
    /// Username and password do not match an active account.
    #[error("please enter a correct username and password")]
    InvalidCredentials,
}

/// Result type for worker directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Account and position orchestration service.
pub struct WorkerDirectoryService<R, C>
where
    R: WorkerRepository + PositionRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for WorkerDirectoryService<R, C>
where
    R: WorkerRepository + PositionRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> WorkerDirectoryService<R, C>
where
    R: WorkerRepository + PositionRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new directory service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Registers an active, unprivileged worker.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Domain`] for invalid input and
    /// [`DirectoryError::Repository`] when the username or email is taken.
    pub async fn register(&self, request: RegistrationRequest) -> DirectoryResult<Worker> {
        let username = Username::new(&request.username)?;
        let profile = WorkerProfile::new(
            &request.email,
            &request.first_name,
            &request.last_name,
            request.position,
        )?;
        let password = PasswordHash::from_new_password(&request.password1, &request.password2)?;
        let worker = Worker::register(username, profile, password, &*self.clock);
        self.repository.store(&worker).await?;
        info!(worker_id = %worker.id(), username = %worker.username(), "worker registered");
        Ok(worker)
    }

    /// Checks a username and password.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::InvalidCredentials`] for an unknown user, a
    /// wrong password or a deactivated account.
    pub async fn authenticate(&self, username: &str, password: &str) -> DirectoryResult<Worker> {
        let Ok(username) = Username::new(username) else {
            return Err(DirectoryError::InvalidCredentials);
        };
        let worker = self
            .repository
            .find_by_username(&username)
            .await?
            .filter(|worker| worker.is_active() && worker.password().verify(password));
        worker.ok_or_else(|| {
            warn!(username = %username, "failed sign-in attempt");
            DirectoryError::InvalidCredentials
        })
    }

    /// Loads a worker.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NotFound`] when absent.
    pub async fn get(&self, id: WorkerId) -> DirectoryResult<Worker> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(DirectoryError::NotFound(id))
    }

    /// Loads a worker if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Repository`] when the lookup fails.
    pub async fn find(&self, id: WorkerId) -> DirectoryResult<Option<Worker>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Loads the workers among `ids` that exist.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Repository`] when the lookup fails.
    pub async fn find_many(&self, ids: &[WorkerId]) -> DirectoryResult<Vec<Worker>> {
        Ok(self.repository.find_many(ids).await?)
    }

    /// Lists active workers for assignment and membership pickers.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Repository`] when the lookup fails.
    pub async fn list_active(&self) -> DirectoryResult<Vec<Worker>> {
        Ok(self.repository.list(&WorkerQuery::active()).await?)
    }

    /// Lists every account for the management screen.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::AccessDenied`] unless the requester is a
    /// superuser.
    pub async fn list(
        &self,
        requester: &Requester,
        query: &WorkerQuery,
    ) -> DirectoryResult<Vec<Worker>> {
        requester.ensure_superuser("manage workers")?;
        Ok(self.repository.list(query).await?)
    }

    /// Replaces a worker's profile.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::AccessDenied`] unless the requester is a
    /// superuser, [`DirectoryError::NotFound`] for an unknown worker, and
    /// repository errors for duplicate emails or unknown positions.
    pub async fn update_worker(
        &self,
        requester: &Requester,
        id: WorkerId,
        profile: WorkerProfile,
    ) -> DirectoryResult<Worker> {
        requester.ensure_superuser("manage workers")?;
        let mut worker = self.get(id).await?;
        worker.update_profile(profile);
        self.repository.update(&worker).await?;
        info!(worker_id = %id, actor = %requester.worker_id(), "worker profile updated");
        Ok(worker)
    }

    /// Activates or deactivates an account. Workers are never deleted.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::AccessDenied`] unless the requester is a
    /// superuser, or when a superuser tries to deactivate their own account.
    pub async fn set_active(
        &self,
        requester: &Requester,
        id: WorkerId,
        active: bool,
    ) -> DirectoryResult<Worker> {
        requester.ensure_superuser("manage workers")?;
        if !active && id == requester.worker_id() {
            warn!(worker_id = %id, "refused self-deactivation");
            return Err(AccessDenied::new("deactivate your own account").into());
        }
        let mut worker = self.get(id).await?;
        if active {
            worker.activate();
        } else {
            worker.deactivate();
        }
        self.repository.update(&worker).await?;
        info!(worker_id = %id, active, "worker activity changed");
        Ok(worker)
    }

    /// Creates the bootstrap superuser, or re-grants privileges and resets
    /// the password of an existing account with that username.
    ///
    /// # Errors
    ///
    /// Returns validation and repository errors.
    pub async fn ensure_superuser(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> DirectoryResult<Worker> {
        let username = Username::new(username)?;
        let password = PasswordHash::from_plaintext(password)?;
        if let Some(mut existing) = self.repository.find_by_username(&username).await? {
            existing.set_privileges(true, true);
            existing.set_password(password);
            existing.activate();
            self.repository.update(&existing).await?;
            info!(worker_id = %existing.id(), "superuser privileges ensured");
            return Ok(existing);
        }
        let profile = WorkerProfile::new(email, username.as_str(), "Admin", None)?;
        let mut worker = Worker::register(username, profile, password, &*self.clock);
        worker.set_privileges(true, true);
        self.repository.store(&worker).await?;
        info!(worker_id = %worker.id(), "superuser created");
        Ok(worker)
    }

    /// Lists positions by name.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Repository`] when the lookup fails.
    pub async fn list_positions(&self) -> DirectoryResult<Vec<Position>> {
        Ok(self.repository.list_positions().await?)
    }

    /// Loads a position.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::PositionNotFound`] when absent.
    pub async fn get_position(&self, id: PositionId) -> DirectoryResult<Position> {
        self.repository
            .find_position(id)
            .await?
            .ok_or(DirectoryError::PositionNotFound(id))
    }

    /// Creates a position.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::AccessDenied`] unless the requester is a
    /// superuser, plus validation and duplicate-name errors.
    pub async fn create_position(
        &self,
        requester: &Requester,
        name: &str,
    ) -> DirectoryResult<Position> {
        requester.ensure_superuser("manage positions")?;
        let position = Position::new(PositionName::new(name)?);
        self.repository.store_position(&position).await?;
        info!(position_id = %position.id(), name = %position.name(), "position created");
        Ok(position)
    }

    /// Renames a position.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::AccessDenied`] unless the requester is a
    /// superuser, plus not-found, validation and duplicate-name errors.
    pub async fn rename_position(
        &self,
        requester: &Requester,
        id: PositionId,
        name: &str,
    ) -> DirectoryResult<Position> {
        requester.ensure_superuser("manage positions")?;
        let mut position = self.get_position(id).await?;
        position.rename(PositionName::new(name)?);
        self.repository.update_position(&position).await?;
        info!(position_id = %id, "position renamed");
        Ok(position)
    }

    /// Deletes a position; workers holding it keep their accounts.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::AccessDenied`] unless the requester is a
    /// superuser, and repository errors for unknown positions.
    pub async fn delete_position(&self, requester: &Requester, id: PositionId) -> DirectoryResult<()> {
        requester.ensure_superuser("manage positions")?;
        self.repository.delete_position(id).await?;
        info!(position_id = %id, "position deleted");
        Ok(())
    }
}
