//! Thread-safe in-memory tables.

use super::StoreFailure;
use crate::organisation::domain::{Project, ProjectId, Tag, TagId, TaskType, TaskTypeId, Team, TeamId};
use crate::task::domain::{ActivityLog, Comment, CommentId, Notification, NotificationId, Task, TaskId};
use crate::worker::domain::{Position, PositionId, Worker, WorkerId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Store holding every table in process memory.
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

/// The rows of every table.
#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub(crate) positions: HashMap<PositionId, Position>,
    pub(crate) workers: HashMap<WorkerId, Worker>,
    pub(crate) projects: HashMap<ProjectId, Project>,
    pub(crate) teams: HashMap<TeamId, Team>,
    pub(crate) tags: HashMap<TagId, Tag>,
    pub(crate) task_types: HashMap<TaskTypeId, TaskType>,
    pub(crate) tasks: HashMap<TaskId, Task>,
    pub(crate) comments: HashMap<CommentId, Comment>,
    pub(crate) activity: Vec<ActivityLog>,
    pub(crate) notifications: HashMap<NotificationId, Notification>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreFailure> {
        self.tables.read().map_err(|_| StoreFailure::Poisoned)
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreFailure> {
        self.tables.write().map_err(|_| StoreFailure::Poisoned)
    }
}

/// Sorts `rows` newest first by `created_at`.
pub(crate) fn newest_first<T>(rows: &mut [T], created_at: impl Fn(&T) -> chrono::DateTime<chrono::Utc>) {
    rows.sort_by(|left, right| created_at(right).cmp(&created_at(left)));
}
