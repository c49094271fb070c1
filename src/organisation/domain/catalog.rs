//! Tags and task types: named reference data shared by all tasks.

use super::{OrganisationDomainError, TagId, TaskTypeId};
use crate::identifier::bounded_text;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique catalogue name, 1 to 100 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogName(String);

impl CatalogName {
    /// Creates a validated name.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationDomainError::EmptyCatalogName`] or
    /// [`OrganisationDomainError::CatalogNameTooLong`].
    pub fn new(value: &str) -> Result<Self, OrganisationDomainError> {
        bounded_text(
            value,
            100,
            || OrganisationDomainError::EmptyCatalogName,
            OrganisationDomainError::CatalogNameTooLong,
        )
        .map(Self)
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-form label attached to tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    id: TagId,
    name: CatalogName,
}

impl Tag {
    /// Creates a new tag.
    #[must_use]
    pub fn new(name: CatalogName) -> Self {
        Self {
            id: TagId::new(),
            name,
        }
    }

    /// Reconstructs a tag from storage.
    #[must_use]
    pub const fn from_persisted(id: TagId, name: CatalogName) -> Self {
        Self { id, name }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> TagId {
        self.id
    }

    /// Returns the name.
    #[must_use]
    pub const fn name(&self) -> &CatalogName {
        &self.name
    }

    /// Renames the tag.
    pub fn rename(&mut self, name: CatalogName) {
        self.name = name;
    }
}

/// Task category such as "Bug" or "Feature".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskType {
    id: TaskTypeId,
    name: CatalogName,
}

impl TaskType {
    /// Creates a new task type.
    #[must_use]
    pub fn new(name: CatalogName) -> Self {
        Self {
            id: TaskTypeId::new(),
            name,
        }
    }

    /// Reconstructs a task type from storage.
    #[must_use]
    pub const fn from_persisted(id: TaskTypeId, name: CatalogName) -> Self {
        Self { id, name }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> TaskTypeId {
        self.id
    }

    /// Returns the name.
    #[must_use]
    pub const fn name(&self) -> &CatalogName {
        &self.name
    }

    /// Renames the task type.
    pub fn rename(&mut self, name: CatalogName) {
        self.name = name;
    }
}
