//! Project aggregate.

use super::{OrganisationDomainError, ProjectId};
use crate::identifier::bounded_text;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated project name, 1 to 200 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectName(String);

impl ProjectName {
    /// Creates a validated project name.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationDomainError::EmptyProjectName`] or
    /// [`OrganisationDomainError::ProjectNameTooLong`].
    pub fn new(value: &str) -> Result<Self, OrganisationDomainError> {
        bounded_text(
            value,
            200,
            || OrganisationDomainError::EmptyProjectName,
            OrganisationDomainError::ProjectNameTooLong,
        )
        .map(Self)
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated input for creating or editing a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    /// Project name.
    pub name: ProjectName,
    /// Free-form description, possibly empty.
    pub description: String,
}

impl ProjectDraft {
    /// Validates raw form input.
    ///
    /// # Errors
    ///
    /// Returns the name validation error.
    pub fn new(name: &str, description: &str) -> Result<Self, OrganisationDomainError> {
        Ok(Self {
            name: ProjectName::new(name)?,
            description: description.trim().to_owned(),
        })
    }
}

/// A body of work that owns teams and tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: ProjectName,
    description: String,
    created_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new project.
    #[must_use]
    pub fn new(draft: ProjectDraft, clock: &impl Clock) -> Self {
        Self {
            id: ProjectId::new(),
            name: draft.name,
            description: draft.description,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a project from storage.
    #[must_use]
    pub const fn from_persisted(
        id: ProjectId,
        name: ProjectName,
        description: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            created_at,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the name.
    #[must_use]
    pub const fn name(&self) -> &ProjectName {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Applies edited fields.
    pub fn apply(&mut self, draft: ProjectDraft) {
        self.name = draft.name;
        self.description = draft.description;
    }

    /// Returns `true` when the name or description contains `needle`,
    /// ignoring case.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.as_str().to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}
