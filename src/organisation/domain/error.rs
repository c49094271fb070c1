//! Validation errors for organisation entities.

use thiserror::Error;

/// Errors returned while constructing organisation domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrganisationDomainError {
    /// The project name is empty after trimming.
    #[error("project name must not be empty")]
    EmptyProjectName,

    /// The project name exceeds 200 characters.
    #[error("project name exceeds 200 characters ({0})")]
    ProjectNameTooLong(usize),

    /// The team name is empty after trimming.
    #[error("team name must not be empty")]
    EmptyTeamName,

    /// The team name exceeds 200 characters.
    #[error("team name exceeds 200 characters ({0})")]
    TeamNameTooLong(usize),

    /// A tag or task type name is empty after trimming.
    #[error("name must not be empty")]
    EmptyCatalogName,

    /// A tag or task type name exceeds 100 characters.
    #[error("name exceeds 100 characters ({0})")]
    CatalogNameTooLong(usize),
}

impl OrganisationDomainError {
    /// Returns the form field the error belongs to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        "name"
    }
}
