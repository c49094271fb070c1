//! Positions (job titles) assigned to workers.

use super::{PositionId, WorkerDomainError};
use crate::identifier::bounded_text;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated, trimmed position name of at most 100 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionName(String);

impl PositionName {
    /// Maximum stored length.
    pub const MAX_CHARS: usize = 100;

    /// Creates a validated position name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerDomainError::EmptyPositionName`] or
    /// [`WorkerDomainError::PositionNameTooLong`].
    pub fn new(value: &str) -> Result<Self, WorkerDomainError> {
        bounded_text(
            value,
            Self::MAX_CHARS,
            || WorkerDomainError::EmptyPositionName,
            WorkerDomainError::PositionNameTooLong,
        )
        .map(Self)
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PositionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static reference data describing a worker's role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    id: PositionId,
    name: PositionName,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub fn new(name: PositionName) -> Self {
        Self {
            id: PositionId::new(),
            name,
        }
    }

    /// Reconstructs a position from storage.
    #[must_use]
    pub const fn from_persisted(id: PositionId, name: PositionName) -> Self {
        Self { id, name }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> PositionId {
        self.id
    }

    /// Returns the name.
    #[must_use]
    pub const fn name(&self) -> &PositionName {
        &self.name
    }

    /// Renames the position.
    pub fn rename(&mut self, name: PositionName) {
        self.name = name;
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
