//! Error types for task domain validation.

use thiserror::Error;

/// Errors returned while constructing task domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyName,

    /// The task name exceeds 200 characters.
    #[error("task name exceeds 200 characters ({0})")]
    NameTooLong(usize),

    /// A new or changed deadline lies in the past.
    #[error("deadline cannot be in the past")]
    DeadlineInPast,

    /// The deadline could not be parsed.
    #[error("enter a valid date: '{0}'")]
    InvalidDeadline(String),

    /// The comment is empty after trimming.
    #[error("comment must not be empty")]
    EmptyComment,

    /// The comment exceeds 5000 characters.
    #[error("comment exceeds 5000 characters ({0})")]
    CommentTooLong(usize),

    /// The priority is not one of the four levels.
    #[error("unknown priority: {0}")]
    UnknownPriority(String),

    /// The stored activity kind is not recognised.
    #[error("unknown activity kind: {0}")]
    UnknownActivityKind(String),

    /// The stored notification kind is not recognised.
    #[error("unknown notification kind: {0}")]
    UnknownNotificationKind(String),
}

impl TaskDomainError {
    /// Returns the form field the error belongs to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong(_) => "name",
            Self::DeadlineInPast | Self::InvalidDeadline(_) => "deadline",
            Self::EmptyComment | Self::CommentTooLong(_) => "content",
            Self::UnknownPriority(_) => "priority",
            Self::UnknownActivityKind(_) | Self::UnknownNotificationKind(_) => "__all__",
        }
    }
}
