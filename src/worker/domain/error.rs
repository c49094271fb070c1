//! Error types for worker domain validation and access checks.

use thiserror::Error;

/// Errors returned while constructing worker domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkerDomainError {
    /// The username is empty after trimming.
    #[error("username must not be empty")]
    EmptyUsername,

    /// The username contains characters outside letters, digits and `@.+-_`.
    #[error("username '{0}' may contain only letters, digits and @/./+/-/_")]
    InvalidUsername(String),

    /// The username exceeds the 150-character storage limit.
    #[error("username exceeds 150 characters ({0})")]
    UsernameTooLong(usize),

    /// The email address is malformed.
    #[error("enter a valid email address")]
    InvalidEmail(String),

    /// The first name is empty after trimming.
    #[error("first name must not be empty")]
    EmptyFirstName,

    /// The last name is empty after trimming.
    #[error("last name must not be empty")]
    EmptyLastName,

    /// A personal name exceeds the 150-character storage limit.
    #[error("name exceeds 150 characters ({0})")]
    NameTooLong(usize),

    /// The password is shorter than the minimum length.
    #[error("password must contain at least {0} characters")]
    PasswordTooShort(usize),

    /// The password consists of digits only.
    #[error("password must not be entirely numeric")]
    PasswordEntirelyNumeric,

    /// The password confirmation does not match.
    #[error("the two password fields didn't match")]
    PasswordMismatch,

    /// The password hasher failed.
    #[error("password hashing failed: {0}")]
    PasswordHashing(String),

    /// The position name is empty after trimming.
    #[error("position name must not be empty")]
    EmptyPositionName,

    /// The position name exceeds the 100-character storage limit.
    #[error("position name exceeds 100 characters ({0})")]
    PositionNameTooLong(usize),
}

impl WorkerDomainError {
    /// Returns the form field the error belongs to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyUsername | Self::InvalidUsername(_) | Self::UsernameTooLong(_) => {
                "username"
            }
            Self::InvalidEmail(_) => "email",
            Self::EmptyFirstName | Self::NameTooLong(_) => "first_name",
            Self::EmptyLastName => "last_name",
            Self::PasswordTooShort(_) | Self::PasswordEntirelyNumeric | Self::PasswordHashing(_) => {
                "password1"
            }
            Self::PasswordMismatch => "password2",
            Self::EmptyPositionName | Self::PositionNameTooLong(_) => "name",
        }
    }
}

/// Returned when a requester lacks the privilege for an operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("permission denied: {action}")]
pub struct AccessDenied {
    action: String,
}

impl AccessDenied {
    /// Creates an access error naming the refused action.
    #[must_use]
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
        }
    }

    /// Returns the refused action.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }
}
