//! Worker aggregate and its validated value types.

use super::{PasswordHash, PositionId, WorkerDomainError, WorkerId};
use crate::identifier::bounded_text;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_NAME_CHARS: usize = 150;
const MAX_EMAIL_CHARS: usize = 254;

/// Login name: letters, digits and `@.+-_`, at most 150 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Creates a validated username.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerDomainError::EmptyUsername`],
    /// [`WorkerDomainError::UsernameTooLong`], or
    /// [`WorkerDomainError::InvalidUsername`].
    pub fn new(value: &str) -> Result<Self, WorkerDomainError> {
        let trimmed = bounded_text(
            value,
            MAX_NAME_CHARS,
            || WorkerDomainError::EmptyUsername,
            WorkerDomainError::UsernameTooLong,
        )?;
        let allowed = |ch: char| ch.is_alphanumeric() || matches!(ch, '@' | '.' | '+' | '-' | '_');
        if !trimmed.chars().all(allowed) {
            return Err(WorkerDomainError::InvalidUsername(trimmed));
        }
        Ok(Self(trimmed))
    }

    /// Returns the username as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Email address with a lower-cased domain part.
///
/// Uniqueness is checked case-insensitively through [`Email::normalized`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Creates a validated email address.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerDomainError::InvalidEmail`] when the address lacks a
    /// local part, a dotted domain, or contains whitespace.
    pub fn new(value: &str) -> Result<Self, WorkerDomainError> {
        let trimmed = value.trim();
        let invalid = || WorkerDomainError::InvalidEmail(trimmed.to_owned());
        if trimmed.chars().count() > MAX_EMAIL_CHARS || trimmed.chars().any(char::is_whitespace) {
            return Err(invalid());
        }
        let (local, domain) = trimmed.rsplit_once('@').ok_or_else(invalid)?;
        let domain_ok = domain
            .split('.')
            .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'))
            && domain.contains('.');
        if local.is_empty() || local.contains('@') || !domain_ok {
            return Err(invalid());
        }
        Ok(Self(format!("{local}@{}", domain.to_ascii_lowercase())))
    }

    /// Returns the address as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the fully lower-cased form used for uniqueness checks.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Editable profile fields shared by registration and profile updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerProfile {
    /// Contact address.
    pub email: Email,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Optional position reference.
    pub position: Option<PositionId>,
}

impl WorkerProfile {
    /// Validates raw profile input.
    ///
    /// # Errors
    ///
    /// Returns the first [`WorkerDomainError`] found, checking email, first
    /// name, then last name.
    pub fn new(
        email: &str,
        first_name: &str,
        last_name: &str,
        position: Option<PositionId>,
    ) -> Result<Self, WorkerDomainError> {
        let email = Email::new(email)?;
        let first_name = bounded_text(
            first_name,
            MAX_NAME_CHARS,
            || WorkerDomainError::EmptyFirstName,
            WorkerDomainError::NameTooLong,
        )?;
        let last_name = bounded_text(
            last_name,
            MAX_NAME_CHARS,
            || WorkerDomainError::EmptyLastName,
            WorkerDomainError::NameTooLong,
        )?;
        Ok(Self {
            email,
            first_name,
            last_name,
            position,
        })
    }
}

/// A user account of the tracker.
///
/// Workers are never hard-deleted; deactivation keeps audit references
/// intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worker {
    id: WorkerId,
    username: Username,
    profile: WorkerProfile,
    password: PasswordHash,
    is_active: bool,
    is_staff: bool,
    is_superuser: bool,
    date_joined: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedWorkerData {
    /// Persisted identifier.
    pub id: WorkerId,
    /// Persisted username.
    pub username: Username,
    /// Persisted profile.
    pub profile: WorkerProfile,
    /// Persisted credential.
    pub password: PasswordHash,
    /// Whether the account may sign in.
    pub is_active: bool,
    /// Staff privilege flag.
    pub is_staff: bool,
    /// Superuser privilege flag.
    pub is_superuser: bool,
    /// Registration timestamp.
    pub date_joined: DateTime<Utc>,
}

impl Worker {
    /// Creates an active, unprivileged worker.
    #[must_use]
    pub fn register(
        username: Username,
        profile: WorkerProfile,
        password: PasswordHash,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: WorkerId::new(),
            username,
            profile,
            password,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            date_joined: clock.utc(),
        }
    }

    /// Reconstructs a worker from storage.
    #[must_use]
    pub fn from_persisted(data: PersistedWorkerData) -> Self {
        Self {
            id: data.id,
            username: data.username,
            profile: data.profile,
            password: data.password,
            is_active: data.is_active,
            is_staff: data.is_staff,
            is_superuser: data.is_superuser,
            date_joined: data.date_joined,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> WorkerId {
        self.id
    }

    /// Returns the username.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Returns the profile fields.
    #[must_use]
    pub const fn profile(&self) -> &WorkerProfile {
        &self.profile
    }

    /// Returns the email address.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.profile.email
    }

    /// Returns the given name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.profile.first_name
    }

    /// Returns the family name.
    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.profile.last_name
    }

    /// Returns the position reference.
    #[must_use]
    pub const fn position(&self) -> Option<PositionId> {
        self.profile.position
    }

    /// Returns the stored credential.
    #[must_use]
    pub const fn password(&self) -> &PasswordHash {
        &self.password
    }

    /// Returns whether the account may sign in.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the staff flag.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.is_staff
    }

    /// Returns the superuser flag.
    #[must_use]
    pub const fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    /// Returns the registration timestamp.
    #[must_use]
    pub const fn date_joined(&self) -> DateTime<Utc> {
        self.date_joined
    }

    /// Returns "First Last", or the username when both names are blank.
    #[must_use]
    pub fn full_name(&self) -> String {
        let full = format!("{} {}", self.profile.first_name, self.profile.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.as_str().to_owned()
        } else {
            full.to_owned()
        }
    }

    /// Replaces the editable profile.
    pub fn update_profile(&mut self, profile: WorkerProfile) {
        self.profile = profile;
    }

    /// Replaces the credential.
    pub fn set_password(&mut self, password: PasswordHash) {
        self.password = password;
    }

    /// Sets the privilege flags.
    pub const fn set_privileges(&mut self, is_staff: bool, is_superuser: bool) {
        self.is_staff = is_staff;
        self.is_superuser = is_superuser;
    }

    /// Allows the worker to sign in again.
    pub const fn activate(&mut self) {
        self.is_active = true;
    }

    /// Blocks sign-in while keeping every reference to the worker.
    pub const fn deactivate(&mut self) {
        self.is_active = false;
    }
}

impl fmt::Display for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}
