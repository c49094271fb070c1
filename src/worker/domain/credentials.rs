//! Password credentials stored as Argon2 PHC strings.

use super::WorkerDomainError;
use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use std::fmt;

/// Minimum accepted password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hashed password credential.
///
/// The plaintext never leaves [`PasswordHash::from_plaintext`]; only the PHC
/// string is stored and compared.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Validates a new password and its confirmation, then hashes it.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerDomainError::PasswordMismatch`] when the confirmation
    /// differs, [`WorkerDomainError::PasswordTooShort`] or
    /// [`WorkerDomainError::PasswordEntirelyNumeric`] for weak passwords, and
    /// [`WorkerDomainError::PasswordHashing`] when the hasher fails.
    pub fn from_new_password(password: &str, confirmation: &str) -> Result<Self, WorkerDomainError> {
        if password != confirmation {
            return Err(WorkerDomainError::PasswordMismatch);
        }
        Self::from_plaintext(password)
    }

    /// Validates and hashes a plaintext password.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerDomainError::PasswordTooShort`],
    /// [`WorkerDomainError::PasswordEntirelyNumeric`], or
    /// [`WorkerDomainError::PasswordHashing`].
    pub fn from_plaintext(password: &str) -> Result<Self, WorkerDomainError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(WorkerDomainError::PasswordTooShort(MIN_PASSWORD_LENGTH));
        }
        if password.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(WorkerDomainError::PasswordEntirelyNumeric);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| WorkerDomainError::PasswordHashing(err.to_string()))?;
        Ok(Self(hash.to_string()))
    }

    /// Wraps a PHC string loaded from storage.
    #[must_use]
    pub fn from_persisted(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// Returns `true` when `candidate` matches the stored hash.
    ///
    /// A malformed stored hash never matches.
    #[must_use]
    pub fn verify(&self, candidate: &str) -> bool {
        PhcString::new(&self.0).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok()
        })
    }

    /// Returns the PHC string for persistence.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}
