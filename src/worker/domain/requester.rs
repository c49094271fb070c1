//! The identity on whose behalf a service call runs.

use super::{AccessDenied, Worker, WorkerId};

/// Explicit caller identity threaded through every service operation.
///
/// Services never consult ambient state to find out who is acting; the web
/// layer builds a `Requester` from the authenticated session and passes it
/// down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    worker_id: WorkerId,
    is_staff: bool,
    is_superuser: bool,
}

impl Requester {
    /// Creates a requester from raw privilege flags.
    #[must_use]
    pub const fn new(worker_id: WorkerId, is_staff: bool, is_superuser: bool) -> Self {
        Self {
            worker_id,
            is_staff,
            is_superuser,
        }
    }

    /// Creates a requester without elevated privileges.
    #[must_use]
    pub const fn regular(worker_id: WorkerId) -> Self {
        Self::new(worker_id, false, false)
    }

    /// Creates a requester for an authenticated worker.
    #[must_use]
    pub const fn for_worker(worker: &Worker) -> Self {
        Self::new(worker.id(), worker.is_staff(), worker.is_superuser())
    }

    /// Returns the acting worker.
    #[must_use]
    pub const fn worker_id(&self) -> WorkerId {
        self.worker_id
    }

    /// Returns `true` for staff members and superusers.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.is_staff || self.is_superuser
    }

    /// Returns `true` for superusers.
    #[must_use]
    pub const fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    /// Requires staff privilege.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied`] naming `action` when the requester is not
    /// staff.
    pub fn ensure_staff(&self, action: &str) -> Result<(), AccessDenied> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(AccessDenied::new(action))
        }
    }

    /// Requires superuser privilege.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied`] naming `action` when the requester is not a
    /// superuser.
    pub fn ensure_superuser(&self, action: &str) -> Result<(), AccessDenied> {
        if self.is_superuser {
            Ok(())
        } else {
            Err(AccessDenied::new(action))
        }
    }
}
