//! Identifier types for the worker domain.

use crate::identifier::uuid_identifier;

uuid_identifier!(
    /// Unique identifier for a worker account.
    WorkerId
);

uuid_identifier!(
    /// Unique identifier for a position (job title).
    PositionId
);
