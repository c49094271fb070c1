//! Identifiers for organisation entities.

use crate::identifier::uuid_identifier;

uuid_identifier!(
    /// Unique identifier for a project.
    ProjectId
);

uuid_identifier!(
    /// Unique identifier for a team.
    TeamId
);

uuid_identifier!(
    /// Unique identifier for a tag.
    TagId
);

uuid_identifier!(
    /// Unique identifier for a task type.
    TaskTypeId
);
