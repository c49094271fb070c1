//! Domain model for projects, teams, tags and task types.

mod catalog;
mod error;
mod ids;
mod project;
mod team;

pub use catalog::{CatalogName, Tag, TaskType};
pub use error::OrganisationDomainError;
pub use ids::{ProjectId, TagId, TaskTypeId, TeamId};
pub use project::{Project, ProjectDraft, ProjectName};
pub use team::{PersistedTeamData, Team, TeamDraft, TeamName};
