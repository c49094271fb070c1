//! Service layer for projects, teams and catalogues.

mod catalog;
mod error;
mod project;
mod team;

pub use catalog::CatalogService;
pub use error::{OrganisationError, OrganisationResult};
pub use project::ProjectService;
pub use team::TeamService;
