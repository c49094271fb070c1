//! Port contracts for organisation storage.

mod repository;

pub use repository::{
    CatalogRepository, OrganisationRepositoryError, OrganisationRepositoryResult,
    ProjectRepository, TeamRepository,
};
