//! Service layer for accounts and positions.

mod directory;

pub use directory::{
    DirectoryError, DirectoryResult, RegistrationRequest, WorkerDirectoryService,
};
