//! Projects, teams and the catalogues used to classify tasks.
//!
//! Projects group teams and tasks, teams group workers, and tags and task
//! types are shared reference data. Deleting a project detaches its teams
//! and tasks rather than removing them.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
