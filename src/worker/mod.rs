//! Worker accounts, positions, and the requester identity used for access
//! checks.
//!
//! Workers are the user accounts of the tracker. They are never hard-deleted:
//! deactivation keeps every activity and notification reference intact. The
//! module follows the same hexagonal split as the other contexts:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
