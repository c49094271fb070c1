//! Teamboard: team task tracking.
//!
//! Workers are organised into teams and projects and collaborate on tasks
//! with priorities, deadlines, tags and comments. Every task mutation leaves
//! an append-only activity row and notifies the workers it concerns, in the
//! same atomic write as the mutation itself.
//!
//! # Architecture
//!
//! Teamboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//! - **Services**: Orchestration over the ports with an injected clock
//!
//! # Modules
//!
//! - [`worker`]: Accounts, positions and access identity
//! - [`organisation`]: Projects, teams, tags and task types
//! - [`task`]: Tasks, comments, activity log, notifications and the
//!   mutation hooks tying them together
//! - [`persistence`]: The stores backing every repository port
//! - [`web`]: Server-rendered HTTP interface and JSON endpoints
//! - [`config`] and [`telemetry`]: Process set-up

pub mod config;
pub(crate) mod identifier;
pub mod organisation;
pub mod persistence;
pub mod task;
pub mod telemetry;
pub mod web;
pub mod worker;

#[cfg(test)]
mod test_support;
