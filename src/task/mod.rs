//! Tasks, comments and the audit and notification trail they produce.
//!
//! Every write to the task aggregate is expressed as a
//! [`domain::TaskChangeSet`]: the primary write plus the activity rows and
//! notifications derived by [`services::MutationHooks`]. Repositories commit
//! a change set atomically, so task state and its side effects never
//! diverge.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
