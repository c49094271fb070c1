//! Integration tests for [`PostgresStore`] using embedded `PostgreSQL`.
//!
//! Each test runs against its own database cloned from a migrated template.
//! Tests are organized into modules by functionality:
//! - `change_set_tests`: All-or-nothing writes
//! - `cascade_tests`: What deleting a task leaves behind
//! - `dashboard_tests`: Aggregate counts behind the dashboard
//! - `search_tests`: Pattern escaping and paged queries
//! - `notification_tests`: Badge counts and polling
//!
//! [`PostgresStore`]: teamboard::persistence::PostgresStore

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]
#![expect(
    clippy::indexing_slicing,
    reason = "Test code uses indexing after length checks"
)]
#![expect(
    clippy::print_stderr,
    reason = "Test cleanup warnings are informational"
)]

mod postgres {
    pub mod helpers;

    mod cascade_tests;
    mod change_set_tests;
    mod dashboard_tests;
    mod notification_tests;
    mod search_tests;
}
