//! In-memory store integration tests.
//!
//! Tests are organized into modules by functionality:
//! - `cascade_tests`: What deleting projects, tags and tasks leaves behind
//! - `search_tests`: Combined task filters across contexts

mod in_memory {
    pub mod helpers;

    mod cascade_tests;
    mod search_tests;
}
