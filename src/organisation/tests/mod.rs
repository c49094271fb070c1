//! Unit tests for the organisation context.

mod domain_tests;
mod service_tests;
