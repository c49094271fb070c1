//! Unit tests for the worker context.

mod domain_tests;
mod service_tests;
