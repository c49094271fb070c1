//! Unit tests for the task context.

mod hook_tests;
