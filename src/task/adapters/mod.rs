//! Store implementations of the task ports.

mod memory;
mod postgres;
