//! Storage adapters implementing the organisation ports.

mod memory;
mod postgres;
