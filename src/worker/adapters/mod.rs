//! Storage adapters implementing the worker ports.

mod memory;
mod postgres;
