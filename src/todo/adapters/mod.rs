//! Adapter implementations for the todo store port.

pub mod memory;
pub mod postgres;
