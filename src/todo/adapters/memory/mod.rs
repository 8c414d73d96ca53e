//! In-memory adapter implementations for testing.
//!
//! The store keeps committed rows behind a mutex and applies each session's
//! staged changes atomically at commit.

mod store;

pub use store::{InMemoryTodoSession, InMemoryTodoStore, StoreOperation};
