//! Port contracts for todo persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by the repository and
//! service.

pub mod store;

#[cfg(test)]
pub use store::MockTodoSession;
pub use store::{TodoSession, TodoStore, TodoStoreError, TodoStoreResult, TransactionState};
