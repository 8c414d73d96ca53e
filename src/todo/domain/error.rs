//! Error types for todo domain validation.

use thiserror::Error;

/// Errors returned while constructing domain todo values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TodoDomainError {
    /// The todo text is empty.
    #[error("todo text must not be empty")]
    EmptyText,

    /// The todo text exceeds the persisted column width.
    #[error("todo text has {length} characters, exceeds limit of {max}")]
    TextTooLong {
        /// Number of characters supplied.
        length: usize,
        /// Maximum number of characters accepted.
        max: usize,
    },

    /// An id selection was built from an empty list.
    #[error("at least one todo id is required")]
    EmptyIdSelection,
}
