//! Record store port: session factory and transactional session primitives.
//!
//! A [`TodoSession`] is one open transaction. Every primitive runs inside it
//! and nothing it stages is visible to other sessions until
//! [`TodoSession::commit`] succeeds.

use crate::todo::domain::{Todo, TodoId, TodoText};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for record store operations.
pub type TodoStoreResult<T> = Result<T, TodoStoreError>;

/// Opens transactional sessions against the record store.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Session type handed out by this store.
    type Session: TodoSession;

    /// Opens a session with a fresh transaction.
    ///
    /// # Errors
    ///
    /// Returns [`TodoStoreError::Unavailable`] when no connection can be
    /// obtained.
    async fn begin(&self) -> TodoStoreResult<Self::Session>;
}

/// Store primitives available inside one transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoSession: Send {
    /// Stages an insert of a not-done record and returns its assigned id.
    async fn insert(&mut self, text: &TodoText) -> TodoStoreResult<TodoId>;

    /// Looks up a record by id. Returns `None` when it does not exist.
    async fn get(&mut self, id: TodoId) -> TodoStoreResult<Option<Todo>>;

    /// Returns every visible record ordered by id, highest first.
    async fn scan_desc(&mut self) -> TodoStoreResult<Vec<Todo>>;

    /// Returns the subset of `ids` that currently exist, in no particular
    /// order.
    async fn existing_ids(&mut self, ids: &[TodoId]) -> TodoStoreResult<Vec<TodoId>>;

    /// Deletes the given ids and returns those this session actually
    /// removed. An id already removed by another transaction is left out.
    async fn delete_ids(&mut self, ids: &[TodoId]) -> TodoStoreResult<Vec<TodoId>>;

    /// Makes staged changes durable and ends the transaction.
    async fn commit(&mut self) -> TodoStoreResult<()>;

    /// Discards staged changes and ends the transaction.
    async fn rollback(&mut self) -> TodoStoreResult<()>;
}

/// Lifecycle of a session's transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Accepting operations.
    Open,
    /// Committed; terminal.
    Committed,
    /// Rolled back; terminal.
    RolledBack,
}

impl TransactionState {
    /// Returns `true` once the transaction can accept no further operations.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        !matches!(self, Self::Open)
    }

    /// Returns a stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
        }
    }

    /// Fails with [`TodoStoreError::SessionFinished`] unless the transaction
    /// is still open.
    ///
    /// # Errors
    ///
    /// Returns [`TodoStoreError::SessionFinished`] for terminal states.
    pub const fn ensure_open(self) -> TodoStoreResult<()> {
        if self.is_finished() {
            return Err(TodoStoreError::SessionFinished(self));
        }
        Ok(())
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by record store implementations.
#[derive(Debug, Clone, Error)]
pub enum TodoStoreError {
    /// A store integrity rule rejected the change.
    #[error("constraint violation{}: {message}", constraint_suffix(.constraint.as_deref()))]
    ConstraintViolation {
        /// Name of the violated constraint, when the store reports it.
        constraint: Option<String>,
        /// Store-provided description.
        message: String,
    },

    /// The store could not be reached or the connection was lost.
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// The session has already been committed or rolled back.
    #[error("session already {0}")]
    SessionFinished(TransactionState),

    /// Any other persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

fn constraint_suffix(constraint: Option<&str>) -> String {
    constraint.map(|name| format!(" on {name}")).unwrap_or_default()
}

impl TodoStoreError {
    /// Creates a constraint violation error.
    #[must_use]
    pub fn constraint_violation(constraint: Option<String>, message: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            constraint,
            message: message.into(),
        }
    }

    /// Creates an unavailability error.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
