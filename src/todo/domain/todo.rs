//! Todo record and its staged form.

use super::{TodoId, TodoText};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted todo record.
///
/// Every field is assigned by the store or fixed at creation; no operation
/// mutates a record after it is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    id: TodoId,
    text: TodoText,
    done: bool,
    created_at: DateTime<Utc>,
}

/// Field values used to rebuild a [`Todo`] from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTodoData {
    /// Store-assigned identifier.
    pub id: TodoId,
    /// Record text.
    pub text: TodoText,
    /// Completion flag.
    pub done: bool,
    /// Store-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Reconstructs a record from persisted field values.
    #[must_use]
    pub fn from_persisted(data: PersistedTodoData) -> Self {
        Self {
            id: data.id,
            text: data.text,
            done: data.done,
            created_at: data.created_at,
        }
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> TodoId {
        self.id
    }

    /// Returns the record text.
    #[must_use]
    pub const fn text(&self) -> &TodoText {
        &self.text
    }

    /// Returns whether the record is marked done.
    #[must_use]
    pub const fn done(&self) -> bool {
        self.done
    }

    /// Returns the store-assigned creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A record staged for insertion whose transaction has not committed yet.
///
/// The store has handed out `id`; `createdAt` is only read back once the
/// insert is durable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTodo {
    id: TodoId,
    text: TodoText,
    done: bool,
}

impl PendingTodo {
    /// Creates a staged record. New records always start not done.
    #[must_use]
    pub const fn new(id: TodoId, text: TodoText) -> Self {
        Self {
            id,
            text,
            done: false,
        }
    }

    /// Returns the store-assigned identifier.
    #[must_use]
    pub const fn id(&self) -> TodoId {
        self.id
    }

    /// Returns the staged text.
    #[must_use]
    pub const fn text(&self) -> &TodoText {
        &self.text
    }

    /// Returns the staged completion flag.
    #[must_use]
    pub const fn done(&self) -> bool {
        self.done
    }
}
