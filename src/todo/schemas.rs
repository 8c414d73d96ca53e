//! Transfer schemas exchanged with the boundary layer.
//!
//! Input schemas deserialise raw request bodies and must be validated into
//! domain values before a service sees them. Output schemas are built only
//! from domain values, so their invariants hold by construction.

use crate::todo::domain::{Todo, TodoDomainError, TodoId, TodoIdSelection, TodoText};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while validating inbound schemas.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The `text` field is invalid.
    #[error("invalid text: {0}")]
    Text(#[source] TodoDomainError),

    /// The `ids` field is invalid.
    #[error("invalid ids: {0}")]
    Ids(#[source] TodoDomainError),
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    /// Text of the new todo.
    pub text: String,
}

impl CreateTodoRequest {
    /// Creates a request from raw text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Validates the request into todo text.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Text`] when the text is empty or longer
    /// than [`TodoText::MAX_CHARS`] characters.
    pub fn validate(self) -> Result<TodoText, ValidationError> {
        TodoText::new(self.text).map_err(ValidationError::Text)
    }
}

/// Body of a bulk delete request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTodosRequest {
    /// Ids to delete; may repeat.
    pub ids: Vec<TodoId>,
}

impl DeleteTodosRequest {
    /// Creates a request from raw ids.
    #[must_use]
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: ids.into_iter().map(TodoId::new).collect(),
        }
    }

    /// Validates the request into a non-empty id selection.
    ///
    /// Duplicates are kept; the service collapses them.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Ids`] when no ids were supplied.
    pub fn validate(self) -> Result<TodoIdSelection, ValidationError> {
        TodoIdSelection::new(self.ids).map_err(ValidationError::Ids)
    }
}

/// Output representation of a todo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoView {
    /// Record identifier.
    pub id: TodoId,
    /// Record text.
    pub text: String,
    /// Completion flag.
    pub done: bool,
    /// Creation timestamp, serialised as `createdAt`.
    pub created_at: DateTime<Utc>,
}

impl From<&Todo> for TodoView {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id(),
            text: todo.text().as_str().to_owned(),
            done: todo.done(),
            created_at: todo.created_at(),
        }
    }
}

impl From<Todo> for TodoView {
    fn from(todo: Todo) -> Self {
        Self::from(&todo)
    }
}

/// Output of a bulk delete: the ids removed and how many there were.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
    deleted: Vec<TodoId>,
    count: usize,
}

impl DeleteResult {
    /// Builds a result from the ids actually deleted.
    #[must_use]
    pub const fn new(deleted: Vec<TodoId>) -> Self {
        let count = deleted.len();
        Self { deleted, count }
    }

    /// Returns the deleted ids in request order.
    #[must_use]
    pub const fn deleted(&self) -> &[TodoId] {
        self.deleted.as_slice()
    }

    /// Returns the number of deleted ids.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }
}

impl From<Vec<TodoId>> for DeleteResult {
    fn from(deleted: Vec<TodoId>) -> Self {
        Self::new(deleted)
    }
}
