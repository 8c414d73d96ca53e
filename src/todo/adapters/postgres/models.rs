//! Diesel row models and the record/row mapping for todo persistence.
//!
//! Field names here follow the domain; column names are bound through
//! `column_name` attributes and the schema.

use super::schema::todo;
use crate::todo::{
    domain::{PersistedTodoData, Todo, TodoId, TodoText},
    ports::{TodoStoreError, TodoStoreResult},
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for todo records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = todo)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TodoRow {
    /// Store-assigned identifier.
    pub id: i64,
    /// Todo text, stored in the `task` column.
    #[diesel(column_name = task)]
    pub text: String,
    /// Completion flag.
    pub done: bool,
    /// Creation timestamp, stored in the `"createdAt"` column.
    pub created_at: DateTime<Utc>,
}

/// Insert model for todo records. `id` and `createdAt` come from column
/// defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = todo)]
pub struct NewTodoRow {
    /// Todo text, stored in the `task` column.
    #[diesel(column_name = task)]
    pub text: String,
    /// Completion flag.
    pub done: bool,
}

impl NewTodoRow {
    /// Builds the insert row for a new, not-done todo.
    #[must_use]
    pub fn from_text(text: &TodoText) -> Self {
        Self {
            text: text.as_str().to_owned(),
            done: false,
        }
    }
}

/// Maps a persisted row back to a domain record.
///
/// # Errors
///
/// Returns [`TodoStoreError::Persistence`] when the stored text violates the
/// domain's length rules.
pub fn row_to_todo(row: TodoRow) -> TodoStoreResult<Todo> {
    let TodoRow {
        id,
        text: persisted_text,
        done,
        created_at,
    } = row;

    let text = TodoText::new(persisted_text).map_err(TodoStoreError::persistence)?;
    Ok(Todo::from_persisted(PersistedTodoData {
        id: TodoId::new(id),
        text,
        done,
        created_at,
    }))
}
