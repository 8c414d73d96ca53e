//! Identifier types for the todo domain.

use super::TodoDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned surrogate key of a todo record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(i64);

impl TodoId {
    /// Wraps a raw identifier value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for TodoId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-empty list of todo ids targeted by a bulk operation.
///
/// The list keeps caller order and may contain duplicates; collapsing them is
/// left to the service that consumes the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoIdSelection(Vec<TodoId>);

impl TodoIdSelection {
    /// Creates a validated selection.
    ///
    /// # Errors
    ///
    /// Returns [`TodoDomainError::EmptyIdSelection`] when `ids` is empty.
    pub fn new(ids: impl IntoIterator<Item = TodoId>) -> Result<Self, TodoDomainError> {
        let collected: Vec<TodoId> = ids.into_iter().collect();
        if collected.is_empty() {
            return Err(TodoDomainError::EmptyIdSelection);
        }
        Ok(Self(collected))
    }

    /// Returns the ids in caller order.
    #[must_use]
    pub const fn as_slice(&self) -> &[TodoId] {
        self.0.as_slice()
    }

    /// Returns the number of ids, duplicates included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the selection holds no ids, which validation rules
    /// out.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
