//! Validated todo text.

use super::TodoDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Todo text holding between 1 and [`TodoText::MAX_CHARS`] characters.
///
/// Length is counted in Unicode scalar values, not bytes. Whitespace is kept
/// as supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TodoText(String);

impl TodoText {
    /// Width of the persisted `task` column.
    pub const MAX_CHARS: usize = 255;

    /// Creates validated todo text.
    ///
    /// # Errors
    ///
    /// Returns [`TodoDomainError::EmptyText`] for an empty string and
    /// [`TodoDomainError::TextTooLong`] above [`Self::MAX_CHARS`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TodoDomainError> {
        let raw = value.into();
        if raw.is_empty() {
            return Err(TodoDomainError::EmptyText);
        }
        let length = raw.chars().count();
        if length > Self::MAX_CHARS {
            return Err(TodoDomainError::TextTooLong {
                length,
                max: Self::MAX_CHARS,
            });
        }
        Ok(Self(raw))
    }

    /// Returns the text as `str`.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Consumes the value, returning the owned string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for TodoText {
    type Error = TodoDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TodoText> for String {
    fn from(value: TodoText) -> Self {
        value.0
    }
}

impl AsRef<str> for TodoText {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TodoText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
