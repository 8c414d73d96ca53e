//! Domain model for the todo list.
//!
//! Domain values are validated on construction, so a [`TodoText`] or
//! [`TodoIdSelection`] that exists is already acceptable to the service.

mod error;
mod ids;
mod text;
mod todo;

pub use error::TodoDomainError;
pub use ids::{TodoId, TodoIdSelection};
pub use text::TodoText;
pub use todo::{PendingTodo, PersistedTodoData, Todo};
