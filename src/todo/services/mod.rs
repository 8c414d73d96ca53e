//! Application services for todo orchestration.

mod todos;

pub use todos::{TodoService, TodoServiceError, TodoServiceResult};
