//! `PostgreSQL` adapter for todo persistence.

mod migrations;
mod models;
mod schema;
mod store;

pub use migrations::{CREATE_TODO_TABLE_SQL, apply_schema};
pub use store::{PostgresTodoSession, PostgresTodoStore, TodoPgPool, build_pool};
