//! Schema setup for the todo table.

use super::store::map_diesel_error;
use crate::todo::ports::TodoStoreResult;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;

/// DDL creating the todo table when it does not exist.
pub const CREATE_TODO_TABLE_SQL: &str =
    include_str!("../../../../migrations/2026-10-01-000000_create_todo/up.sql");

/// Creates the todo table on `connection` if it is missing.
///
/// # Errors
///
/// Returns the mapped store error when the DDL fails.
pub fn apply_schema(connection: &mut PgConnection) -> TodoStoreResult<()> {
    connection
        .batch_execute(CREATE_TODO_TABLE_SQL)
        .map_err(map_diesel_error)
}
