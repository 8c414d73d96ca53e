//! Shared world state for bulk delete BDD scenarios.

use std::sync::Arc;

use rstest::fixture;
use todo_service::todo::{
    adapters::memory::InMemoryTodoStore,
    domain::TodoId,
    services::{TodoService, TodoServiceError},
};

/// Service type used by the BDD world.
pub type TestTodoService = TodoService<InMemoryTodoStore>;

/// Scenario world for bulk delete behaviour tests.
pub struct BulkDeleteWorld {
    pub store: InMemoryTodoStore,
    pub service: TestTodoService,
    pub last_delete_result: Option<Result<Vec<TodoId>, TodoServiceError>>,
}

impl BulkDeleteWorld {
    /// Creates a world over an empty store.
    #[must_use]
    pub fn new() -> Self {
        let store = InMemoryTodoStore::new();
        let service = TodoService::new(Arc::new(store.clone()));
        Self {
            store,
            service,
            last_delete_result: None,
        }
    }
}

impl Default for BulkDeleteWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BulkDeleteWorld {
    BulkDeleteWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Parses a comma-separated id list such as `5, 5, 5`.
pub fn parse_ids(raw: &str) -> Result<Vec<TodoId>, eyre::Report> {
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<i64>()
                .map(TodoId::new)
                .map_err(|err| eyre::eyre!("invalid id '{part}' in scenario: {err}"))
        })
        .collect()
}
