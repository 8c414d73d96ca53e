//! Service layer owning todo transaction boundaries.

use crate::todo::{
    domain::{TodoId, TodoIdSelection, TodoText},
    ports::{TodoSession, TodoStore, TodoStoreError, TodoStoreResult},
    repository::TodoRepository,
    schemas::TodoView,
};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

/// Service-level errors for todo operations.
#[derive(Debug, Error)]
pub enum TodoServiceError {
    /// A store integrity rule rejected the change; nothing was persisted.
    #[error("rejected by store constraint: {0}")]
    ConstraintViolation(#[source] TodoStoreError),

    /// The record store could not be reached.
    #[error("record store unavailable: {0}")]
    StoreUnavailable(#[source] TodoStoreError),

    /// A committed record could not be read back.
    #[error("todo {0} not found after commit")]
    NotFound(TodoId),

    /// Any other store failure.
    #[error(transparent)]
    Store(TodoStoreError),
}

impl From<TodoStoreError> for TodoServiceError {
    fn from(err: TodoStoreError) -> Self {
        match err {
            TodoStoreError::ConstraintViolation { .. } => Self::ConstraintViolation(err),
            TodoStoreError::Unavailable(_) => Self::StoreUnavailable(err),
            TodoStoreError::SessionFinished(_) | TodoStoreError::Persistence(_) => {
                Self::Store(err)
            }
        }
    }
}

/// Result type for todo service operations.
pub type TodoServiceResult<T> = Result<T, TodoServiceError>;

/// Todo orchestration service.
///
/// Each method opens its own session and ends it before returning, by commit
/// on success and by rollback on every failure path.
pub struct TodoService<S>
where
    S: TodoStore,
{
    store: Arc<S>,
    repository: TodoRepository,
}

impl<S> Clone for TodoService<S>
where
    S: TodoStore,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            repository: self.repository,
        }
    }
}

impl<S> TodoService<S>
where
    S: TodoStore,
{
    /// Creates a new todo service over the given store.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self {
            store,
            repository: TodoRepository::new(),
        }
    }

    /// Creates a todo and returns it as persisted.
    ///
    /// # Errors
    ///
    /// Returns [`TodoServiceError::ConstraintViolation`] when the store
    /// rejects the insert, [`TodoServiceError::StoreUnavailable`] when the
    /// store cannot be reached, and [`TodoServiceError::NotFound`] when the
    /// record disappears between commit and read-back.
    #[instrument(skip_all)]
    pub async fn create(&self, text: TodoText) -> TodoServiceResult<TodoView> {
        let mut session = self.store.begin().await?;
        let staged = self.repository.add(&mut session, text).await;
        let pending = finish_write(&mut session, staged).await?;
        debug!(todo_id = %pending.id(), "todo created");

        let mut reader = self.store.begin().await?;
        let fetched = self.repository.get_by_id(&mut reader, pending.id()).await;
        let persisted = release_read(&mut reader, fetched).await?;
        persisted
            .map(TodoView::from)
            .ok_or(TodoServiceError::NotFound(pending.id()))
    }

    /// Lists every todo, highest id first.
    ///
    /// # Errors
    ///
    /// Returns [`TodoServiceError::StoreUnavailable`] when the store cannot
    /// be reached.
    #[instrument(skip_all)]
    pub async fn list(&self) -> TodoServiceResult<Vec<TodoView>> {
        let mut session = self.store.begin().await?;
        let scanned = self.repository.list_desc(&mut session).await;
        let todos = release_read(&mut session, scanned).await?;
        Ok(todos.iter().map(TodoView::from).collect())
    }

    /// Deletes the selected todos that exist and returns their ids.
    ///
    /// Repeated ids collapse to their first occurrence and ids with no
    /// record are skipped. Either every returned id is deleted or none is.
    ///
    /// # Errors
    ///
    /// Returns the store failure after rolling the whole delete back.
    #[instrument(skip_all, fields(requested = selection.len()))]
    pub async fn delete(&self, selection: &TodoIdSelection) -> TodoServiceResult<Vec<TodoId>> {
        let ids = dedup_preserving_order(selection.as_slice());
        let mut session = self.store.begin().await?;
        let outcome = self.repository.delete_by_ids(&mut session, &ids).await;
        let deleted = finish_write(&mut session, outcome).await?;
        debug!(deleted = deleted.len(), "bulk delete committed");
        Ok(deleted)
    }
}

fn dedup_preserving_order(ids: &[TodoId]) -> Vec<TodoId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Commits when `outcome` succeeded; rolls back otherwise or if the commit
/// itself fails.
async fn finish_write<T, Sess>(session: &mut Sess, outcome: TodoStoreResult<T>) -> TodoServiceResult<T>
where
    Sess: TodoSession + ?Sized,
{
    let value = match outcome {
        Ok(value) => value,
        Err(cause) => return Err(abort(session, cause).await),
    };
    match session.commit().await {
        Ok(()) => Ok(value),
        Err(cause) => Err(abort(session, cause).await),
    }
}

/// Ends a read-only session. Reads never commit.
async fn release_read<T, Sess>(session: &mut Sess, outcome: TodoStoreResult<T>) -> TodoServiceResult<T>
where
    Sess: TodoSession + ?Sized,
{
    let value = match outcome {
        Ok(value) => value,
        Err(cause) => return Err(abort(session, cause).await),
    };
    session.rollback().await?;
    Ok(value)
}

async fn abort<Sess>(session: &mut Sess, cause: TodoStoreError) -> TodoServiceError
where
    Sess: TodoSession + ?Sized,
{
    warn!(error = %cause, "rolling back todo transaction");
    if let Err(rollback_err) = session.rollback().await {
        error!(error = %rollback_err, cause = %cause, "rollback failed");
    }
    TodoServiceError::from(cause)
}
