//! Repository translating todo operations into store session primitives.
//!
//! The repository is stateless and never decides a transaction's outcome:
//! every method borrows the caller's session, and store errors propagate
//! unchanged.

use crate::todo::{
    domain::{PendingTodo, Todo, TodoId, TodoText},
    ports::{TodoSession, TodoStoreResult},
};
use std::collections::HashSet;

/// Stateless data-access translator for todo records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TodoRepository;

impl TodoRepository {
    /// Creates a repository.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Stages a new not-done record for insertion.
    ///
    /// # Errors
    ///
    /// Propagates any store error raised while staging the insert.
    pub async fn add<S>(&self, session: &mut S, text: TodoText) -> TodoStoreResult<PendingTodo>
    where
        S: TodoSession + ?Sized,
    {
        let id = session.insert(&text).await?;
        Ok(PendingTodo::new(id, text))
    }

    /// Looks up a record by id; `None` when absent.
    ///
    /// # Errors
    ///
    /// Propagates any store error raised by the lookup.
    pub async fn get_by_id<S>(&self, session: &mut S, id: TodoId) -> TodoStoreResult<Option<Todo>>
    where
        S: TodoSession + ?Sized,
    {
        session.get(id).await
    }

    /// Returns every record, newest id first.
    ///
    /// # Errors
    ///
    /// Propagates any store error raised by the scan.
    pub async fn list_desc<S>(&self, session: &mut S) -> TodoStoreResult<Vec<Todo>>
    where
        S: TodoSession + ?Sized,
    {
        session.scan_desc().await
    }

    /// Deletes the ids that exist and returns the ones actually removed, in
    /// the order supplied.
    ///
    /// When none of `ids` exists no delete is issued. An id that passed the
    /// existence check but was removed by a concurrent transaction before the
    /// delete ran is not reported.
    ///
    /// # Errors
    ///
    /// Propagates any store error raised by the existence check or delete.
    pub async fn delete_by_ids<S>(
        &self,
        session: &mut S,
        ids: &[TodoId],
    ) -> TodoStoreResult<Vec<TodoId>>
    where
        S: TodoSession + ?Sized,
    {
        let found: HashSet<TodoId> = session.existing_ids(ids).await?.into_iter().collect();
        let mut seen = HashSet::with_capacity(found.len());
        let existing: Vec<TodoId> = ids
            .iter()
            .copied()
            .filter(|id| found.contains(id) && seen.insert(*id))
            .collect();
        if existing.is_empty() {
            return Ok(existing);
        }

        let removed: HashSet<TodoId> = session.delete_ids(&existing).await?.into_iter().collect();
        Ok(existing
            .into_iter()
            .filter(|id| removed.contains(id))
            .collect())
    }
}
