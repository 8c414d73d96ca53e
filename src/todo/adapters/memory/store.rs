//! In-memory implementation of the todo store port.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};

use crate::todo::{
    domain::{PersistedTodoData, Todo, TodoId, TodoText},
    ports::{TodoSession, TodoStore, TodoStoreError, TodoStoreResult, TransactionState},
};

/// Store primitive that can be made to fail once for testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Opening a session.
    Begin,
    /// Staging an insert.
    Insert,
    /// Point lookup.
    Get,
    /// Ordered full scan.
    Scan,
    /// Filtered existence check.
    ExistenceCheck,
    /// Bulk delete.
    BulkDelete,
    /// Commit.
    Commit,
    /// Rollback.
    Rollback,
}

impl StoreOperation {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Begin => "begin",
            Self::Insert => "insert",
            Self::Get => "get",
            Self::Scan => "scan",
            Self::ExistenceCheck => "existence check",
            Self::BulkDelete => "bulk delete",
            Self::Commit => "commit",
            Self::Rollback => "rollback",
        }
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thread-safe in-memory todo store.
///
/// Ids come from a counter that never rewinds, so ids handed to rolled-back
/// inserts are never reused. A record staged for deletion is claimed by its
/// session until that session ends; other sessions cannot delete it in the
/// meantime. Suitable for tests only.
pub struct InMemoryTodoStore<C = DefaultClock>
where
    C: Clock + Send + Sync,
{
    state: Arc<Mutex<InMemoryTodoState>>,
    clock: Arc<C>,
}

#[derive(Debug, Default)]
struct InMemoryTodoState {
    rows: BTreeMap<TodoId, Todo>,
    last_id: i64,
    pending_faults: HashSet<StoreOperation>,
    delete_claims: HashMap<TodoId, u64>,
    last_session: u64,
    open_sessions: usize,
    abandoned_sessions: usize,
    bulk_deletes: usize,
}

impl<C> Clone for InMemoryTodoStore<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> fmt::Debug for InMemoryTodoStore<C>
where
    C: Clock + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryTodoStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl InMemoryTodoStore<DefaultClock> {
    /// Creates an empty store stamping records with the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(DefaultClock)
    }
}

impl Default for InMemoryTodoStore<DefaultClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> InMemoryTodoStore<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty store stamping records with the given clock.
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryTodoState::default())),
            clock: Arc::new(clock),
        }
    }

    /// Makes the next call of `operation` fail with
    /// [`TodoStoreError::Unavailable`].
    pub fn fail_next(&self, operation: StoreOperation) {
        if let Ok(mut state) = self.state.lock() {
            state.pending_faults.insert(operation);
        }
    }

    /// Returns the number of committed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().map(|state| state.rows.len()).unwrap_or(0)
    }

    /// Returns `true` when no records are committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of sessions neither committed nor rolled back.
    #[must_use]
    pub fn open_sessions(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.open_sessions)
            .unwrap_or(0)
    }

    /// Returns how many sessions were dropped without commit or rollback.
    #[must_use]
    pub fn abandoned_sessions(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.abandoned_sessions)
            .unwrap_or(0)
    }

    /// Returns how many bulk delete statements have been executed.
    #[must_use]
    pub fn bulk_deletes_executed(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.bulk_deletes)
            .unwrap_or(0)
    }

    fn lock(&self) -> TodoStoreResult<MutexGuard<'_, InMemoryTodoState>> {
        self.state
            .lock()
            .map_err(|err| TodoStoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

impl InMemoryTodoState {
    fn trip(&mut self, operation: StoreOperation) -> TodoStoreResult<()> {
        if self.pending_faults.remove(&operation) {
            return Err(TodoStoreError::unavailable(format!(
                "injected failure during {operation}"
            )));
        }
        Ok(())
    }

    fn is_claimed_by_other(&self, id: TodoId, session_id: u64) -> bool {
        self.delete_claims
            .get(&id)
            .is_some_and(|owner| *owner != session_id)
    }

    fn release(&mut self, session_id: u64) {
        self.delete_claims.retain(|_, owner| *owner != session_id);
        self.open_sessions = self.open_sessions.saturating_sub(1);
    }
}

#[async_trait]
impl<C> TodoStore for InMemoryTodoStore<C>
where
    C: Clock + Send + Sync + 'static,
{
    type Session = InMemoryTodoSession<C>;

    async fn begin(&self) -> TodoStoreResult<Self::Session> {
        let mut state = self.lock()?;
        state.trip(StoreOperation::Begin)?;
        state.open_sessions += 1;
        state.last_session += 1;
        let session_id = state.last_session;
        drop(state);
        Ok(InMemoryTodoSession {
            session_id,
            store: self.clone(),
            staged_inserts: BTreeMap::new(),
            staged_deletes: BTreeSet::new(),
            state: TransactionState::Open,
        })
    }
}

/// One transaction against an [`InMemoryTodoStore`].
///
/// Reads see committed rows overlaid with this session's staged changes.
pub struct InMemoryTodoSession<C = DefaultClock>
where
    C: Clock + Send + Sync,
{
    session_id: u64,
    store: InMemoryTodoStore<C>,
    staged_inserts: BTreeMap<TodoId, Todo>,
    staged_deletes: BTreeSet<TodoId>,
    state: TransactionState,
}

impl<C> fmt::Debug for InMemoryTodoSession<C>
where
    C: Clock + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryTodoSession")
            .field("session_id", &self.session_id)
            .field("staged_inserts", &self.staged_inserts)
            .field("staged_deletes", &self.staged_deletes)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<C> InMemoryTodoSession<C>
where
    C: Clock + Send + Sync,
{
    /// Returns the session's transaction state.
    #[must_use]
    pub const fn state(&self) -> TransactionState {
        self.state
    }

    fn visible(&self, committed: &BTreeMap<TodoId, Todo>, id: TodoId) -> Option<Todo> {
        if self.staged_deletes.contains(&id) {
            return None;
        }
        self.staged_inserts
            .get(&id)
            .or_else(|| committed.get(&id))
            .cloned()
    }

    fn finish(&mut self, state: &mut InMemoryTodoState, outcome: TransactionState) {
        self.staged_inserts.clear();
        self.staged_deletes.clear();
        self.state = outcome;
        state.release(self.session_id);
    }
}

impl<C> Drop for InMemoryTodoSession<C>
where
    C: Clock + Send + Sync,
{
    fn drop(&mut self) {
        if self.state.is_finished() {
            return;
        }
        if let Ok(mut state) = self.store.state.lock() {
            state.release(self.session_id);
            state.abandoned_sessions += 1;
        }
    }
}

#[async_trait]
impl<C> TodoSession for InMemoryTodoSession<C>
where
    C: Clock + Send + Sync + 'static,
{
    async fn insert(&mut self, text: &TodoText) -> TodoStoreResult<TodoId> {
        self.state.ensure_open()?;
        let mut state = self.store.lock()?;
        state.trip(StoreOperation::Insert)?;
        state.last_id += 1;
        let id = TodoId::new(state.last_id);
        drop(state);

        let todo = Todo::from_persisted(PersistedTodoData {
            id,
            text: text.clone(),
            done: false,
            created_at: self.store.clock.utc(),
        });
        self.staged_inserts.insert(id, todo);
        Ok(id)
    }

    async fn get(&mut self, id: TodoId) -> TodoStoreResult<Option<Todo>> {
        self.state.ensure_open()?;
        let mut state = self.store.lock()?;
        state.trip(StoreOperation::Get)?;
        Ok(self.visible(&state.rows, id))
    }

    async fn scan_desc(&mut self) -> TodoStoreResult<Vec<Todo>> {
        self.state.ensure_open()?;
        let mut state = self.store.lock()?;
        state.trip(StoreOperation::Scan)?;
        let ids: BTreeSet<TodoId> = state
            .rows
            .keys()
            .chain(self.staged_inserts.keys())
            .copied()
            .collect();
        Ok(ids
            .into_iter()
            .rev()
            .filter_map(|id| self.visible(&state.rows, id))
            .collect())
    }

    async fn existing_ids(&mut self, ids: &[TodoId]) -> TodoStoreResult<Vec<TodoId>> {
        self.state.ensure_open()?;
        let mut state = self.store.lock()?;
        state.trip(StoreOperation::ExistenceCheck)?;
        let found: BTreeSet<TodoId> = ids
            .iter()
            .copied()
            .filter(|id| self.visible(&state.rows, *id).is_some())
            .collect();
        Ok(found.into_iter().collect())
    }

    async fn delete_ids(&mut self, ids: &[TodoId]) -> TodoStoreResult<Vec<TodoId>> {
        self.state.ensure_open()?;
        let mut state = self.store.lock()?;
        state.trip(StoreOperation::BulkDelete)?;
        state.bulk_deletes += 1;
        let mut removed = Vec::with_capacity(ids.len());
        for id in ids {
            if self.visible(&state.rows, *id).is_none() {
                continue;
            }
            if self.staged_inserts.remove(id).is_some() {
                removed.push(*id);
                continue;
            }
            if state.is_claimed_by_other(*id, self.session_id) {
                continue;
            }
            state.delete_claims.insert(*id, self.session_id);
            self.staged_deletes.insert(*id);
            removed.push(*id);
        }
        Ok(removed)
    }

    async fn commit(&mut self) -> TodoStoreResult<()> {
        self.state.ensure_open()?;
        let store = self.store.clone();
        let mut state = store.lock()?;
        state.trip(StoreOperation::Commit)?;
        for id in &self.staged_deletes {
            state.rows.remove(id);
        }
        let inserts = std::mem::take(&mut self.staged_inserts);
        state.rows.extend(inserts);
        self.finish(&mut state, TransactionState::Committed);
        Ok(())
    }

    async fn rollback(&mut self) -> TodoStoreResult<()> {
        self.state.ensure_open()?;
        let store = self.store.clone();
        let mut state = store.lock()?;
        // The transaction is discarded even when the injected fault fires.
        let outcome = state.trip(StoreOperation::Rollback);
        self.finish(&mut state, TransactionState::RolledBack);
        outcome
    }
}
