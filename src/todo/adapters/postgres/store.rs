//! `PostgreSQL` implementation of the todo store port.

use super::{
    models::{NewTodoRow, TodoRow, row_to_todo},
    schema::todo,
};
use crate::config::{DatabaseSettings, PoolSettings};
use crate::todo::{
    domain::{Todo, TodoId, TodoText},
    ports::{TodoSession, TodoStore, TodoStoreError, TodoStoreResult, TransactionState},
};
use async_trait::async_trait;
use diesel::connection::{AnsiTransactionManager, TransactionManager};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::info;

/// `PostgreSQL` connection pool type used by the todo adapter.
pub type TodoPgPool = Pool<ConnectionManager<PgConnection>>;

type PooledConn = PooledConnection<ConnectionManager<PgConnection>>;

/// Builds a connection pool from explicit settings.
///
/// # Errors
///
/// Returns [`TodoStoreError::Unavailable`] when the settings do not form a
/// connection URL or the pool cannot establish its initial connections.
pub fn build_pool(
    settings: &DatabaseSettings,
    pool_settings: &PoolSettings,
) -> TodoStoreResult<TodoPgPool> {
    info!(
        host = %settings.host,
        port = settings.port,
        database = %settings.name,
        max_size = pool_settings.max_size,
        "building todo connection pool"
    );
    let url = settings
        .database_url()
        .map_err(|err| TodoStoreError::unavailable(err.to_string()))?;
    let manager = ConnectionManager::<PgConnection>::new(url);
    Pool::builder()
        .max_size(pool_settings.max_size)
        .max_lifetime(Some(pool_settings.max_lifetime))
        .test_on_check_out(pool_settings.test_on_check_out)
        .build(manager)
        .map_err(|err| TodoStoreError::unavailable(err.to_string()))
}

/// `PostgreSQL`-backed todo store.
///
/// Each session checks one connection out of the pool and keeps it for the
/// whole transaction. Blocking Diesel calls run on
/// [`tokio::task::spawn_blocking`].
#[derive(Debug, Clone)]
pub struct PostgresTodoStore {
    pool: TodoPgPool,
}

impl PostgresTodoStore {
    /// Creates a store from an existing connection pool.
    #[must_use]
    pub const fn new(pool: TodoPgPool) -> Self {
        Self { pool }
    }

    /// Builds a pool from settings and wraps it in a store.
    ///
    /// # Errors
    ///
    /// Returns [`TodoStoreError::Unavailable`] when the pool cannot be built.
    pub fn connect(
        settings: &DatabaseSettings,
        pool_settings: &PoolSettings,
    ) -> TodoStoreResult<Self> {
        build_pool(settings, pool_settings).map(Self::new)
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &TodoPgPool {
        &self.pool
    }
}

#[async_trait]
impl TodoStore for PostgresTodoStore {
    type Session = PostgresTodoSession;

    async fn begin(&self) -> TodoStoreResult<Self::Session> {
        let pool = self.pool.clone();
        let connection = tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(|err| TodoStoreError::unavailable(err.to_string()))?;
            AnsiTransactionManager::begin_transaction(&mut *connection)
                .map_err(map_diesel_error)?;
            Ok::<_, TodoStoreError>(connection)
        })
        .await
        .map_err(join_error)??;

        Ok(PostgresTodoSession {
            connection: Some(connection),
            state: TransactionState::Open,
        })
    }
}

/// One transaction on a pooled `PostgreSQL` connection.
///
/// Dropping an open session returns a connection that still carries a
/// transaction; the pool discards such connections instead of reusing them,
/// so nothing staged here is ever committed implicitly.
pub struct PostgresTodoSession {
    connection: Option<PooledConn>,
    state: TransactionState,
}

impl std::fmt::Debug for PostgresTodoSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresTodoSession")
            .field("has_connection", &self.connection.is_some())
            .field("state", &self.state)
            .finish()
    }
}

impl PostgresTodoSession {
    /// Returns the session's transaction state.
    #[must_use]
    pub const fn state(&self) -> TransactionState {
        self.state
    }

    /// Runs `f` on the session connection inside a blocking task and takes
    /// the connection back afterwards.
    async fn run<F, T>(&mut self, f: F) -> TodoStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TodoStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.state.ensure_open()?;
        let mut connection = self
            .connection
            .take()
            .ok_or_else(|| TodoStoreError::unavailable("session connection was lost"))?;
        let (returned, result) = tokio::task::spawn_blocking(move || {
            let result = f(&mut connection);
            (connection, result)
        })
        .await
        .map_err(join_error)?;
        self.connection = Some(returned);
        result
    }
}

#[async_trait]
impl TodoSession for PostgresTodoSession {
    async fn insert(&mut self, text: &TodoText) -> TodoStoreResult<TodoId> {
        let new_row = NewTodoRow::from_text(text);
        self.run(move |connection| {
            diesel::insert_into(todo::table)
                .values(&new_row)
                .returning(todo::id)
                .get_result::<i64>(connection)
                .map(TodoId::new)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn get(&mut self, id: TodoId) -> TodoStoreResult<Option<Todo>> {
        self.run(move |connection| {
            let row = todo::table
                .filter(todo::id.eq(id.value()))
                .select(TodoRow::as_select())
                .first::<TodoRow>(connection)
                .optional()
                .map_err(map_diesel_error)?;
            row.map(row_to_todo).transpose()
        })
        .await
    }

    async fn scan_desc(&mut self) -> TodoStoreResult<Vec<Todo>> {
        self.run(|connection| {
            let rows = todo::table
                .order(todo::id.desc())
                .select(TodoRow::as_select())
                .load::<TodoRow>(connection)
                .map_err(map_diesel_error)?;
            rows.into_iter().map(row_to_todo).collect()
        })
        .await
    }

    async fn existing_ids(&mut self, ids: &[TodoId]) -> TodoStoreResult<Vec<TodoId>> {
        let raw_ids = raw_ids(ids);
        self.run(move |connection| {
            let found = todo::table
                .filter(todo::id.eq_any(raw_ids))
                .select(todo::id)
                .load::<i64>(connection)
                .map_err(map_diesel_error)?;
            Ok(found.into_iter().map(TodoId::new).collect())
        })
        .await
    }

    async fn delete_ids(&mut self, ids: &[TodoId]) -> TodoStoreResult<Vec<TodoId>> {
        let raw_ids = raw_ids(ids);
        self.run(move |connection| {
            let removed = diesel::delete(todo::table.filter(todo::id.eq_any(raw_ids)))
                .returning(todo::id)
                .get_results::<i64>(connection)
                .map_err(map_diesel_error)?;
            Ok(removed.into_iter().map(TodoId::new).collect())
        })
        .await
    }

    async fn commit(&mut self) -> TodoStoreResult<()> {
        self.run(|connection| {
            AnsiTransactionManager::commit_transaction(connection).map_err(map_diesel_error)
        })
        .await?;
        self.state = TransactionState::Committed;
        self.connection = None;
        Ok(())
    }

    async fn rollback(&mut self) -> TodoStoreResult<()> {
        self.state.ensure_open()?;
        let outcome = if self.connection.is_some() {
            self.run(|connection| {
                match AnsiTransactionManager::rollback_transaction(connection) {
                    // A failed COMMIT already rolled the transaction back.
                    Ok(()) | Err(DieselError::NotInTransaction) => Ok(()),
                    Err(err) => Err(map_diesel_error(err)),
                }
            })
            .await
        } else {
            Err(TodoStoreError::unavailable(
                "session connection was lost before rollback",
            ))
        };
        self.state = TransactionState::RolledBack;
        self.connection = None;
        outcome
    }
}

fn raw_ids(ids: &[TodoId]) -> Vec<i64> {
    ids.iter().map(|id| id.value()).collect()
}

fn join_error(err: tokio::task::JoinError) -> TodoStoreError {
    TodoStoreError::unavailable(format!("blocking task failed: {err}"))
}

/// Classifies Diesel errors into store error kinds.
pub(super) fn map_diesel_error(err: DieselError) -> TodoStoreError {
    match err {
        DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation
            | DatabaseErrorKind::ForeignKeyViolation
            | DatabaseErrorKind::NotNullViolation
            | DatabaseErrorKind::CheckViolation,
            info,
        ) => TodoStoreError::constraint_violation(
            info.constraint_name().map(str::to_owned),
            info.message(),
        ),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            TodoStoreError::unavailable(info.message())
        }
        DieselError::BrokenTransactionManager => {
            TodoStoreError::unavailable("transaction manager is broken")
        }
        other => TodoStoreError::persistence(other),
    }
}
