//! Shared helpers for `PostgreSQL` integration tests.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use std::sync::Arc;
use todo_service::todo::adapters::postgres::{PostgresTodoStore, apply_schema};
use todo_service::todo::services::TodoService;
use uuid::Uuid;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Environment variable naming the admin connection URL.
pub const DATABASE_URL_VAR: &str = "TODO_TEST_DATABASE_URL";

/// Database created for a single test and dropped afterwards.
pub struct TemporaryDatabase {
    admin_url: String,
    name: String,
    url: String,
}

impl TemporaryDatabase {
    /// Creates a uniquely named database on the admin server.
    ///
    /// # Errors
    ///
    /// Returns an error when the admin connection or `CREATE DATABASE` fails.
    pub fn create(admin_url: &str) -> Result<Self, BoxError> {
        let name = format!("todo_test_{}", Uuid::new_v4().simple());
        let mut admin = PgConnection::establish(admin_url)?;
        admin.batch_execute(&format!("CREATE DATABASE \"{name}\""))?;
        let url = with_database(admin_url, &name)?;
        Ok(Self {
            admin_url: admin_url.to_owned(),
            name,
            url,
        })
    }

    /// Returns the connection URL of the temporary database.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for TemporaryDatabase {
    fn drop(&mut self) {
        if let Ok(mut admin) = PgConnection::establish(&self.admin_url) {
            let sql = format!("DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)", self.name);
            // Leftover databases are named todo_test_* and safe to remove by hand.
            drop(admin.batch_execute(&sql));
        }
    }
}

fn with_database(admin_url: &str, database: &str) -> Result<String, BoxError> {
    let without_query = admin_url.split('?').next().unwrap_or(admin_url);
    let (server, _) = without_query
        .rsplit_once('/')
        .ok_or_else(|| format!("cannot locate database name in {DATABASE_URL_VAR}"))?;
    Ok(format!("{server}/{database}"))
}

/// Store wired to a migrated temporary database.
///
/// `store` is declared first so the pool closes before the database drops.
pub struct PreparedStore {
    pub store: PostgresTodoStore,
    pub temp_db: TemporaryDatabase,
}

impl PreparedStore {
    /// Returns a service over a shared handle to the store.
    #[must_use]
    pub fn service(&self) -> TodoService<PostgresTodoStore> {
        TodoService::new(Arc::new(self.store.clone()))
    }
}

/// Creates a migrated temporary database and a store over it.
///
/// Returns `Ok(None)` when `TODO_TEST_DATABASE_URL` is unset.
///
/// # Errors
///
/// Returns an error if database creation, migration or pool setup fails.
pub fn prepared_store() -> Result<Option<PreparedStore>, BoxError> {
    let Ok(admin_url) = std::env::var(DATABASE_URL_VAR) else {
        return Ok(None);
    };
    let temp_db = TemporaryDatabase::create(&admin_url)?;
    let mut connection = PgConnection::establish(temp_db.url())?;
    apply_schema(&mut connection)?;

    let manager = ConnectionManager::<PgConnection>::new(temp_db.url());
    let pool = Pool::builder().max_size(4).build(manager)?;
    Ok(Some(PreparedStore {
        store: PostgresTodoStore::new(pool),
        temp_db,
    }))
}

#[cfg(test)]
mod tests {
    use super::with_database;

    #[test]
    fn with_database_swaps_path_and_drops_query() {
        let url = with_database("postgres://u:p@localhost:5432/postgres?sslmode=disable", "t1")
            .expect("url has a path");
        assert_eq!(url, "postgres://u:p@localhost:5432/t1");
    }
}
