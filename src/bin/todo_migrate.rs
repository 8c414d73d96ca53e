//! Creates the todo table in the configured database.
//!
//! Usage:
//!
//! ```text
//! DB_HOST=127.0.0.1 DB_NAME=todo todo_migrate
//! ```
//!
//! Connection parameters come from `DB_USER`, `DB_PASS`, `DB_HOST`,
//! `DB_PORT` and `DB_NAME`. Log verbosity follows `RUST_LOG`.

use diesel::Connection;
use diesel::pg::PgConnection;
use std::process::ExitCode;
use todo_service::config::DatabaseSettings;
use todo_service::todo::adapters::postgres::apply_schema;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "todo schema migration failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), BoxError> {
    let settings = DatabaseSettings::from_env()?;
    info!(
        host = %settings.host,
        port = settings.port,
        database = %settings.name,
        "applying todo schema"
    );
    let mut connection = PgConnection::establish(&settings.database_url()?)?;
    apply_schema(&mut connection)?;
    info!("todo schema is up to date");
    Ok(())
}
