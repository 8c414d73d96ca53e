//! Database and pool settings, built once at startup and passed explicitly
//! to the store adapter.

use ::config::{Config, Environment, Map};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised while reading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings sources could not be merged or deserialised.
    #[error("failed to load database settings: {0}")]
    Load(#[from] ::config::ConfigError),

    /// A loaded value cannot be used to reach the database.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Setting name.
        key: &'static str,
        /// Value supplied.
        value: String,
        /// Failure description.
        reason: String,
    },
}

const DEFAULT_USER: &str = "root";
const DEFAULT_PASSWORD: &str = "root";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_NAME: &str = "todo";
const URL_BASE: &str = "postgres://localhost/";

/// Connection parameters for the record store.
///
/// Read from `DB_USER`, `DB_PASS`, `DB_HOST`, `DB_PORT` and `DB_NAME`.
/// The password is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseSettings {
    /// Login role.
    pub user: String,
    /// Login password.
    #[serde(rename = "pass")]
    pub password: String,
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database name.
    pub name: String,
}

impl DatabaseSettings {
    /// Prefix shared by every settings variable.
    pub const ENV_PREFIX: &'static str = "DB";

    /// Reads settings from the process environment, falling back to defaults
    /// for unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a variable cannot be deserialised,
    /// such as a `DB_PORT` that is not a port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Environment::with_prefix(Self::ENV_PREFIX))
    }

    /// Reads settings from the given variables instead of the process
    /// environment. Keys use the same names as the environment, for example
    /// `DB_HOST`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a value cannot be deserialised.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source: Map<String, String> = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self::load(Environment::with_prefix(Self::ENV_PREFIX).source(Some(source)))
    }

    fn load(environment: Environment) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("user", DEFAULT_USER)?
            .set_default("pass", DEFAULT_PASSWORD)?
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("name", DEFAULT_NAME)?
            .add_source(environment)
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Returns the `PostgreSQL` connection URL for these settings.
    ///
    /// User, password and database name are percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the host cannot appear in a
    /// URL.
    pub fn database_url(&self) -> Result<String, ConfigError> {
        let mut url = Url::parse(URL_BASE).map_err(|err| invalid("url", URL_BASE, err))?;
        url.set_host(Some(&self.host))
            .map_err(|err| invalid("DB_HOST", &self.host, err))?;
        url.set_port(Some(self.port))
            .map_err(|()| invalid("DB_PORT", &self.port.to_string(), "port rejected"))?;
        url.set_username(&self.user)
            .map_err(|()| invalid("DB_USER", &self.user, "user rejected"))?;
        url.set_password(Some(&self.password))
            .map_err(|()| invalid("DB_PASS", "<redacted>", "password rejected"))?;
        url.path_segments_mut()
            .map_err(|()| invalid("DB_NAME", &self.name, "URL has no path"))?
            .pop_if_empty()
            .push(&self.name);
        Ok(url.into())
    }
}

fn invalid(key: &'static str, value: &str, reason: impl fmt::Display) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_owned(),
        reason: reason.to_string(),
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER.to_owned(),
            password: DEFAULT_PASSWORD.to_owned(),
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            name: DEFAULT_NAME.to_owned(),
        }
    }
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .finish()
    }
}

/// Connection pool sizing and health-check policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    /// Maximum number of pooled connections.
    pub max_size: u32,
    /// Age after which a connection is closed and replaced.
    pub max_lifetime: Duration,
    /// Whether a connection is pinged before each checkout.
    pub test_on_check_out: bool,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_size: 10,
            max_lifetime: Duration::from_secs(1800),
            test_on_check_out: true,
        }
    }
}
