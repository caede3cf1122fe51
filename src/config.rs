//! Configuration for database connections
//!
//! Provides a builder pattern for configuring how a connection is opened.
//! Everything a connection needs is passed here explicitly; nothing is read
//! from the process environment.

use std::time::Duration;

use crate::error::{DalError, Result};

/// Database engine selected from the connection URL scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    MySql,
}

impl Backend {
    /// Detect the backend from a URL such as `sqlite::memory:` or `mysql://host/db`
    pub fn from_url(url: &str) -> Result<Self> {
        let scheme = url.split(':').next().unwrap_or_default().to_ascii_lowercase();
        match scheme.as_str() {
            "sqlite" => Ok(Backend::Sqlite),
            "mysql" | "mariadb" => Ok(Backend::MySql),
            _ => Err(DalError::connection(format!(
                "Unsupported database URL scheme '{}'",
                scheme
            ))),
        }
    }
}

/// Configuration for a connection
#[derive(Debug, Clone)]
pub struct DalConfig {
    /// Database URL (`sqlite:...` or `mysql://...`)
    pub database_url: String,
    /// Prefix prepended to every bound table name (default: empty)
    pub table_prefix: String,
    /// Create the database (or SQLite file) when it does not exist yet
    pub create_if_missing: bool,
    /// Maximum pooled connections (default: 1)
    pub max_connections: u32,
    /// How long to wait for a pooled connection
    pub acquire_timeout: Duration,
}

impl DalConfig {
    /// Create a new configuration builder
    pub fn builder(database_url: impl Into<String>) -> DalConfigBuilder {
        DalConfigBuilder::new(database_url)
    }

    /// Backend implied by the database URL
    pub fn backend(&self) -> Result<Backend> {
        Backend::from_url(&self.database_url)
    }

    /// Whether the URL points at a private in-memory SQLite database
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

/// Builder for DalConfig
#[derive(Debug)]
pub struct DalConfigBuilder {
    database_url: String,
    table_prefix: String,
    create_if_missing: bool,
    max_connections: u32,
    acquire_timeout: Duration,
}

impl DalConfigBuilder {
    /// Create a new builder with the database URL
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            table_prefix: String::new(),
            create_if_missing: true,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(30),
        }
    }

    /// Set the table name prefix (default: "")
    pub fn table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    /// Enable or disable creating a missing database (default: true)
    pub fn create_if_missing(mut self, enabled: bool) -> Self {
        self.create_if_missing = enabled;
        self
    }

    /// Set the pool size (default: 1, minimum: 1)
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    /// Set the pool acquire timeout (default: 30s)
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Build the configuration
    pub fn build(self) -> DalConfig {
        DalConfig {
            database_url: self.database_url,
            table_prefix: self.table_prefix,
            create_if_missing: self.create_if_missing,
            max_connections: self.max_connections,
            acquire_timeout: self.acquire_timeout,
        }
    }
}
