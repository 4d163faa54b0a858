//! Remote store access for whoshome.
//!
//! The household roster is persisted in a single table. [`RemoteStore`] is the
//! contract the controller talks to; it is implemented by a PostgREST client
//! ([`RestStore`]), a local `SQLite` table ([`SqliteStore`]) and an in-process
//! table ([`MemoryStore`]).

pub mod memory;
pub mod migrations;
pub mod rest;
pub mod schema;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::config::{Backend, Config};
use crate::member::{MemberRecord, NewMember, PresenceUpdate};

pub use memory::{MemoryStore, StoreCall, StoreOp};
pub use rest::RestStore;
pub use sqlite::SqliteStore;

/// Errors raised by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or did not answer in time.
    #[error("remote store unavailable: {message}")]
    Unavailable {
        /// Description of the transport failure.
        message: String,
    },

    /// The store answered with an error status.
    #[error("remote store rejected the request ({status}): {message}")]
    Rejected {
        /// HTTP-style status code.
        status: u16,
        /// Message reported by the store.
        message: String,
    },

    /// A response or row could not be decoded into a record.
    #[error("could not decode store response: {message}")]
    Decode {
        /// What was wrong with the data.
        message: String,
    },

    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: std::path::PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// Failed to create the directory holding the database.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: std::path::PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    Migration {
        /// Description of what went wrong.
        message: String,
    },

    /// The store is missing settings it needs.
    #[error("store misconfigured: {message}")]
    Config {
        /// Description of the missing or invalid setting.
        message: String,
    },
}

/// A specialized Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Columns the roster may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Column {
    /// Creation time, assigned by the store.
    #[default]
    CreatedAt,
}

impl Column {
    /// Column name in the table.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering for [`RemoteStore::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Order {
    /// Column to sort by.
    pub column: Column,
    /// Ascending when `true`.
    pub ascending: bool,
}

impl Order {
    /// Oldest first, which is the roster's insertion order.
    #[must_use]
    pub fn creation() -> Self {
        Self {
            column: Column::CreatedAt,
            ascending: true,
        }
    }

    /// `asc` or `desc`.
    #[must_use]
    pub fn direction(&self) -> &'static str {
        if self.ascending {
            "asc"
        } else {
            "desc"
        }
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::creation()
    }
}

/// A table of household members.
///
/// Implementations must not hold state the controller relies on: the
/// controller only changes its roster after one of these calls has returned
/// `Ok`.
#[async_trait]
pub trait RemoteStore: Send + Sync + std::fmt::Debug {
    /// Short backend name, for logs.
    fn name(&self) -> &'static str;

    /// Fetch every record in the given order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    async fn list(&self, order: Order) -> Result<Vec<MemberRecord>>;

    /// Create a record and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects or cannot perform the insert.
    async fn insert(&self, member: &NewMember) -> Result<MemberRecord>;

    /// Set the presence fields of the record with this id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects or cannot perform the update.
    async fn update(&self, id: &str, update: &PresenceUpdate) -> Result<()>;

    /// Remove the record with this id. Removing an unknown id succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects or cannot perform the delete.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Build the store selected by the configuration.
///
/// # Errors
///
/// Returns an error if the backend settings are incomplete or the local
/// database cannot be opened.
pub fn connect(config: &Config) -> Result<Arc<dyn RemoteStore>> {
    debug!("Connecting to {} store", config.store.backend);
    let store: Arc<dyn RemoteStore> = match config.store.backend {
        Backend::Rest => {
            let url = config.store.url.as_deref().ok_or_else(|| StoreError::Config {
                message: "store.url is required for the rest backend".to_string(),
            })?;
            let api_key = config
                .store
                .api_key
                .as_deref()
                .ok_or_else(|| StoreError::Config {
                    message: "store.api_key is required for the rest backend".to_string(),
                })?;
            Arc::new(RestStore::new(
                url,
                api_key,
                &config.store.table,
                config.request_timeout(),
            )?)
        }
        Backend::Sqlite => Arc::new(SqliteStore::open(config.database_path())?),
        Backend::Memory => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}
