//! Local `SQLite` backend.
//!
//! Keeps the member table in a database file so the roster survives between
//! sessions without a hosted store.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::{debug, info};
use uuid::Uuid;

use super::migrations;
use super::schema::{MEMBERS_TABLE, RECORD_COLUMNS};
use super::{Order, RemoteStore, Result, StoreError};
use crate::member::{format_timestamp, MemberRecord, NewMember, PresenceUpdate};

/// Member table stored in a local `SQLite` database.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection. Access is serialised through the mutex.
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a member database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// then migrates the schema to the current version.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening member database at {}", path.display());
        let mut conn = Connection::open(&path).map_err(|source| StoreError::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&mut conn)?;

        info!("Member database opened at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory database, mainly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory().map_err(|source| StoreError::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        migrations::initialize_schema(&mut conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fetch(conn: &Connection, id: &str) -> Result<MemberRecord> {
        let record = conn.query_row(
            &format!("SELECT {RECORD_COLUMNS} FROM {MEMBERS_TABLE} WHERE id = ?1"),
            [id],
            Self::row_to_record,
        )?;
        Ok(record)
    }

    /// Convert a database row to a record.
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<MemberRecord> {
        Ok(MemberRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            role: row.get(2)?,
            is_home: row.get(3)?,
            last_updated: row.get(4)?,
            color: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

#[async_trait]
impl RemoteStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn list(&self, order: Order) -> Result<Vec<MemberRecord>> {
        let conn = self.conn();
        // `rowid` keeps rows created in the same millisecond in insertion order.
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM {MEMBERS_TABLE} ORDER BY {} {}, rowid {}",
            order.column.as_str(),
            order.direction(),
            order.direction(),
        ))?;
        let records = stmt
            .query_map([], Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("Listed {} members", records.len());
        Ok(records)
    }

    async fn insert(&self, member: &NewMember) -> Result<MemberRecord> {
        let id = Uuid::new_v4().to_string();
        let created_at = format_timestamp(Utc::now());

        let conn = self.conn();
        conn.execute(
            &format!(
                "INSERT INTO {MEMBERS_TABLE} (id, name, role, is_home, last_updated, color, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
            ),
            params![
                id,
                member.name,
                member.role,
                member.is_home,
                member.last_updated,
                member.color,
                created_at
            ],
        )?;

        debug!("Inserted member with id {}", id);
        Self::fetch(&conn, &id)
    }

    async fn update(&self, id: &str, update: &PresenceUpdate) -> Result<()> {
        let affected = self.conn().execute(
            &format!("UPDATE {MEMBERS_TABLE} SET is_home = ?1, last_updated = ?2 WHERE id = ?3"),
            params![update.is_home, update.last_updated, id],
        )?;
        debug!("Updated presence of {} ({} rows)", id, affected);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let affected = self
            .conn()
            .execute(&format!("DELETE FROM {MEMBERS_TABLE} WHERE id = ?1"), [id])?;
        debug!("Deleted {} ({} rows)", id, affected);
        Ok(())
    }
}
