//! Schema versioning for the local member table.
//!
//! The version lives in the `metadata` table. Each version's statements are
//! applied in order inside one transaction, followed by the version bump.

use rusqlite::Connection;
use tracing::info;

use super::schema::{CREATE_METADATA_TABLE, V1_STATEMENTS};
use super::{Result, StoreError};

/// The current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// Bring the database up to [`CURRENT_VERSION`].
///
/// # Errors
///
/// Returns an error if the stored version is unreadable, newer than this
/// build understands, or a migration fails.
pub fn initialize_schema(conn: &mut Connection) -> Result<()> {
    conn.execute(CREATE_METADATA_TABLE, [])?;

    let version = get_schema_version(conn)?;
    if version > CURRENT_VERSION {
        return Err(StoreError::Migration {
            message: format!(
                "database schema version {version} is newer than supported version {CURRENT_VERSION}"
            ),
        });
    }

    for next in (version + 1)..=CURRENT_VERSION {
        let tx = conn.transaction()?;
        run_migration(&tx, next)?;
        set_schema_version(&tx, next)?;
        tx.commit()?;
        info!("Migrated member database to schema version {}", next);
    }

    Ok(())
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (fresh database).
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let result: std::result::Result<String, rusqlite::Error> = conn.query_row(
        "SELECT value FROM metadata WHERE key = ?1",
        [VERSION_KEY],
        |row| row.get(0),
    );

    match result {
        Ok(value) => value.parse().map_err(|_| StoreError::Migration {
            message: format!("invalid schema version: {value}"),
        }),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e.into()),
    }
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

/// Apply the statements of one schema version.
fn run_migration(conn: &Connection, version: i32) -> Result<()> {
    let statements = match version {
        1 => V1_STATEMENTS,
        _ => {
            return Err(StoreError::Migration {
                message: format!("unknown migration version: {version}"),
            })
        }
    };
    for statement in statements {
        conn.execute(statement, [])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_db() -> Connection {
        Connection::open_in_memory().expect("failed to create in-memory database")
    }

    fn table_exists(conn: &Connection, name: &str) -> bool {
        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [name],
                |row| row.get(0),
            )
            .unwrap();
        count == 1
    }

    #[test]
    fn test_initialize_schema_creates_tables() {
        let mut conn = create_test_db();
        initialize_schema(&mut conn).expect("failed to initialize schema");

        assert!(table_exists(&conn, "family_members"));
        assert!(table_exists(&conn, "metadata"));
    }

    #[test]
    fn test_initialize_schema_sets_version() {
        let mut conn = create_test_db();
        initialize_schema(&mut conn).expect("failed to initialize schema");

        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_initialize_schema_idempotent() {
        let mut conn = create_test_db();

        initialize_schema(&mut conn).expect("first init failed");
        initialize_schema(&mut conn).expect("second init failed");

        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_get_schema_version_fresh_db() {
        let conn = create_test_db();
        conn.execute(CREATE_METADATA_TABLE, []).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), 0);
    }

    #[test]
    fn test_newer_schema_is_refused() {
        let mut conn = create_test_db();
        conn.execute(CREATE_METADATA_TABLE, []).unwrap();
        set_schema_version(&conn, CURRENT_VERSION + 1).unwrap();

        let err = initialize_schema(&mut conn).unwrap_err();
        assert!(err.to_string().contains("newer than supported"));
    }

    #[test]
    fn test_invalid_version_value() {
        let mut conn = create_test_db();
        conn.execute(CREATE_METADATA_TABLE, []).unwrap();
        conn.execute(
            "INSERT INTO metadata (key, value) VALUES ('schema_version', 'one')",
            [],
        )
        .unwrap();

        let err = initialize_schema(&mut conn).unwrap_err();
        assert!(matches!(err, StoreError::Migration { .. }));
    }

    #[test]
    fn test_run_migration_unknown_version() {
        let conn = create_test_db();
        let err = run_migration(&conn, 999).unwrap_err();
        assert!(err.to_string().contains("unknown migration version"));
    }

    #[test]
    fn test_created_at_index_exists() {
        let mut conn = create_test_db();
        initialize_schema(&mut conn).unwrap();

        let indexes: Vec<String> = conn
            .prepare(
                "SELECT name FROM sqlite_master WHERE type='index' AND tbl_name='family_members'",
            )
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(std::result::Result::ok)
            .collect();

        assert!(indexes.iter().any(|n| n.contains("created_at")));
    }
}
