//! `SQLite` schema for the local member table.
//!
//! Column names match the hosted table so records read from either backend
//! decode the same way.

/// Name of the member table.
pub const MEMBERS_TABLE: &str = "family_members";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// SQL statement to create the member table.
pub const CREATE_MEMBERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS family_members (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    role TEXT NOT NULL CHECK (length(trim(role)) > 0),
    is_home INTEGER NOT NULL DEFAULT 0,
    last_updated TEXT,
    color TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)
";

/// SQL statement to create an index on `created_at` for roster ordering.
pub const CREATE_CREATED_AT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_family_members_created_at ON family_members(created_at)
";

/// Statements that make up schema version 1.
pub const V1_STATEMENTS: &[&str] = &[CREATE_MEMBERS_TABLE, CREATE_CREATED_AT_INDEX];

/// Columns selected when reading records, in `row_to_record` order.
pub const RECORD_COLUMNS: &str = "id, name, role, is_home, last_updated, color, created_at";
