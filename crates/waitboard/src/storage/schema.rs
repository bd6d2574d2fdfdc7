//! `SQLite` schema definitions for waitboard.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the observations table.
///
/// `AUTOINCREMENT` keeps ids strictly increasing even after a full clear.
pub const CREATE_OBSERVATIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS observations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    value INTEGER NOT NULL CHECK (value >= 0),
    submitted_at TEXT NOT NULL
)
";

/// SQL statement to create an index on `submitted_at` for window queries.
pub const CREATE_SUBMITTED_AT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_observations_submitted_at ON observations(submitted_at, id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_OBSERVATIONS_TABLE,
    CREATE_SUBMITTED_AT_INDEX,
    CREATE_METADATA_TABLE,
];
