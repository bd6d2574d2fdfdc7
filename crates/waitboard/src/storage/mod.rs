//! Storage layer for waitboard.
//!
//! This module provides `SQLite`-based persistent storage for wait-time
//! observations: append, read everything after a cutoff, and clear all.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::observation::{format_timestamp, parse_timestamp, validate_value, Observation};

/// Storage engine for wait-time observations.
///
/// Owns a single managed connection. Every operation locks it for the span of
/// one transaction and releases it when the operation returns, so inserts and
/// clears never interleave.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let mut conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // A committed insert must survive power loss before we acknowledge it.
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")?;

        migrations::initialize_schema(&mut conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
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

    /// Record a wait time, stamped with the current time.
    ///
    /// The returned observation is the committed row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `value` is negative (no row is written),
    /// or a storage error if the database operation fails.
    pub fn insert(&self, value: i64) -> Result<Observation> {
        self.insert_at(value, Utc::now())
    }

    /// Record a wait time with an explicit timestamp.
    ///
    /// Sub-second precision is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `value` is negative (no row is written),
    /// or a storage error if the database operation fails.
    pub fn insert_at(&self, value: i64, submitted_at: DateTime<Utc>) -> Result<Observation> {
        validate_value(value)?;

        let timestamp = format_timestamp(submitted_at);
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO observations (value, submitted_at) VALUES (?1, ?2)",
            params![value, timestamp],
        )?;
        let id = tx.last_insert_rowid();

        let observation = tx
            .query_row(
                "SELECT id, value, submitted_at FROM observations WHERE id = ?1",
                [id],
                Self::row_to_raw,
            )
            .optional()?
            .ok_or_else(|| Error::internal(format!("inserted row {id} not found")))
            .and_then(RawObservation::decode)?;

        tx.commit()?;
        debug!("Inserted observation {} with value {}", id, value);
        Ok(observation)
    }

    /// Get every observation submitted strictly after `cutoff`.
    ///
    /// Results are ordered by `submitted_at` ascending, ties broken by id.
    /// The cutoff is compared at whole-second precision.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or a row is corrupt.
    pub fn read_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Observation>> {
        let cutoff_str = format_timestamp(cutoff);
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r"
            SELECT id, value, submitted_at
            FROM observations WHERE submitted_at > ?1
            ORDER BY submitted_at ASC, id ASC
            ",
        )?;

        let rows = stmt
            .query_map([cutoff_str], Self::row_to_raw)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let observations = rows
            .into_iter()
            .map(RawObservation::decode)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Read {} observations since {}",
            observations.len(),
            cutoff.to_rfc3339()
        );
        Ok(observations)
    }

    /// Remove every observation.
    ///
    /// Returns the number of observations deleted. Irreversible.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear_all(&self) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let affected = tx.execute("DELETE FROM observations", [])?;
        tx.commit()?;

        info!("Cleared {} observations", affected);
        Ok(affected)
    }

    /// Count total observations in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM observations", [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails, or
    /// [`Error::CorruptRow`] if the oldest or newest row holds an unparseable
    /// timestamp.
    pub fn stats(&self) -> Result<StorageStats> {
        let conn = self.lock()?;

        let total_observations: i64 =
            conn.query_row("SELECT COUNT(*) FROM observations", [], |row| row.get(0))?;
        let oldest_observation = Self::endpoint_timestamp(
            &conn,
            "SELECT id, submitted_at FROM observations
             ORDER BY submitted_at ASC, id ASC LIMIT 1",
        )?;
        let newest_observation = Self::endpoint_timestamp(
            &conn,
            "SELECT id, submitted_at FROM observations
             ORDER BY submitted_at DESC, id DESC LIMIT 1",
        )?;
        drop(conn);

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_observations,
            oldest_observation,
            newest_observation,
            db_size_bytes,
        })
    }

    /// Decode the timestamp of the single row selected by `sql`, if any.
    fn endpoint_timestamp(conn: &Connection, sql: &str) -> Result<Option<DateTime<Utc>>> {
        let row: Option<(i64, String)> = conn
            .query_row(sql, [], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;

        row.map(|(id, raw)| {
            parse_timestamp(&raw).map_err(|e| Error::CorruptRow {
                id,
                message: format!("unparseable timestamp {raw:?}: {e}"),
            })
        })
        .transpose()
    }

    /// Acquire the connection for one operation.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("storage connection lock poisoned"))
    }

    fn row_to_raw(row: &rusqlite::Row) -> rusqlite::Result<RawObservation> {
        Ok(RawObservation {
            id: row.get(0)?,
            value: row.get(1)?,
            submitted_at: row.get(2)?,
        })
    }
}

/// An observation row as stored, before its timestamp is decoded.
struct RawObservation {
    id: i64,
    value: i64,
    submitted_at: String,
}

impl RawObservation {
    fn decode(self) -> Result<Observation> {
        let submitted_at = parse_timestamp(&self.submitted_at).map_err(|e| Error::CorruptRow {
            id: self.id,
            message: format!("unparseable timestamp {:?}: {e}", self.submitted_at),
        })?;
        if self.value < 0 {
            return Err(Error::CorruptRow {
                id: self.id,
                message: format!("negative value {}", self.value),
            });
        }
        Ok(Observation {
            id: self.id,
            value: self.value,
            submitted_at,
        })
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Total number of observations stored.
    pub total_observations: i64,
    /// Timestamp of the oldest observation.
    pub oldest_observation: Option<DateTime<Utc>>,
    /// Timestamp of the newest observation.
    pub newest_observation: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
