//! # SQLite
//!
//! Disk database.
//!
//! Core purpose is to keep every contact form inquiry, even when the
//! notification email could not be sent.
//!
//! ## Requirements
//!
//! - Append only, rows are never updated or deleted here
//! - Tiny dataset, a handful of inquiries a week
//! - Concurrent requests must not share a connection
//!
//! ## Implementation
//!
//! - Single `contacts` table, `id` and `created_at` filled in by SQLite
//! - Only `init` may create the file, every other operation opens read-write
//!   without create so a vanished database is reported instead of recreated empty
//! - One connection per operation, opened on entry and closed on drop
//! - Busy timeout so concurrent writers wait on the file lock instead of failing
//! - `INSERT ... RETURNING` gives the stored row back in the same statement
//! - `count_contacts` / `list_contacts` only read back, for verification and tests
use std::{path::PathBuf, time::Duration};

use chrono::NaiveDateTime;
use rusqlite::{Connection, OpenFlags, Row, params};
use thiserror::Error;
use tracing::{debug, info};

use crate::contact::NewContact;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_CONTACTS: &str = "CREATE TABLE IF NOT EXISTS contacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    message TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

#[derive(Error, Debug)]
#[error("SQLite error: {0}")]
pub struct StorageError(#[from] rusqlite::Error);

/// A stored inquiry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: NaiveDateTime,
}

impl ContactRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            message: row.get("message")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Datastore {
    path: PathBuf,
}

impl Datastore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn connect(&self) -> Result<Connection, StorageError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
            | OpenFlags::SQLITE_OPEN_URI;

        Self::configure(Connection::open_with_flags(&self.path, flags)?)
    }

    fn configure(connection: Connection) -> Result<Connection, StorageError> {
        connection.busy_timeout(BUSY_TIMEOUT)?;

        Ok(connection)
    }

    /// Creates the database file and contacts table if absent. Safe to run on
    /// every start.
    pub fn init(&self) -> Result<(), StorageError> {
        Self::configure(Connection::open(&self.path)?)?
            .execute_batch(CREATE_CONTACTS)?;

        info!("Database initialized at {}", self.path.display());
        Ok(())
    }

    pub fn insert_contact(&self, contact: &NewContact) -> Result<ContactRecord, StorageError> {
        let connection = self.connect()?;

        let record = connection.query_row(
            "INSERT INTO contacts (name, email, message) VALUES (?1, ?2, ?3)
             RETURNING id, name, email, message, created_at",
            params![contact.name(), contact.email(), contact.message()],
            ContactRecord::from_row,
        )?;

        debug!(id = record.id, "Inserted contact");
        Ok(record)
    }

    /// Touches the contacts table without writing anything.
    pub fn ping(&self) -> Result<(), StorageError> {
        self.connect()?
            .prepare("SELECT 1 FROM contacts LIMIT 1")?
            .exists([])?;

        Ok(())
    }

    pub fn count_contacts(&self) -> Result<i64, StorageError> {
        let count = self
            .connect()?
            .query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;

        Ok(count)
    }

    /// All stored inquiries, oldest first.
    pub fn list_contacts(&self) -> Result<Vec<ContactRecord>, StorageError> {
        let connection = self.connect()?;
        let mut statement = connection.prepare(
            "SELECT id, name, email, message, created_at FROM contacts ORDER BY id",
        )?;

        let records = statement
            .query_map([], ContactRecord::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}
