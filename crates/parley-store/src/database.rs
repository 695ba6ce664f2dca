//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! migrations are run before any other operation.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::{Connection, TransactionBehavior};
use serde::de::DeserializeOwned;

use crate::error::{Result, StoreError};
use crate::migrations;
use crate::transaction::{ReadTransaction, WriteTransaction};

/// Wrapper around a [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the default application database.
    ///
    /// The database file is placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/parley/parley.db`
    /// - macOS:   `~/Library/Application Support/org.parley.parley/parley.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\parley\parley\data\parley.db`
    pub fn new() -> Result<Self> {
        let path = Self::default_path()?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        tracing::info!(path = %path.display(), "opening database");

        Self::open_at(&path)
    }

    /// Location used by [`Database::new`].
    pub fn default_path() -> Result<PathBuf> {
        let project_dirs =
            ProjectDirs::from("org", "parley", "parley").ok_or(StoreError::NoDataDir)?;
        Ok(project_dirs.data_dir().join("parley.db"))
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run_migrations(&conn)?;

        Ok(Self { conn })
    }

    /// Open a private in-memory database.  Nothing survives the handle.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run_migrations(&conn)?;

        Ok(Self { conn })
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }

    /// Begin a read-only view of the store.
    ///
    /// Every lookup made through the returned transaction sees the same
    /// snapshot; concurrent writers on other connections are not observed
    /// until the transaction is dropped.
    ///
    /// The ingest helpers on [`Database`] take `&mut self`, so they cannot
    /// run on this connection while the snapshot is alive.  A write made
    /// inside it would be rolled back with the snapshot.
    ///
    /// ```compile_fail
    /// use parley_shared::types::{ServiceAddress, ThreadId};
    /// use parley_store::{Database, Message};
    ///
    /// let mut db = Database::open_in_memory().unwrap();
    /// let tx = db.read().unwrap();
    /// let msg = Message::incoming(ThreadId::new(), 1, ServiceAddress::new(uuid::Uuid::nil()));
    /// db.insert_message(&msg).unwrap();
    /// drop(tx);
    /// ```
    pub fn read(&self) -> Result<ReadTransaction<'_>> {
        let tx = self.conn.unchecked_transaction()?;
        Ok(ReadTransaction::new(tx))
    }

    /// Begin a write transaction.  Nothing is persisted until
    /// [`WriteTransaction::commit`] is called.
    pub fn write(&mut self) -> Result<WriteTransaction<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(WriteTransaction::new(tx))
    }
}

// ---------------------------------------------------------------------------
// Column helpers
// ---------------------------------------------------------------------------

/// Wrap a decoding failure of column `idx` as a rusqlite conversion error.
pub(crate) fn column_error<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

/// Decode an optional JSON text column.
pub(crate) fn json_column<T: DeserializeOwned>(
    idx: usize,
    raw: Option<String>,
) -> rusqlite::Result<Option<T>> {
    raw.map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(|e| column_error(idx, e))
}

/// Encode an optional value as a JSON text column.
pub(crate) fn to_json_column<T: serde::Serialize>(value: Option<&T>) -> Result<Option<String>> {
    Ok(value.map(serde_json::to_string).transpose()?)
}

pub(crate) fn parse_uuid(idx: usize, raw: &str) -> rusqlite::Result<uuid::Uuid> {
    uuid::Uuid::parse_str(raw).map_err(|e| column_error(idx, e))
}

pub(crate) fn parse_timestamp(
    idx: usize,
    raw: &str,
) -> rusqlite::Result<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| column_error(idx, e))
}
