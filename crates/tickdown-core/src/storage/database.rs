//! SQLite-backed storage.
//!
//! One database file holds both halves of the platform surface the
//! timer needs: the durable record slot (a key-value table written
//! whole on every transition) and the desktop stand-in for the
//! deferred wake-up service (a table of pending wake-up rows that a
//! launcher checks at process start).

use std::rc::Rc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use crate::error::{ScheduleError, StorageError};
use crate::platform::{StateStore, WakeupHandle, WakeupScheduler};

/// SQLite database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/tickdown/tickdown.db`.
    ///
    /// Creates the file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()
            .map_err(|source| StorageError::DataDir { source })?
            .join("tickdown.db");
        let conn = Connection::open(&path)
            .map_err(|source| StorageError::OpenFailed { path, source })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value BLOB NOT NULL
                );

                CREATE TABLE IF NOT EXISTS wakeups (
                    id      INTEGER PRIMARY KEY AUTOINCREMENT,
                    fire_at INTEGER NOT NULL,
                    payload INTEGER NOT NULL DEFAULT 0,
                    fired   INTEGER NOT NULL DEFAULT 0
                );

                CREATE INDEX IF NOT EXISTS idx_wakeups_fire_at ON wakeups(fire_at);",
            )
            .map_err(|source| StorageError::MigrationFailed { source })
    }

    /// Oldest pending wake-up whose fire time has passed, if any.
    /// The launcher uses this to derive the launch reason.
    pub fn due_wakeup(&self, now: DateTime<Utc>) -> Result<Option<WakeupHandle>, StorageError> {
        self.conn
            .query_row(
                "SELECT id FROM wakeups
                 WHERE fired = 0 AND fire_at <= ?1
                 ORDER BY fire_at LIMIT 1",
                params![now.timestamp()],
                |row| row.get::<_, i64>(0),
            )
            .optional()
            .map(|id| id.map(WakeupHandle::new))
            .map_err(|source| StorageError::QueryFailed { source })
    }

    /// Mark a fired wake-up consumed so it is not seen as due again.
    pub fn mark_fired(&self, handle: WakeupHandle) -> Result<(), StorageError> {
        self.conn
            .execute(
                "UPDATE wakeups SET fired = 1 WHERE id = ?1",
                params![handle.id()],
            )
            .map_err(|source| StorageError::QueryFailed { source })?;
        Ok(())
    }
}

/// Durable record slot over the kv table.
pub struct SqliteStore {
    db: Rc<Database>,
}

impl SqliteStore {
    pub fn new(db: Rc<Database>) -> Self {
        Self { db }
    }
}

impl StateStore for SqliteStore {
    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<usize, StorageError> {
        self.db
            .conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, bytes],
            )
            .map_err(|source| StorageError::WriteFailed {
                key: key.into(),
                source,
            })?;
        Ok(bytes.len())
    }

    fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let value = self
            .db
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()
            .map_err(|source| StorageError::ReadFailed {
                key: key.into(),
                source,
            })?;
        value.ok_or_else(|| StorageError::Missing(key.into()))
    }

    fn exists(&self, key: &str) -> bool {
        self.db
            .conn
            .query_row(
                "SELECT 1 FROM kv WHERE key = ?1",
                params![key],
                |_row| Ok(()),
            )
            .optional()
            .ok()
            .flatten()
            .is_some()
    }
}

/// Desktop stand-in for the platform wake-up service.
///
/// A scheduled wake-up is a row in the `wakeups` table; the launcher
/// checks for due rows at process start. Mirrors the platform
/// scheduler's reserved-window behavior: a request within 60 seconds
/// of another pending wake-up is rejected as
/// [`ScheduleError::RangeRejected`].
pub struct SqliteWakeups {
    db: Rc<Database>,
}

impl SqliteWakeups {
    pub fn new(db: Rc<Database>) -> Self {
        Self { db }
    }
}

impl WakeupScheduler for SqliteWakeups {
    fn schedule(&mut self, at: DateTime<Utc>, payload: i64) -> Result<WakeupHandle, ScheduleError> {
        let at_secs = at.timestamp();
        let clash: bool = self
            .db
            .conn
            .query_row(
                "SELECT EXISTS(
                    SELECT 1 FROM wakeups
                    WHERE fired = 0 AND ABS(fire_at - ?1) < 60
                )",
                params![at_secs],
                |row| row.get(0),
            )
            .map_err(backend)?;
        if clash {
            return Err(ScheduleError::RangeRejected);
        }

        self.db
            .conn
            .execute(
                "INSERT INTO wakeups (fire_at, payload, fired) VALUES (?1, ?2, 0)",
                params![at_secs, payload],
            )
            .map_err(backend)?;
        // Rowids start at 1, so the zero sentinel stays safe.
        Ok(WakeupHandle::new(self.db.conn.last_insert_rowid()))
    }

    fn cancel(&mut self, handle: WakeupHandle) -> Result<(), ScheduleError> {
        self.db
            .conn
            .execute("DELETE FROM wakeups WHERE id = ?1", params![handle.id()])
            .map_err(backend)?;
        Ok(())
    }

    fn is_pending(&self, handle: WakeupHandle) -> bool {
        self.db
            .conn
            .query_row(
                "SELECT 1 FROM wakeups WHERE id = ?1 AND fired = 0",
                params![handle.id()],
                |_row| Ok(()),
            )
            .optional()
            .ok()
            .flatten()
            .is_some()
    }
}

fn backend(err: rusqlite::Error) -> ScheduleError {
    ScheduleError::Backend(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::datetime_from_epoch;

    fn db() -> Rc<Database> {
        Rc::new(Database::open_memory().unwrap())
    }

    #[test]
    fn kv_blob_round_trip() {
        let db = db();
        let mut store = SqliteStore::new(Rc::clone(&db));
        assert!(!store.exists("countdown"));

        let written = store.write("countdown", &[1, 2, 3, 4]).unwrap();
        assert_eq!(written, 4);
        assert!(store.exists("countdown"));
        assert_eq!(store.read("countdown").unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn kv_overwrite_replaces_whole_value() {
        let db = db();
        let mut store = SqliteStore::new(Rc::clone(&db));
        store.write("countdown", &[0u8; 24]).unwrap();
        store.write("countdown", &[7u8; 24]).unwrap();
        assert_eq!(store.read("countdown").unwrap(), vec![7u8; 24]);
    }

    #[test]
    fn read_missing_key_errors() {
        let db = db();
        let store = SqliteStore::new(Rc::clone(&db));
        assert!(matches!(
            store.read("nothing"),
            Err(StorageError::Missing(_))
        ));
    }

    #[test]
    fn wakeup_schedule_cancel_lifecycle() {
        let db = db();
        let mut wakeups = SqliteWakeups::new(Rc::clone(&db));

        let at = datetime_from_epoch(1_700_000_000);
        let handle = wakeups.schedule(at, 0).unwrap();
        assert!(handle.id() >= 1);
        assert!(wakeups.is_pending(handle));

        wakeups.cancel(handle).unwrap();
        assert!(!wakeups.is_pending(handle));
    }

    #[test]
    fn reserved_window_rejects_nearby_requests() {
        let db = db();
        let mut wakeups = SqliteWakeups::new(Rc::clone(&db));

        let at = datetime_from_epoch(1_700_000_000);
        wakeups.schedule(at, 0).unwrap();

        // Within a minute of a pending wake-up: rejected.
        let close = datetime_from_epoch(1_700_000_030);
        assert_eq!(
            wakeups.schedule(close, 0).unwrap_err(),
            ScheduleError::RangeRejected
        );

        // A full minute away is fine.
        let clear = datetime_from_epoch(1_700_000_060);
        assert!(wakeups.schedule(clear, 0).is_ok());
    }

    #[test]
    fn cancelled_wakeup_frees_its_window() {
        let db = db();
        let mut wakeups = SqliteWakeups::new(Rc::clone(&db));

        let at = datetime_from_epoch(1_700_000_000);
        let handle = wakeups.schedule(at, 0).unwrap();
        wakeups.cancel(handle).unwrap();

        assert!(wakeups.schedule(at, 0).is_ok());
    }

    #[test]
    fn due_wakeup_and_mark_fired() {
        let db = db();
        let mut wakeups = SqliteWakeups::new(Rc::clone(&db));

        let at = datetime_from_epoch(1_700_000_000);
        let handle = wakeups.schedule(at, 0).unwrap();

        let before = datetime_from_epoch(1_699_999_999);
        assert_eq!(db.due_wakeup(before).unwrap(), None);

        let after = datetime_from_epoch(1_700_000_001);
        assert_eq!(db.due_wakeup(after).unwrap(), Some(handle));

        db.mark_fired(handle).unwrap();
        assert_eq!(db.due_wakeup(after).unwrap(), None);
        assert!(!wakeups.is_pending(handle));
    }
}
