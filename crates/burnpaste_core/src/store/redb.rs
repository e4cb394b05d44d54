//! Paste storage backed by redb.

use super::{deadline_millis, is_past, wall_clock_millis, PasteStore};
use crate::constants::REDB_FILE_NAME;
use crate::error::AppError;
use crate::models::paste::Paste;
use ::redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Paste rows: bincode-encoded `(deadline_ms, Paste)`.
const PASTES: TableDefinition<&str, &[u8]> = TableDefinition::new("pastes");

/// Accessor for the paste table.
pub struct RedbStore {
    db: Arc<Database>,
}

fn encode(paste: &Paste, deadline_ms: Option<i64>) -> Result<Vec<u8>, AppError> {
    Ok(bincode::serialize(&(deadline_ms, paste))?)
}

fn decode(bytes: &[u8]) -> Result<(Option<i64>, Paste), AppError> {
    Ok(bincode::deserialize(bytes)?)
}

impl RedbStore {
    /// Open (or create) the database under the `path` directory.
    ///
    /// # Errors
    /// Returns an error when the directory or redb file cannot be opened, or
    /// when another process holds the database.
    pub fn open(path: &str) -> Result<Self, AppError> {
        let dir = Path::new(path);
        std::fs::create_dir_all(dir).map_err(|err| {
            AppError::StoreUnavailable(format!(
                "Failed to create data directory '{}': {}",
                dir.display(),
                err
            ))
        })?;
        let file = dir.join(REDB_FILE_NAME);
        let db = match Database::create(&file) {
            Ok(db) => db,
            Err(::redb::DatabaseError::DatabaseAlreadyOpen) => {
                return Err(AppError::StoreUnavailable(format!(
                    "Database '{}' is already open in another process.\n\
                    Stop the other burnpaste instance or set DB_PATH to a different location.",
                    file.display()
                )));
            }
            Err(err) => return Err(err.into()),
        };
        Self::from_shared(Arc::new(db))
    }

    /// Wrap an already open database, creating the paste table if missing.
    pub fn from_shared(db: Arc<Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(PASTES)?;
        write_txn.commit()?;
        Ok(Self { db })
    }
}

impl PasteStore for RedbStore {
    fn put(&self, key: &str, paste: &Paste, ttl: Option<Duration>) -> Result<(), AppError> {
        let encoded = encode(paste, deadline_millis(ttl))?;
        let write_txn = self.db.begin_write()?;
        {
            let mut pastes = write_txn.open_table(PASTES)?;
            pastes.insert(key, encoded.as_slice())?;
        }
        write_txn.commit()?;
        tracing::debug!("stored {}", key);
        Ok(())
    }

    fn replace(&self, key: &str, paste: &Paste) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        let replaced = {
            let mut pastes = write_txn.open_table(PASTES)?;
            let existing = match pastes.get(key)? {
                Some(value) => Some(decode(value.value())?.0),
                None => None,
            };
            match existing {
                Some(deadline_ms) => {
                    let encoded = encode(paste, deadline_ms)?;
                    pastes.insert(key, encoded.as_slice())?;
                    true
                }
                None => false,
            }
        };
        write_txn.commit()?;
        tracing::debug!("replaced {} (present: {})", key, replaced);
        Ok(replaced)
    }

    fn get(&self, key: &str) -> Result<Option<Paste>, AppError> {
        let read_txn = self.db.begin_read()?;
        let pastes = read_txn.open_table(PASTES)?;
        let Some(value) = pastes.get(key)? else {
            return Ok(None);
        };
        let (deadline_ms, paste) = decode(value.value())?;
        if is_past(deadline_ms, wall_clock_millis()) {
            return Ok(None);
        }
        Ok(Some(paste))
    }

    fn delete(&self, key: &str) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut pastes = write_txn.open_table(PASTES)?;
            let removed = pastes.remove(key)?.is_some();
            removed
        };
        write_txn.commit()?;
        tracing::debug!("deleted {} (present: {})", key, removed);
        Ok(removed)
    }

    fn ping(&self) -> Result<(), AppError> {
        let read_txn = self.db.begin_read()?;
        read_txn.open_table(PASTES)?;
        Ok(())
    }

    fn purge_expired(&self) -> Result<usize, AppError> {
        let now_ms = wall_clock_millis();
        let write_txn = self.db.begin_write()?;
        let purged = {
            let mut pastes = write_txn.open_table(PASTES)?;
            let mut expired = Vec::new();
            for row in pastes.iter()? {
                let (key, value) = row?;
                let stale = match decode(value.value()) {
                    Ok((deadline_ms, _)) => is_past(deadline_ms, now_ms),
                    Err(err) => {
                        tracing::warn!("Dropping undecodable row {}: {}", key.value(), err);
                        true
                    }
                };
                if stale {
                    expired.push(key.value().to_string());
                }
            }
            for key in &expired {
                pastes.remove(key.as_str())?;
            }
            expired.len()
        };
        write_txn.commit()?;
        Ok(purged)
    }
}
