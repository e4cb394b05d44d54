//! In-process store used by tests and the `:memory:` backend.

use super::{deadline_millis, is_past, wall_clock_millis, PasteStore};
use crate::error::AppError;
use crate::models::paste::Paste;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

struct Entry {
    paste: Paste,
    deadline_ms: Option<i64>,
}

/// `HashMap`-backed store with per-entry deadlines.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    offline: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryStore {
    /// Make every call fail with [`AppError::StoreUnavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make only `delete` fail, leaving reads and writes working.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored entries, including ones whose TTL has passed.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>, AppError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable("memory store is offline".to_string()));
        }
        self.entries
            .lock()
            .map_err(|_| AppError::StoreUnavailable("memory store state is poisoned".to_string()))
    }
}

impl PasteStore for MemoryStore {
    fn put(&self, key: &str, paste: &Paste, ttl: Option<Duration>) -> Result<(), AppError> {
        let entry = Entry {
            paste: paste.clone(),
            deadline_ms: deadline_millis(ttl),
        };
        self.entries()?.insert(key.to_string(), entry);
        Ok(())
    }

    fn replace(&self, key: &str, paste: &Paste) -> Result<bool, AppError> {
        let mut entries = self.entries()?;
        Ok(match entries.get_mut(key) {
            Some(entry) => {
                entry.paste = paste.clone();
                true
            }
            None => false,
        })
    }

    fn get(&self, key: &str) -> Result<Option<Paste>, AppError> {
        let now_ms = wall_clock_millis();
        let entries = self.entries()?;
        Ok(entries
            .get(key)
            .filter(|entry| !is_past(entry.deadline_ms, now_ms))
            .map(|entry| entry.paste.clone()))
    }

    fn delete(&self, key: &str) -> Result<bool, AppError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable("delete rejected".to_string()));
        }
        Ok(self.entries()?.remove(key).is_some())
    }

    fn ping(&self) -> Result<(), AppError> {
        self.entries().map(|_| ())
    }

    fn purge_expired(&self) -> Result<usize, AppError> {
        let now_ms = wall_clock_millis();
        let mut entries = self.entries()?;
        let before = entries.len();
        entries.retain(|_, entry| !is_past(entry.deadline_ms, now_ms));
        Ok(before - entries.len())
    }
}
