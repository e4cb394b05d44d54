//! Record store boundary and its engines.
//!
//! The store is a dumb persistence substrate: it knows nothing about view
//! limits, only about keys, values, and an optional wall-clock TTL used to
//! reclaim entries that nobody reads again.

mod memory;
mod redb;

pub use self::memory::MemoryStore;
pub use self::redb::RedbStore;

use crate::config::Config;
use crate::error::AppError;
use crate::models::paste::Paste;
use std::sync::Arc;
use std::time::Duration;

/// Key-value persistence for paste records.
pub trait PasteStore: Send + Sync {
    /// Store or overwrite `paste` under `key`.
    ///
    /// When `ttl` is given the entry becomes unreadable once it elapses, even
    /// if nobody deletes it.
    fn put(&self, key: &str, paste: &Paste, ttl: Option<Duration>) -> Result<(), AppError>;

    /// Overwrite the record under `key`, keeping the TTL it was stored with.
    ///
    /// # Returns
    /// `Ok(false)` when there is no entry to update.
    fn replace(&self, key: &str, paste: &Paste) -> Result<bool, AppError>;

    /// Fetch the live record under `key`.
    fn get(&self, key: &str) -> Result<Option<Paste>, AppError>;

    /// Remove `key`.
    ///
    /// # Returns
    /// `Ok(true)` when an entry was removed, `Ok(false)` when it was absent.
    fn delete(&self, key: &str) -> Result<bool, AppError>;

    /// Liveness check for the underlying engine.
    fn ping(&self) -> Result<(), AppError>;

    /// Drop every entry whose TTL has elapsed and return how many went.
    fn purge_expired(&self) -> Result<usize, AppError>;
}

/// Open the store selected by `config.db_path`.
///
/// # Errors
/// Returns [`AppError::StoreUnavailable`] when the redb file cannot be opened.
pub fn open_store(config: &Config) -> Result<Arc<dyn PasteStore>, AppError> {
    if config.uses_memory_store() {
        tracing::info!("Using in-memory paste store");
        return Ok(Arc::new(MemoryStore::default()));
    }
    Ok(Arc::new(RedbStore::open(&config.db_path)?))
}

/// Wall-clock deadline (epoch millis) for an entry written now with `ttl`.
fn deadline_millis(ttl: Option<Duration>) -> Option<i64> {
    ttl.map(|ttl| {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        wall_clock_millis().saturating_add(ttl_ms)
    })
}

fn wall_clock_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn is_past(deadline_ms: Option<i64>, now_ms: i64) -> bool {
    deadline_ms.is_some_and(|deadline| now_ms >= deadline)
}
