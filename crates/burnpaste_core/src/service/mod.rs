//! Paste lifecycle: creation, non-consuming peeks, and consuming reads.
//!
//! Expiry is lazy. Every read re-checks both the time deadline and the view
//! budget, and deletes the record the moment it finds it exhausted. The
//! store's own TTL only reclaims records nobody reads again.

use crate::clock::{Clock, SystemClock};
use crate::constants::{DEFAULT_MAX_PASTE_SIZE, MAX_ID_ATTEMPTS};
use crate::error::{AppError, NotFoundReason};
use crate::locks::PasteLockManager;
use crate::models::paste::{CreatePasteRequest, Paste, PasteView};
use crate::naming::{paste_key, IdGenerator, RandomIdGenerator};
use crate::store::PasteStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Orchestrates the record store, clock, and id generator.
pub struct PasteService {
    store: Arc<dyn PasteStore>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    locks: PasteLockManager,
    max_paste_size: usize,
}

impl PasteService {
    /// Service over `store` using wall-clock time and random ids.
    pub fn new(store: Arc<dyn PasteStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            ids: Arc::new(RandomIdGenerator),
            locks: PasteLockManager::default(),
            max_paste_size: DEFAULT_MAX_PASTE_SIZE,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_max_paste_size(mut self, max_paste_size: usize) -> Self {
        self.max_paste_size = max_paste_size;
        self
    }

    /// Current instant according to the configured clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Create a paste at the clock's current instant.
    pub fn create(&self, req: CreatePasteRequest) -> Result<Paste, AppError> {
        self.create_at(req, self.now())
    }

    /// Validate `req` and persist a new record created at `now`.
    ///
    /// # Returns
    /// The stored record, with `views = 0`.
    ///
    /// # Errors
    /// Input errors are reported before the store is touched. Store failures
    /// surface as [`AppError::StoreUnavailable`].
    pub fn create_at(&self, req: CreatePasteRequest, now: DateTime<Utc>) -> Result<Paste, AppError> {
        let input = req.validate(self.max_paste_size)?;
        let ttl = input.ttl_seconds.map(Duration::from_secs);
        let mut paste = Paste::new(String::new(), input, now);

        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.generate();
            let key = paste_key(&id);
            let _guard = self.locks.lock(&id)?;
            if self.store.get(&key)?.is_some() {
                tracing::warn!("Paste id collision on {}; generating another", id);
                continue;
            }
            paste.id = id;
            self.store.put(&key, &paste, ttl)?;
            tracing::info!(
                paste_id = %paste.id,
                ttl_seconds = ?ttl.map(|ttl| ttl.as_secs()),
                max_views = ?paste.max_views,
                "created paste"
            );
            return Ok(paste);
        }

        Err(AppError::StoreUnavailable(format!(
            "no unused paste id after {} attempts",
            MAX_ID_ATTEMPTS
        )))
    }

    /// Inspect a paste at the clock's current instant without using a view.
    pub fn peek(&self, id: &str) -> Result<PasteView, AppError> {
        self.peek_at(id, self.now())
    }

    /// Inspect a paste at `now` without advancing its view counter.
    ///
    /// Exhausted records are deleted and reported as [`AppError::NotFound`].
    pub fn peek_at(&self, id: &str, now: DateTime<Utc>) -> Result<PasteView, AppError> {
        let key = paste_key(id);
        let _guard = self.locks.lock(id)?;
        let paste = self.load_live(&key, now)?;
        Ok(paste.view())
    }

    /// Read a paste at the clock's current instant, using up one view.
    pub fn consume(&self, id: &str) -> Result<PasteView, AppError> {
        self.consume_at(id, self.now())
    }

    /// Read a paste at `now` and advance its view counter by one.
    ///
    /// The fetch, expiry checks, increment, and write happen under the
    /// paste's lock, so concurrent consumers never exceed `max_views`. The
    /// read that reaches the limit still receives the content, and the record
    /// is deleted before the lock is released.
    ///
    /// # Errors
    /// [`AppError::NotFound`] for missing or exhausted records; store failures
    /// while recording the view are returned instead of the content.
    pub fn consume_at(&self, id: &str, now: DateTime<Utc>) -> Result<PasteView, AppError> {
        let key = paste_key(id);
        let _guard = self.locks.lock(id)?;
        let mut paste = self.load_live(&key, now)?;

        paste.views = paste.views.saturating_add(1);
        let view = paste.view();

        if paste.is_view_limit_reached() {
            if let Err(err) = self.store.delete(&key) {
                // Keep the exhausted counter so the next read still refuses it.
                tracing::warn!("Failed to delete exhausted paste {}: {}", key, err);
                self.record_view(&key, &paste)?;
            }
            tracing::debug!(paste_id = %id, "paste reached its view limit");
        } else {
            self.record_view(&key, &paste)?;
        }

        Ok(view)
    }

    /// Persist an advanced view counter under the store TTL set at creation.
    /// The store deadline is never recomputed from the caller's `now`.
    fn record_view(&self, key: &str, paste: &Paste) -> Result<(), AppError> {
        if !self.store.replace(key, paste)? {
            tracing::debug!("{} lapsed in the store before its view was recorded", key);
        }
        Ok(())
    }

    /// Liveness of the underlying store.
    pub fn ping(&self) -> Result<(), AppError> {
        self.store.ping()
    }

    /// Reclaim store entries whose native TTL has elapsed.
    pub fn purge_expired(&self) -> Result<usize, AppError> {
        let purged = self.store.purge_expired()?;
        if purged > 0 {
            tracing::debug!("purged {} expired paste(s)", purged);
        }
        Ok(purged)
    }

    /// Fetch `key` and apply both expiry policies.
    fn load_live(&self, key: &str, now: DateTime<Utc>) -> Result<Paste, AppError> {
        let Some(paste) = self.store.get(key)? else {
            tracing::debug!("{} not served: {}", key, NotFoundReason::Missing);
            return Err(AppError::NotFound);
        };
        if let Some(reason) = paste.exhaustion(now) {
            self.discard(key, reason);
            return Err(AppError::NotFound);
        }
        Ok(paste)
    }

    /// Best-effort deletion of an exhausted record.
    fn discard(&self, key: &str, reason: NotFoundReason) {
        tracing::debug!("{} not served: {}", key, reason);
        if let Err(err) = self.store.delete(key) {
            tracing::warn!("Failed to delete {} paste {}: {}", reason, key, err);
        }
    }
}
