//! Per-paste serialization for read-check-write sequences.
//!
//! Each in-flight paste id owns a slot in a shared map with its own mutex and
//! condition variable. A slot lives only while a guard holds it or callers
//! wait on it, so the map stays bounded by the number of concurrently
//! accessed ids.

use crate::error::AppError;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

/// Lock-manager runtime errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteLockError {
    /// Internal mutex state is poisoned.
    Poisoned,
}

impl fmt::Display for PasteLockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Poisoned => write!(f, "paste lock manager state is poisoned"),
        }
    }
}

impl std::error::Error for PasteLockError {}

impl From<PasteLockError> for AppError {
    fn from(err: PasteLockError) -> Self {
        AppError::StoreUnavailable(err.to_string())
    }
}

/// Hand-off point for one paste id.
#[derive(Default)]
struct Slot {
    held: Mutex<bool>,
    released: Condvar,
}

/// Map entry: the slot plus how many callers hold or await it.
struct SlotEntry {
    slot: Arc<Slot>,
    users: usize,
}

/// Grants exclusive access to one paste id at a time.
///
/// Releasing an id wakes only callers waiting on that id.
#[derive(Default)]
pub struct PasteLockManager {
    slots: Mutex<HashMap<String, SlotEntry>>,
}

/// Exclusive hold on a paste id; released on drop.
pub struct PasteGuard<'a> {
    manager: &'a PasteLockManager,
    slot: Arc<Slot>,
    paste_id: String,
}

impl PasteGuard<'_> {
    pub fn paste_id(&self) -> &str {
        &self.paste_id
    }
}

impl Drop for PasteGuard<'_> {
    fn drop(&mut self) {
        match self.slot.held.lock() {
            Ok(mut held) => *held = false,
            Err(poisoned) => *poisoned.into_inner() = false,
        }
        self.slot.released.notify_one();
        self.manager.leave(&self.paste_id);
    }
}

impl PasteLockManager {
    fn slots(&self) -> Result<MutexGuard<'_, HashMap<String, SlotEntry>>, PasteLockError> {
        self.slots.lock().map_err(|_| PasteLockError::Poisoned)
    }

    /// Register interest in `paste_id` and return its slot.
    fn enter(&self, paste_id: &str) -> Result<Arc<Slot>, PasteLockError> {
        let mut slots = self.slots()?;
        let entry = slots
            .entry(paste_id.to_string())
            .or_insert_with(|| SlotEntry {
                slot: Arc::new(Slot::default()),
                users: 0,
            });
        entry.users += 1;
        Ok(Arc::clone(&entry.slot))
    }

    /// Drop interest in `paste_id`, evicting its slot once nobody is left.
    fn leave(&self, paste_id: &str) {
        let Ok(mut slots) = self.slots.lock() else {
            tracing::error!(
                "Failed to release paste lock for {}: lock manager poisoned",
                paste_id
            );
            return;
        };
        let evict = match slots.get_mut(paste_id) {
            Some(entry) => {
                entry.users = entry.users.saturating_sub(1);
                entry.users == 0
            }
            None => false,
        };
        if evict {
            slots.remove(paste_id);
        }
    }

    /// Block until `paste_id` is free, then hold it.
    ///
    /// # Returns
    /// A guard that releases the id when dropped.
    ///
    /// # Errors
    /// Returns [`PasteLockError::Poisoned`] when lock state is poisoned.
    pub fn lock(&self, paste_id: &str) -> Result<PasteGuard<'_>, PasteLockError> {
        let slot = self.enter(paste_id)?;
        let acquired = slot
            .held
            .lock()
            .map_err(|_| PasteLockError::Poisoned)
            .and_then(|held| {
                let mut held = slot
                    .released
                    .wait_while(held, |held| *held)
                    .map_err(|_| PasteLockError::Poisoned)?;
                *held = true;
                Ok(())
            });
        if let Err(err) = acquired {
            self.leave(paste_id);
            return Err(err);
        }
        Ok(PasteGuard {
            manager: self,
            slot,
            paste_id: paste_id.to_string(),
        })
    }

    /// Whether some caller currently holds `paste_id`.
    pub fn is_locked(&self, paste_id: &str) -> Result<bool, PasteLockError> {
        let slot = match self.slots()?.get(paste_id) {
            Some(entry) => Arc::clone(&entry.slot),
            None => return Ok(false),
        };
        let held = slot.held.lock().map_err(|_| PasteLockError::Poisoned)?;
        Ok(*held)
    }

    /// Number of ids with a live slot (held or awaited).
    pub fn active_count(&self) -> Result<usize, PasteLockError> {
        Ok(self.slots()?.len())
    }
}
