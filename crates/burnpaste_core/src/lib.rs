//! Core domain library for burnpaste (records, expiry policy, storage).

/// Clock sources used for expiry checks.
pub mod clock;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Application error types (storage/domain).
pub mod error;
/// Per-id serialization of read-modify-write sequences.
pub mod locks;
/// Data models for API requests and persistence.
pub mod models;
/// Paste identifier generation.
pub mod naming;
/// Paste lifecycle orchestration.
pub mod service;
/// Record store trait and engines.
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use constants::DEFAULT_PORT;
pub use error::{AppError, NotFoundReason};
pub use locks::PasteLockManager;
pub use naming::{IdGenerator, RandomIdGenerator};
pub use service::PasteService;
pub use store::{MemoryStore, PasteStore, RedbStore};
