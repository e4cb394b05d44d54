//! Shared constants used across burnpaste crates.

/// Default API port.
pub const DEFAULT_PORT: u16 = 3000;

/// Length of generated public paste ids.
pub const PASTE_ID_LEN: usize = 10;

/// Prefix prepended to paste ids to form store keys.
pub const PASTE_KEY_PREFIX: &str = "paste:";

/// Default maximum paste size accepted by the API layer.
pub const DEFAULT_MAX_PASTE_SIZE: usize = 1024 * 1024;

/// Default interval between background reclamation passes, in seconds.
pub const DEFAULT_PURGE_INTERVAL_SECS: u64 = 60;

/// Request header carrying a simulated "now" (epoch millis) in test mode.
pub const TEST_NOW_HEADER: &str = "x-test-now-ms";

/// `DB_PATH` value that selects the in-memory store.
pub const MEMORY_DB_PATH: &str = ":memory:";

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "pastes.redb";

/// How many fresh ids `create` tries before giving up on a collision streak.
pub const MAX_ID_ATTEMPTS: usize = 3;
