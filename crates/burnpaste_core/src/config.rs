//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_MAX_PASTE_SIZE, DEFAULT_PORT, DEFAULT_PURGE_INTERVAL_SECS, MEMORY_DB_PATH,
};
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Runtime configuration for burnpaste.
///
/// Built once at startup and handed to the server; the core never reads the
/// environment while serving requests.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_paste_size: usize,
    /// Seconds between background reclamation passes; `0` disables the task.
    pub purge_interval_secs: u64,
    /// Honour the `x-test-now-ms` request header as the current instant.
    pub test_mode: bool,
    /// Base used for paste locators instead of the request `Host` header.
    pub public_base_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: MEMORY_DB_PATH.to_string(),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            max_paste_size: DEFAULT_MAX_PASTE_SIZE,
            purge_interval_secs: DEFAULT_PURGE_INTERVAL_SECS,
            test_mode: false,
            public_base_url: None,
        }
    }
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    env::current_dir().ok()
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring unparseable {}='{}'", name, raw);
                None
            }
        },
        Err(_) => None,
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            db_path: env::var("DB_PATH")
                .ok()
                .filter(|path| !path.trim().is_empty())
                .map(expand_tilde)
                .unwrap_or_else(|| {
                    let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
                    let data_dir = home.join(".cache").join("burnpaste");
                    data_dir.join("db").to_string_lossy().to_string()
                }),
            host: env_parsed("HOST").unwrap_or(defaults.host),
            port: env_parsed("PORT").unwrap_or(defaults.port),
            max_paste_size: env_parsed("MAX_PASTE_SIZE").unwrap_or(defaults.max_paste_size),
            purge_interval_secs: env_parsed("PURGE_INTERVAL_SECS")
                .unwrap_or(defaults.purge_interval_secs),
            test_mode: env_flag_enabled("TEST_MODE"),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .ok()
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
        }
    }

    /// Socket address the HTTP listener binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the configured database path selects the in-memory store.
    pub fn uses_memory_store(&self) -> bool {
        self.db_path == MEMORY_DB_PATH
    }
}
