//! HTTP request handlers.

/// Health endpoint.
pub mod health;
/// Paste-related endpoints.
pub mod paste;

use crate::{error::HttpError, AppState};
use axum::http::HeaderMap;
use burnpaste_core::clock::from_epoch_millis;
use burnpaste_core::constants::TEST_NOW_HEADER;
use chrono::{DateTime, Utc};

/// Instant a request should be evaluated at.
///
/// Outside test mode this is always the service clock. In test mode a
/// well-formed `x-test-now-ms` header overrides it; anything unparseable is
/// ignored.
pub(crate) fn request_now(state: &AppState, headers: &HeaderMap) -> DateTime<Utc> {
    if state.config.test_mode {
        if let Some(millis) = header_millis(headers) {
            return from_epoch_millis(millis);
        }
    }
    state.service.now()
}

fn header_millis(headers: &HeaderMap) -> Option<i64> {
    let raw = headers.get(TEST_NOW_HEADER)?.to_str().ok()?;
    match raw.trim().parse::<i64>() {
        Ok(millis) if millis >= 0 => Some(millis),
        _ => {
            tracing::debug!("Ignoring malformed {} header '{}'", TEST_NOW_HEADER, raw);
            None
        }
    }
}

/// Run a synchronous store operation off the async executor.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, HttpError>
where
    F: FnOnce() -> Result<T, burnpaste_core::AppError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(HttpError::from),
        Err(err) => {
            tracing::error!("Blocking paste task failed: {}", err);
            Err(HttpError::Internal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::header_millis;
    use axum::http::{HeaderMap, HeaderValue};
    use burnpaste_core::constants::TEST_NOW_HEADER;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(TEST_NOW_HEADER, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn header_millis_accepts_non_negative_integers() {
        assert_eq!(header_millis(&headers_with("0")), Some(0));
        assert_eq!(header_millis(&headers_with(" 1700000000000 ")), Some(1_700_000_000_000));
    }

    #[test]
    fn header_millis_ignores_malformed_values() {
        for value in ["", "soon", "-5", "1.5"] {
            assert_eq!(header_millis(&headers_with(value)), None, "value: {}", value);
        }
        assert_eq!(header_millis(&HeaderMap::new()), None);
    }
}
