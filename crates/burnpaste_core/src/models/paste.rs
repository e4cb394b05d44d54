//! Paste record, creation payload, and read views.

use crate::error::{AppError, NotFoundReason};
use chrono::serde::{ts_milliseconds, ts_milliseconds_option};
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Number;

/// Largest integer a JSON client can send without losing precision.
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Paste record as persisted in the store.
///
/// Timestamps are stored as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paste {
    pub id: String,
    pub content: String,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "ts_milliseconds_option")]
    pub expires_at: Option<DateTime<Utc>>,
    pub max_views: Option<u64>,
    pub views: u64,
}

/// Request payload for creating a paste.
///
/// Policy fields are kept as raw JSON numbers so non-integral or negative
/// values reach validation instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePasteRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub ttl_seconds: Option<Number>,
    #[serde(default)]
    pub max_views: Option<Number>,
}

/// Creation input that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaste {
    pub content: String,
    pub ttl_seconds: Option<u64>,
    pub max_views: Option<u64>,
}

/// What a successful peek or consume hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasteView {
    pub content: String,
    pub remaining_views: Option<u64>,
    #[serde(serialize_with = "serialize_expires_at")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreatePasteRequest {
    /// Request with content only (no time or view limit).
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ttl_seconds: None,
            max_views: None,
        }
    }

    pub fn with_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = Some(Number::from(ttl_seconds));
        self
    }

    pub fn with_max_views(mut self, max_views: u64) -> Self {
        self.max_views = Some(Number::from(max_views));
        self
    }

    /// Check content and policy fields.
    ///
    /// # Arguments
    /// - `max_size`: Maximum content length in bytes.
    ///
    /// # Errors
    /// Returns the first failing input error, checked in field order.
    pub fn validate(self, max_size: usize) -> Result<NewPaste, AppError> {
        let content = match self.content {
            Some(content) if !content.trim().is_empty() => content,
            _ => return Err(AppError::InvalidContent),
        };
        if content.len() > max_size {
            return Err(AppError::PayloadTooLarge { limit: max_size });
        }
        let ttl_seconds = match self.ttl_seconds.as_ref() {
            Some(raw) => Some(positive_integer(raw).ok_or(AppError::InvalidTtl)?),
            None => None,
        };
        let max_views = match self.max_views.as_ref() {
            Some(raw) => Some(positive_integer(raw).ok_or(AppError::InvalidMaxViews)?),
            None => None,
        };
        Ok(NewPaste {
            content,
            ttl_seconds,
            max_views,
        })
    }
}

/// Interpret a JSON number as an integer >= 1.
///
/// Integral floats such as `3.0` count as integers; `1.5`, `0`, and negatives
/// do not.
pub fn positive_integer(raw: &Number) -> Option<u64> {
    if let Some(value) = raw.as_u64() {
        return (1..=MAX_SAFE_INTEGER).contains(&value).then_some(value);
    }
    let value = raw.as_f64()?;
    if value.is_finite() && value.fract() == 0.0 && value >= 1.0 && value <= MAX_SAFE_INTEGER as f64
    {
        Some(value as u64)
    } else {
        None
    }
}

impl Paste {
    /// Build a fresh record with zero views.
    ///
    /// Deadlines past chrono's range saturate at [`DateTime::<Utc>::MAX_UTC`].
    pub fn new(id: String, input: NewPaste, now: DateTime<Utc>) -> Self {
        Self {
            id,
            content: input.content,
            created_at: now,
            expires_at: input.ttl_seconds.map(|ttl| expiry_after(now, ttl)),
            max_views: input.max_views,
            views: 0,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    pub fn is_view_limit_reached(&self) -> bool {
        self.max_views.is_some_and(|max| self.views >= max)
    }

    /// Why this record must no longer be served at `now`, if at all.
    ///
    /// Time expiry is reported ahead of view exhaustion.
    pub fn exhaustion(&self, now: DateTime<Utc>) -> Option<NotFoundReason> {
        if self.is_expired(now) {
            Some(NotFoundReason::Expired)
        } else if self.is_view_limit_reached() {
            Some(NotFoundReason::ViewLimitReached)
        } else {
            None
        }
    }

    /// Views left before the record is exhausted; `None` means unlimited.
    pub fn remaining_views(&self) -> Option<u64> {
        self.max_views.map(|max| max.saturating_sub(self.views))
    }

    pub fn view(&self) -> PasteView {
        PasteView {
            content: self.content.clone(),
            remaining_views: self.remaining_views(),
            expires_at: self.expires_at,
        }
    }
}

fn expiry_after(now: DateTime<Utc>, ttl_seconds: u64) -> DateTime<Utc> {
    i64::try_from(ttl_seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Render an expiry deadline as ISO-8601 UTC with millisecond precision.
pub fn format_expires_at(expires_at: &DateTime<Utc>) -> String {
    expires_at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_expires_at<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(expires_at) => serializer.serialize_some(&format_expires_at(expires_at)),
        None => serializer.serialize_none(),
    }
}
