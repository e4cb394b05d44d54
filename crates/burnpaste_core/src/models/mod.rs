//! Data models for pastes and their request/response payloads.

/// Paste record, request validation, and read views.
pub mod paste;
