//! Paste HTTP handlers.

use super::{blocking, request_now};
use crate::{error::HttpError, models::paste::*, AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use burnpaste_core::naming::is_valid_paste_id;
use serde::Serialize;

/// Body returned by a successful create.
#[derive(Debug, Serialize)]
pub struct CreatedPasteResponse {
    pub id: String,
    pub url: String,
}

/// Create a paste.
///
/// # Returns
/// `201` with the new id and its view locator.
///
/// # Errors
/// `400` for invalid input, `413` for oversized content, `503` when the store
/// is unreachable.
pub async fn create_paste(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreatePasteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedPasteResponse>), HttpError> {
    let Json(req) = payload?;
    let now = request_now(&state, &headers);
    let service = state.service.clone();
    let paste = blocking(move || service.create_at(req, now)).await?;

    let url = format!("{}/p/{}", locator_base(&state, &headers), paste.id);
    Ok((
        StatusCode::CREATED,
        Json(CreatedPasteResponse { id: paste.id, url }),
    ))
}

/// Inspect a paste without using up a view.
///
/// # Errors
/// `404` when the paste is missing, expired, or out of views.
pub async fn get_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    if !is_valid_paste_id(&id) {
        return Err(HttpError::from(crate::AppError::NotFound));
    }
    let now = request_now(&state, &headers);
    let service = state.service.clone();
    let view = blocking(move || service.peek_at(&id, now)).await?;
    Ok(no_store(Json(view).into_response()))
}

/// Render a paste as plain text, using up one view.
///
/// Absent pastes get a plain-text `404` so browsers show a readable page.
pub async fn view_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !is_valid_paste_id(&id) {
        return plain_not_found();
    }
    let now = request_now(&state, &headers);
    let service = state.service.clone();
    match blocking(move || service.consume_at(&id, now)).await {
        Ok(view) => no_store(
            (
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                view.content,
            )
                .into_response(),
        ),
        Err(err) if err.is_not_found() => plain_not_found(),
        Err(err) => err.into_response(),
    }
}

fn plain_not_found() -> Response {
    no_store(
        (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "Not found",
        )
            .into_response(),
    )
}

fn no_store(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// Scheme and authority used in paste locators.
fn locator_base(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(base) = state.config.public_base_url.as_deref() {
        return base.to_string();
    }
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .unwrap_or("localhost");
    format!("http://{}", host)
}
