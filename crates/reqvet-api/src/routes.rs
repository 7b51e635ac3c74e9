//! # Demonstration Endpoints
//!
//! One endpoint per request channel, each exercising a slice of the rule
//! vocabulary:
//!
//! - `GET|POST /validate_qs` — query-string validation (`is_date`,
//!   `allowed`, `empty`);
//! - `POST /validate_form` — form-data validation (`trim` coercion,
//!   `regex`, `dependencies`), echoing the normalized field back;
//! - `POST /validate_json` — JSON-body validation (`contains`,
//!   `min`/`max`, nested `schema`);
//! - `POST /validate_files` — multipart upload presence check.
//!
//! Handlers never parse-fail a request outright: an unreadable form or
//! JSON body validates as an empty document, so missing-input errors come
//! out of the validator with the uniform error envelope instead of an
//! extractor-specific body. All routes also accept `OPTIONS` so CORS
//! preflights pass the validators unharmed.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::FormRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::Method;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::{json, Map, Value};

use crate::error::ApiError;
use crate::response::api_result;
use crate::state::AppState;

/// Build the demonstration router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/validate_qs",
            get(validate_qs).post(validate_qs).options(validate_qs),
        )
        .route(
            "/validate_form",
            post(validate_form).options(validate_form),
        )
        .route(
            "/validate_json",
            post(validate_json).options(validate_json),
        )
        .route(
            "/validate_files",
            post(validate_files).options(validate_files),
        )
}

/// Lift flat string parameters (query string, form fields) into a
/// validation document.
fn to_document(params: HashMap<String, String>) -> Map<String, Value> {
    params
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}

/// GET|POST /validate_qs — validate URL-encoded query parameters.
async fn validate_qs(
    State(state): State<AppState>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let doc = to_document(params);
    state.validators.qs.check_query(&method, &doc)?;
    Ok(api_result(json!("success")))
}

/// POST /validate_form — validate form fields and echo the trimmed word.
async fn validate_form(
    State(state): State<AppState>,
    method: Method,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Json<Value>, ApiError> {
    // An unreadable body validates as an empty document.
    let doc = to_document(form.map(|Form(fields)| fields).unwrap_or_default());
    let normalized = state.validators.form.check_form(&method, &doc)?;

    let payload = match normalized.get("leading_space_word") {
        Some(word) => json!({ "leading_space_word": word }),
        None => json!("success"),
    };
    Ok(api_result(payload))
}

/// POST /validate_json — validate the JSON request body.
async fn validate_json(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    // Malformed JSON and non-object bodies validate as an empty document.
    let doc = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|v| v.as_object().cloned())
        .unwrap_or_default();
    state.validators.json.check_json(&method, &doc)?;
    Ok(api_result(json!("success")))
}

/// POST /validate_files — require an uploaded file and echo its filename.
async fn validate_files(
    State(state): State<AppState>,
    method: Method,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    let mut present: Vec<String> = Vec::new();
    let mut filename = String::new();

    if let Ok(mut multipart) = multipart {
        while let Ok(Some(field)) = multipart.next_field().await {
            // Only parts carrying a filename count as uploads.
            let (Some(name), Some(file_name)) = (field.name(), field.file_name()) else {
                continue;
            };
            if name == "file_test" && filename.is_empty() {
                filename = file_name.to_string();
            }
            present.push(name.to_string());
        }
    }

    state.validators.files.check_files(&method, &present)?;
    Ok(api_result(json!(filename)))
}
