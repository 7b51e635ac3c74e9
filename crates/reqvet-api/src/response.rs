//! # API Success Envelope
//!
//! Uniform success bodies: scalar and object payloads wrap as
//! `{"result": ...}`, sequences as `{"results": [...]}`. Keeping the two
//! keys distinct lets clients branch on the envelope without inspecting
//! the payload type.

use axum::Json;
use serde_json::{json, Value};

/// Wrap a payload in the success envelope.
///
/// ```
/// use reqvet_api::response::api_result;
/// use serde_json::json;
///
/// assert_eq!(api_result(json!("success")).0, json!({"result": "success"}));
/// assert_eq!(api_result(json!([1, 2])).0, json!({"results": [1, 2]}));
/// ```
pub fn api_result(data: Value) -> Json<Value> {
    match data {
        Value::Array(items) => Json(json!({ "results": items })),
        other => Json(json!({ "result": other })),
    }
}
