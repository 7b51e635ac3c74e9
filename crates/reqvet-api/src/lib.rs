//! # reqvet-api — Axum HTTP Layer for reqvet
//!
//! Binds the `reqvet-core` validation engine to HTTP request channels.
//! Each endpoint declares validators for the channels it reads — query
//! string, form data, JSON body, file uploads — and gets back either the
//! normalized input or a uniform JSON error envelope naming the offending
//! channel and fields.
//!
//! ## API Surface
//!
//! | Route                  | Methods            | Channel       |
//! |------------------------|--------------------|---------------|
//! | `/api/validate_qs`     | GET, POST, OPTIONS | query string  |
//! | `/api/validate_form`   | POST, OPTIONS      | form data     |
//! | `/api/validate_json`   | POST, OPTIONS      | JSON body     |
//! | `/api/validate_files`  | POST, OPTIONS      | file uploads  |
//! | `/health/liveness`     | GET                | —             |
//!
//! ## Error Envelope
//!
//! ```json
//! {"error": {"code": "INVALID_INPUT_FORMAT_JSON",
//!            "message": "Invalid input format for 'validate_json'",
//!            "data": {"min_max_integer_test": ["min value is 5"]}}}
//! ```

pub mod error;
pub mod response;
pub mod routes;
pub mod state;
pub mod validator;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::validator::ValidatorConfigError;

/// Assemble the full application router.
///
/// Health probes are mounted alongside the validated routes; they carry
/// no validators and always answer.
///
/// # Errors
///
/// Returns [`ValidatorConfigError`] if any endpoint's schema declaration
/// fails to compile. Callers treat this as fatal at startup.
pub fn app() -> Result<Router, ValidatorConfigError> {
    let state = AppState::new()?;

    let api = Router::new()
        .nest("/api", routes::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new().route("/health/liveness", axum::routing::get(liveness));

    Ok(Router::new().merge(health).merge(api))
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}
