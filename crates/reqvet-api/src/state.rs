//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! Every endpoint's [`RequestValidator`] is compiled here, once, at
//! startup. Compilation failures (bad schema declarations, contradictory
//! channel combinations) abort the process before it binds a socket; no
//! misconfigured endpoint ever serves traffic. The compiled validators
//! are immutable, so the whole set is shared across in-flight requests
//! behind one `Arc` with no locking.

use std::sync::Arc;

use reqvet_core::RuleRegistry;
use serde_json::json;

use crate::validator::{RequestValidator, ValidatorConfigError};

/// The compiled validator for each endpoint.
#[derive(Debug)]
pub struct Validators {
    /// Query-string demonstration endpoint.
    pub qs: RequestValidator,
    /// Form-data demonstration endpoint.
    pub form: RequestValidator,
    /// JSON-body demonstration endpoint.
    pub json: RequestValidator,
    /// File-upload demonstration endpoint.
    pub files: RequestValidator,
}

impl Validators {
    /// Compile every endpoint's validator against `registry`.
    pub fn new(registry: &RuleRegistry) -> Result<Self, ValidatorConfigError> {
        let qs = RequestValidator::builder("validate_qs")
            .qs(json!({
                "date_test": {"type": "string", "is_date": true},
                "allowed_test": {"type": "string", "allowed": ["a", "b", "c"]},
                "empty_test": {"type": "string", "empty": false},
            }))
            .build(registry)?;

        let form = RequestValidator::builder("validate_form")
            .form(json!({
                "leading_space_word": {"type": "string", "coerce": "trim"},
                "email_regex_test": {
                    "type": "string",
                    "regex": r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$",
                },
                "webhook_url": {
                    "type": "string",
                    "required": false,
                    "nullable": true,
                    "dependencies": "webhook_token",
                },
                "webhook_token": {
                    "type": "string",
                    "required": false,
                    "nullable": true,
                    "dependencies": "webhook_url",
                },
            }))
            .build(registry)?;

        let json = RequestValidator::builder("validate_json")
            .json(json!({
                "contains_test": {"type": "list", "contains": ["a", "b"]},
                "min_max_integer_test": {"type": "integer", "min": 5, "max": 10},
                "schema_test": {"type": "dict", "schema": {
                    "name": {"type": "string", "required": true},
                    "enabled": {"type": "boolean", "required": true},
                }},
            }))
            .build(registry)?;

        let files = RequestValidator::builder("validate_files")
            .file("file_test", true)
            .build(registry)?;

        Ok(Self {
            qs,
            form,
            json,
            files,
        })
    }
}

/// Shared application state: the compiled validator set.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Compiled per-endpoint validators.
    pub validators: Arc<Validators>,
}

impl AppState {
    /// Build the state with the default rule registry.
    pub fn new() -> Result<Self, ValidatorConfigError> {
        Self::with_registry(&RuleRegistry::default())
    }

    /// Build the state against a caller-supplied registry, e.g. one
    /// extended with additional custom rules.
    pub fn with_registry(registry: &RuleRegistry) -> Result<Self, ValidatorConfigError> {
        Ok(Self {
            validators: Arc::new(Validators::new(registry)?),
        })
    }
}
