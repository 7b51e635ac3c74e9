//! # Request Validator Facade
//!
//! Binds compiled schemas to one endpoint's request channels. A
//! [`RequestValidator`] covers up to three validated channels — query
//! string, form data, JSON body — plus a presence-only check for file
//! uploads. Channel failures map to the channel's [`ApiError`] variant,
//! each with its own error code, so a client can tell *where* in the
//! request the bad input lives.
//!
//! Construction rejects contradictory channel combinations: a JSON body
//! cannot coexist with form data or file uploads, since they occupy the
//! same request payload.
//!
//! CORS preflight requests carry no meaningful payload, so `OPTIONS`
//! requests bypass rejection: validation still runs, but failures do not
//! produce an error response.

use axum::http::Method;
use reqvet_core::{ErrorMap, RuleRegistry, Schema, SchemaError};
use serde_json::{Map, Value};
use thiserror::Error;

/// Endpoint misconfiguration detected while building a [`RequestValidator`].
///
/// These abort process startup; a misconfigured endpoint never serves
/// traffic.
#[derive(Error, Debug)]
pub enum ValidatorConfigError {
    /// `form` and `json` both declared for one endpoint.
    #[error("endpoint '{0}' can't have 'form' and 'json' at the same time")]
    JsonWithForm(String),

    /// `files` and `json` both declared for one endpoint.
    #[error("endpoint '{0}' can't have 'files' and 'json' at the same time")]
    JsonWithFiles(String),

    /// A channel's schema declaration failed to parse.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Per-endpoint request validator.
///
/// Immutable once built; share it across in-flight requests via the
/// router state.
#[derive(Debug)]
pub struct RequestValidator {
    endpoint: String,
    qs: Option<Schema>,
    form: Option<Schema>,
    json: Option<Schema>,
    /// File field names mapped to whether each is required.
    files: Vec<(String, bool)>,
}

/// Builder for [`RequestValidator`]; see [`RequestValidator::builder`].
#[derive(Debug, Default)]
pub struct RequestValidatorBuilder {
    endpoint: String,
    qs: Option<Value>,
    form: Option<Value>,
    json: Option<Value>,
    files: Vec<(String, bool)>,
}

impl RequestValidatorBuilder {
    /// Declare the query-string schema.
    pub fn qs(mut self, decl: Value) -> Self {
        self.qs = Some(decl);
        self
    }

    /// Declare the form-data schema.
    pub fn form(mut self, decl: Value) -> Self {
        self.form = Some(decl);
        self
    }

    /// Declare the JSON-body schema.
    pub fn json(mut self, decl: Value) -> Self {
        self.json = Some(decl);
        self
    }

    /// Declare a file field and whether it is required.
    pub fn file(mut self, field: impl Into<String>, required: bool) -> Self {
        self.files.push((field.into(), required));
        self
    }

    /// Compile every declared schema against `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorConfigError`] on contradictory channel
    /// combinations or a schema declaration that fails to parse.
    pub fn build(self, registry: &RuleRegistry) -> Result<RequestValidator, ValidatorConfigError> {
        if self.json.is_some() {
            if self.form.is_some() {
                return Err(ValidatorConfigError::JsonWithForm(self.endpoint));
            }
            if !self.files.is_empty() {
                return Err(ValidatorConfigError::JsonWithFiles(self.endpoint));
            }
        }

        let compile = |decl: Option<Value>| -> Result<Option<Schema>, SchemaError> {
            decl.map(|d| Schema::from_value(registry, &d)).transpose()
        };

        Ok(RequestValidator {
            endpoint: self.endpoint,
            qs: compile(self.qs)?,
            form: compile(self.form)?,
            json: compile(self.json)?,
            files: self.files,
        })
    }
}

impl RequestValidator {
    /// Start building a validator for `endpoint`. The endpoint name
    /// appears in error messages, not in routing.
    pub fn builder(endpoint: impl Into<String>) -> RequestValidatorBuilder {
        RequestValidatorBuilder {
            endpoint: endpoint.into(),
            ..RequestValidatorBuilder::default()
        }
    }

    /// The endpoint this validator was built for.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Validate query-string parameters, returning the normalized document.
    pub fn check_query(
        &self,
        method: &Method,
        doc: &Map<String, Value>,
    ) -> Result<Map<String, Value>, ChannelError> {
        self.check_channel(&self.qs, method, doc, Channel::QueryString)
    }

    /// Validate form-data fields, returning the normalized document.
    pub fn check_form(
        &self,
        method: &Method,
        doc: &Map<String, Value>,
    ) -> Result<Map<String, Value>, ChannelError> {
        self.check_channel(&self.form, method, doc, Channel::FormData)
    }

    /// Validate the JSON body, returning the normalized document.
    pub fn check_json(
        &self,
        method: &Method,
        doc: &Map<String, Value>,
    ) -> Result<Map<String, Value>, ChannelError> {
        self.check_channel(&self.json, method, doc, Channel::Json)
    }

    /// Presence-only check for declared file fields. `present` lists the
    /// file field names found in the multipart body.
    pub fn check_files(
        &self,
        method: &Method,
        present: &[String],
    ) -> Result<(), ChannelError> {
        if *method == Method::OPTIONS {
            return Ok(());
        }
        for (field, required) in &self.files {
            if *required && !present.contains(field) {
                return Err(ChannelError::Files {
                    endpoint: self.endpoint.clone(),
                    field: field.clone(),
                });
            }
        }
        Ok(())
    }

    fn check_channel(
        &self,
        schema: &Option<Schema>,
        method: &Method,
        doc: &Map<String, Value>,
        channel: Channel,
    ) -> Result<Map<String, Value>, ChannelError> {
        let Some(schema) = schema else {
            // Channel not declared for this endpoint: pass through as-is.
            return Ok(doc.clone());
        };

        let result = schema.validate(doc);
        if !result.is_ok() && *method != Method::OPTIONS {
            tracing::debug!(
                endpoint = %self.endpoint,
                channel = ?channel,
                errors = %result.errors,
                "request rejected",
            );
            return Err(ChannelError::Input {
                endpoint: self.endpoint.clone(),
                channel,
                errors: result.errors,
            });
        }
        Ok(result.normalized)
    }
}

/// The request channel a validation failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// URL-encoded query-string parameters.
    QueryString,
    /// `application/x-www-form-urlencoded` or multipart form fields.
    FormData,
    /// `application/json` request body.
    Json,
}

/// Channel-tagged validation failure, converted to [`ApiError`] at the
/// handler boundary.
#[derive(Debug)]
pub enum ChannelError {
    /// A validated channel rejected the document.
    Input {
        /// The endpoint whose validator rejected the input.
        endpoint: String,
        /// Which channel failed.
        channel: Channel,
        /// Field-addressed violations.
        errors: ErrorMap,
    },
    /// A required file field is missing.
    Files {
        /// The endpoint whose validator rejected the input.
        endpoint: String,
        /// The missing file field.
        field: String,
    },
}

impl From<ChannelError> for crate::error::ApiError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::Input {
                endpoint,
                channel,
                errors,
            } => match channel {
                Channel::QueryString => Self::InvalidQueryString { endpoint, errors },
                Channel::FormData => Self::InvalidFormData { endpoint, errors },
                Channel::Json => Self::InvalidJson { endpoint, errors },
            },
            ChannelError::Files { endpoint, field } => {
                Self::InvalidFiles { endpoint, field }
            }
        }
    }
}
