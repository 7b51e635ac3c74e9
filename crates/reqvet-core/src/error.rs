//! # Error Types
//!
//! Two distinct error families, kept deliberately separate:
//!
//! - [`SchemaError`] — configuration errors raised while parsing a schema
//!   declaration. These are fatal to endpoint initialization and are never
//!   produced per request.
//! - [`ErrorMap`] — the field-addressed collection of violation messages
//!   produced by validating one document. An empty map means the document
//!   passed. Error maps are per-request values, created fresh and discarded
//!   when the request completes.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Configuration errors detected at schema-construction time.
///
/// A malformed declaration is a programming mistake in the endpoint
/// definition, so these fail process initialization loudly instead of
/// surfacing over the wire.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema declaration was not a JSON object.
    #[error("schema declaration must be a mapping, got {0}")]
    NotAMapping(String),

    /// A field rule declaration was not a JSON object.
    #[error("rule declaration for field '{field}' must be a mapping")]
    RuleNotAMapping {
        /// The field whose declaration is malformed.
        field: String,
    },

    /// A `type` entry named a type the engine does not know.
    #[error("field '{field}' declares unknown type '{name}'")]
    UnknownType {
        /// The field carrying the bad declaration.
        field: String,
        /// The unrecognized type name.
        name: String,
    },

    /// A rule name did not resolve to a registered check function.
    #[error("field '{field}' references unregistered rule '{name}'")]
    UnknownRule {
        /// The field carrying the bad declaration.
        field: String,
        /// The unresolved rule name.
        name: String,
    },

    /// A `coerce` entry did not resolve to a registered coercion.
    #[error("field '{field}' references unregistered coercion '{name}'")]
    UnknownCoercion {
        /// The field carrying the bad declaration.
        field: String,
        /// The unresolved coercion name.
        name: String,
    },

    /// A rule argument had the wrong shape (e.g. `required: "yes"`).
    #[error("invalid '{rule}' declaration for field '{field}': {reason}")]
    InvalidRule {
        /// The field carrying the bad declaration.
        field: String,
        /// The rule whose argument is malformed.
        rule: String,
        /// Why the argument was rejected.
        reason: String,
    },

    /// A `regex` pattern failed to compile.
    #[error("field '{field}' declares invalid regex '{pattern}': {reason}")]
    InvalidRegex {
        /// The field carrying the bad declaration.
        field: String,
        /// The pattern that failed to compile.
        pattern: String,
        /// The compiler's diagnostic.
        reason: String,
    },
}

/// One entry in a field's violation sequence: either a plain message or,
/// for nested schemas, an embedded error map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorEntry {
    /// A human-readable violation message.
    Message(String),
    /// A nested error map produced by a sub-schema.
    Nested(ErrorMap),
}

/// Field-addressed collection of violation messages.
///
/// Maps each offending field name to the ordered sequence of violations
/// detected for it. Nested schema failures embed a whole [`ErrorMap`] as a
/// single entry, so the wire shape for a nested failure is a one-element
/// list containing a map:
///
/// ```json
/// {"schema_test": [{"enabled": ["required field"], "phone": ["unknown field"]}]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ErrorMap(BTreeMap<String, Vec<ErrorEntry>>);

impl ErrorMap {
    /// Create an empty error map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the map holds no violations. Empty map ⇔ validation success.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of offending fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Append a violation message under `field`.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(ErrorEntry::Message(message.into()));
    }

    /// Append every message in `messages` under `field`, preserving order.
    pub fn extend(&mut self, field: &str, messages: Vec<String>) {
        let entry = self.0.entry(field.to_string()).or_default();
        entry.extend(messages.into_iter().map(ErrorEntry::Message));
    }

    /// Embed a nested error map under `field`.
    pub fn push_nested(&mut self, field: &str, nested: ErrorMap) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(ErrorEntry::Nested(nested));
    }

    /// The violation entries recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[ErrorEntry]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Iterate over `(field, entries)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ErrorEntry])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Render the map as a `serde_json::Value` in its wire shape.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).expect("error map serialization is infallible")
    }
}

impl std::fmt::Display for ErrorMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_value())
    }
}
