#![deny(missing_docs)]

//! # reqvet-core — Declarative Request Validation
//!
//! A schema-driven validation engine for untrusted structured input. An
//! endpoint declares its expected fields as a JSON rule mapping; the engine
//! checks a document against the compiled schema and returns a normalized
//! copy plus a field-addressed error map.
//!
//! ## Design Principles
//!
//! 1. **Fail fast on configuration, accumulate on input.** A malformed
//!    schema declaration is a [`SchemaError`] at construction time, before
//!    any traffic. A malformed *document* never aborts early: every
//!    violated constraint on every field lands in the [`ErrorMap`].
//!
//! 2. **Explicit rule dispatch.** Custom rule and coercion names resolve
//!    through the [`RuleRegistry`] when the schema is built, not by
//!    reflective lookup per request.
//!
//! 3. **Immutable compiled schemas.** A [`Schema`] holds no interior
//!    mutability and is safe to share (`Arc<Schema>`) across concurrent
//!    requests; [`Schema::validate`] never mutates its input document.
//!
//! ```
//! use reqvet_core::{RuleRegistry, Schema};
//! use serde_json::json;
//!
//! let registry = RuleRegistry::default();
//! let schema = Schema::from_value(&registry, &json!({
//!     "name": {"type": "string", "required": true, "coerce": "trim"},
//!     "age":  {"type": "integer", "min": 0, "max": 130},
//! })).unwrap();
//!
//! let doc = json!({"name": "  Ada  ", "age": 36});
//! let result = schema.validate(doc.as_object().unwrap());
//! assert!(result.is_ok());
//! assert_eq!(result.normalized["name"], json!("Ada"));
//! ```

pub mod engine;
pub mod error;
pub mod registry;
pub mod schema;

// Re-export primary types at crate root for ergonomic imports.
pub use engine::Validation;
pub use error::{ErrorEntry, ErrorMap, SchemaError};
pub use registry::{CheckFn, CoerceFn, RuleRegistry};
pub use schema::{FieldType, Schema};
