//! # Schema Model
//!
//! Parses a declarative rule mapping into an immutable [`Schema`]: a map
//! from field name to the validated [`FieldRule`] for that field. Parsing
//! fails fast with [`SchemaError`] on unknown type names, unregistered rule
//! or coercion names, malformed rule arguments, and invalid regex patterns,
//! so a misconfigured endpoint never reaches request traffic.
//!
//! Custom rule and coercion names are resolved against the
//! [`RuleRegistry`](crate::RuleRegistry) once here; validation never does a
//! name lookup per request. Compiled schemas hold no interior mutability
//! and are safe to share (`Arc<Schema>`) across concurrent requests.
//!
//! ## Declaration vocabulary
//!
//! ```
//! use reqvet_core::{RuleRegistry, Schema};
//! use serde_json::json;
//!
//! let registry = RuleRegistry::default();
//! let schema = Schema::from_value(&registry, &json!({
//!     "date_test":    {"type": "string", "is_date": true},
//!     "allowed_test": {"type": "string", "allowed": ["a", "b", "c"]},
//!     "empty_test":   {"type": "string", "empty": false},
//! })).unwrap();
//! assert_eq!(schema.len(), 3);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use regex::Regex;
use serde_json::{Number, Value};

use crate::error::SchemaError;
use crate::registry::{CheckFn, CoerceFn, RuleRegistry};

/// Reserved declaration key toggling the unknown-field policy per schema.
const ALLOW_UNKNOWN_KEY: &str = "__allow_unknown";

/// The runtime types a field rule may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// JSON string.
    String,
    /// JSON number with an integral value.
    Integer,
    /// Any JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON array.
    List,
    /// JSON object.
    Dict,
}

impl FieldType {
    /// Resolve a declared type name, or `None` if unrecognized.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "list" => Some(Self::List),
            "dict" => Some(Self::Dict),
            _ => None,
        }
    }

    /// The declared name of this type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::List => "list",
            Self::Dict => "dict",
        }
    }

    /// Whether `value`'s runtime type matches this declared type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::List => value.is_array(),
            Self::Dict => value.is_object(),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A custom check resolved from the registry at construction time.
pub(crate) struct Check {
    /// The registered rule name, kept for diagnostics.
    pub(crate) name: String,
    /// The rule argument as declared (e.g. `true` for `is_date`).
    pub(crate) arg: Value,
    /// The resolved check function.
    pub(crate) f: Arc<CheckFn>,
}

impl std::fmt::Debug for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Check")
            .field("name", &self.name)
            .field("arg", &self.arg)
            .finish()
    }
}

/// A coercion resolved from the registry at construction time.
pub(crate) struct Coercion {
    /// The registered coercion name, kept for diagnostics.
    pub(crate) name: String,
    /// The resolved coercion function.
    pub(crate) f: Arc<CoerceFn>,
}

impl std::fmt::Debug for Coercion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coercion").field("name", &self.name).finish()
    }
}

/// The full set of declared constraints for one named field.
#[derive(Debug, Default)]
pub struct FieldRule {
    /// Acceptable runtime types; empty means any type passes.
    pub(crate) types: Vec<FieldType>,
    /// Whether the field must be present in the document.
    pub(crate) required: bool,
    /// Whether an explicit null is acceptable.
    pub(crate) nullable: bool,
    /// Whether an empty string/collection is acceptable. Defaults to true.
    pub(crate) empty: bool,
    /// Membership constraint: the value must be one of these.
    pub(crate) allowed: Option<Vec<Value>>,
    /// Inclusive lower bound for numeric values.
    pub(crate) min: Option<Number>,
    /// Inclusive upper bound for numeric values.
    pub(crate) max: Option<Number>,
    /// Pattern constraint for string values.
    pub(crate) regex: Option<Regex>,
    /// Members a list value must include.
    pub(crate) contains: Option<Vec<Value>>,
    /// Nested schema for dict or list-of-dict fields.
    pub(crate) schema: Option<Schema>,
    /// Fields that must also be present (and non-null) alongside this one.
    pub(crate) dependencies: Vec<String>,
    /// Default applied when the field is absent from the document.
    pub(crate) default: Option<Value>,
    /// Coercion applied to the raw value before any constraint runs.
    pub(crate) coerce: Option<Coercion>,
    /// Custom checks, run after the declarative constraints.
    pub(crate) checks: Vec<Check>,
}

/// An immutable field-rule mapping, constructed once per endpoint and
/// shared read-only across all in-flight requests.
#[derive(Debug, Default)]
pub struct Schema {
    pub(crate) fields: BTreeMap<String, FieldRule>,
    pub(crate) allow_unknown: bool,
}

impl Schema {
    /// Parse a declarative rule mapping into a compiled schema.
    ///
    /// The declaration is an object mapping field names to rule objects
    /// (see the module docs for the vocabulary). The reserved
    /// `__allow_unknown` key (boolean) switches the unknown-field policy
    /// for this schema; the default rejects undeclared fields.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the declaration is not an object, a rule
    /// argument is malformed, a type name is unrecognized, a regex does not
    /// compile, or a rule/coercion name is not registered.
    pub fn from_value(registry: &RuleRegistry, decl: &Value) -> Result<Self, SchemaError> {
        let obj = decl
            .as_object()
            .ok_or_else(|| SchemaError::NotAMapping(type_of(decl).to_string()))?;

        let mut fields = BTreeMap::new();
        let mut allow_unknown = false;

        for (name, rule_decl) in obj {
            if name == ALLOW_UNKNOWN_KEY {
                allow_unknown = rule_decl.as_bool().ok_or_else(|| SchemaError::InvalidRule {
                    field: ALLOW_UNKNOWN_KEY.to_string(),
                    rule: ALLOW_UNKNOWN_KEY.to_string(),
                    reason: "expected a boolean".to_string(),
                })?;
                continue;
            }
            let rule = Self::parse_rule(registry, name, rule_decl)?;
            fields.insert(name.clone(), rule);
        }

        Ok(Self {
            fields,
            allow_unknown,
        })
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether undeclared document fields are accepted.
    pub fn allows_unknown(&self) -> bool {
        self.allow_unknown
    }

    /// Whether `name` is a declared field.
    pub fn declares(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Parse one field's rule object.
    fn parse_rule(
        registry: &RuleRegistry,
        field: &str,
        decl: &Value,
    ) -> Result<FieldRule, SchemaError> {
        let obj = decl.as_object().ok_or_else(|| SchemaError::RuleNotAMapping {
            field: field.to_string(),
        })?;

        let mut rule = FieldRule {
            empty: true,
            ..FieldRule::default()
        };

        for (key, arg) in obj {
            match key.as_str() {
                "type" => rule.types = parse_types(field, arg)?,
                "required" => rule.required = expect_bool(field, key, arg)?,
                "nullable" => rule.nullable = expect_bool(field, key, arg)?,
                "empty" => rule.empty = expect_bool(field, key, arg)?,
                "allowed" => rule.allowed = Some(expect_array(field, key, arg)?),
                "min" => rule.min = Some(expect_number(field, key, arg)?),
                "max" => rule.max = Some(expect_number(field, key, arg)?),
                "regex" => {
                    let pattern = expect_str(field, key, arg)?;
                    let compiled =
                        Regex::new(pattern).map_err(|e| SchemaError::InvalidRegex {
                            field: field.to_string(),
                            pattern: pattern.to_string(),
                            reason: e.to_string(),
                        })?;
                    rule.regex = Some(compiled);
                }
                "contains" => rule.contains = Some(expect_array(field, key, arg)?),
                "schema" => rule.schema = Some(Schema::from_value(registry, arg)?),
                "dependencies" => rule.dependencies = parse_dependencies(field, arg)?,
                "default" => rule.default = Some(arg.clone()),
                "coerce" => {
                    let name = expect_str(field, key, arg)?;
                    let f = registry.coercion(name).ok_or_else(|| {
                        SchemaError::UnknownCoercion {
                            field: field.to_string(),
                            name: name.to_string(),
                        }
                    })?;
                    rule.coerce = Some(Coercion {
                        name: name.to_string(),
                        f,
                    });
                }
                custom => {
                    let f = registry.check(custom).ok_or_else(|| SchemaError::UnknownRule {
                        field: field.to_string(),
                        name: custom.to_string(),
                    })?;
                    rule.checks.push(Check {
                        name: custom.to_string(),
                        arg: arg.clone(),
                        f,
                    });
                }
            }
        }

        Ok(rule)
    }
}

/// Human name for a JSON value's runtime type, used in diagnostics.
pub(crate) fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn parse_types(field: &str, arg: &Value) -> Result<Vec<FieldType>, SchemaError> {
    let names: Vec<&str> = match arg {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items
            .iter()
            .map(|v| {
                v.as_str().ok_or_else(|| SchemaError::InvalidRule {
                    field: field.to_string(),
                    rule: "type".to_string(),
                    reason: "expected a type name or list of type names".to_string(),
                })
            })
            .collect::<Result<_, _>>()?,
        _ => {
            return Err(SchemaError::InvalidRule {
                field: field.to_string(),
                rule: "type".to_string(),
                reason: "expected a type name or list of type names".to_string(),
            })
        }
    };

    names
        .into_iter()
        .map(|name| {
            FieldType::from_name(name).ok_or_else(|| SchemaError::UnknownType {
                field: field.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}

fn parse_dependencies(field: &str, arg: &Value) -> Result<Vec<String>, SchemaError> {
    match arg {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|v| {
                v.as_str().map(str::to_string).ok_or_else(|| {
                    SchemaError::InvalidRule {
                        field: field.to_string(),
                        rule: "dependencies".to_string(),
                        reason: "expected a field name or list of field names".to_string(),
                    }
                })
            })
            .collect(),
        _ => Err(SchemaError::InvalidRule {
            field: field.to_string(),
            rule: "dependencies".to_string(),
            reason: "expected a field name or list of field names".to_string(),
        }),
    }
}

fn expect_bool(field: &str, rule: &str, arg: &Value) -> Result<bool, SchemaError> {
    arg.as_bool().ok_or_else(|| SchemaError::InvalidRule {
        field: field.to_string(),
        rule: rule.to_string(),
        reason: "expected a boolean".to_string(),
    })
}

fn expect_number(field: &str, rule: &str, arg: &Value) -> Result<Number, SchemaError> {
    arg.as_number().cloned().ok_or_else(|| SchemaError::InvalidRule {
        field: field.to_string(),
        rule: rule.to_string(),
        reason: "expected a number".to_string(),
    })
}

fn expect_str<'a>(field: &str, rule: &str, arg: &'a Value) -> Result<&'a str, SchemaError> {
    arg.as_str().ok_or_else(|| SchemaError::InvalidRule {
        field: field.to_string(),
        rule: rule.to_string(),
        reason: "expected a string".to_string(),
    })
}

fn expect_array(field: &str, rule: &str, arg: &Value) -> Result<Vec<Value>, SchemaError> {
    arg.as_array().cloned().ok_or_else(|| SchemaError::InvalidRule {
        field: field.to_string(),
        rule: rule.to_string(),
        reason: "expected a list".to_string(),
    })
}
