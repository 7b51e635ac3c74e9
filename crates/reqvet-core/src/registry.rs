//! # Rule Registry
//!
//! Named validation and normalization functions, resolved by schemas at
//! construction time. Rule dispatch is an explicit map from rule name to
//! function object, so an endpoint referencing an unregistered name fails
//! at startup, not per request.
//!
//! Built-ins:
//!
//! - check `is_date` — value must parse as an ISO calendar date
//!   (`YYYY-MM-DD`) when the rule argument is `true`;
//! - coercion `trim` — strips leading/trailing whitespace from strings and
//!   passes every other value through unchanged.
//!
//! The registry is populated once during process initialization and shared
//! read-only across requests; registration after schemas are built has no
//! effect on them because names are resolved eagerly.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;

/// A check function: `(rule_arg, field, value, out)` appends zero or more
/// violation messages for `field` to `out`.
pub type CheckFn = dyn Fn(&Value, &str, &Value, &mut Vec<String>) + Send + Sync;

/// A coercion function: transforms a raw value before any constraint runs.
pub type CoerceFn = dyn Fn(Value) -> Value + Send + Sync;

/// Extensible set of named check and coercion functions.
pub struct RuleRegistry {
    checks: HashMap<String, Arc<CheckFn>>,
    coercions: HashMap<String, Arc<CoerceFn>>,
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("checks", &self.checks.keys().collect::<Vec<_>>())
            .field("coercions", &self.coercions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl RuleRegistry {
    /// Create a registry with no entries at all.
    ///
    /// Most callers want [`RuleRegistry::default`], which includes the
    /// built-in `is_date` check and `trim` coercion.
    pub fn empty() -> Self {
        Self {
            checks: HashMap::new(),
            coercions: HashMap::new(),
        }
    }

    /// Register a check function under `name`, replacing any previous entry.
    pub fn register_check(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&Value, &str, &Value, &mut Vec<String>) + Send + Sync + 'static,
    ) {
        self.checks.insert(name.into(), Arc::new(f));
    }

    /// Register a coercion function under `name`, replacing any previous entry.
    pub fn register_coercion(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) {
        self.coercions.insert(name.into(), Arc::new(f));
    }

    /// Look up a check function by name.
    pub fn check(&self, name: &str) -> Option<Arc<CheckFn>> {
        self.checks.get(name).cloned()
    }

    /// Look up a coercion function by name.
    pub fn coercion(&self, name: &str) -> Option<Arc<CoerceFn>> {
        self.coercions.get(name).cloned()
    }

    /// Registered check names, unordered.
    pub fn check_names(&self) -> Vec<&str> {
        self.checks.keys().map(String::as_str).collect()
    }

    /// Registered coercion names, unordered.
    pub fn coercion_names(&self) -> Vec<&str> {
        self.coercions.keys().map(String::as_str).collect()
    }
}

impl Default for RuleRegistry {
    /// Registry pre-populated with the built-in rules.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register_check("is_date", is_date);
        registry.register_coercion("trim", trim);
        registry
    }
}

/// Built-in `is_date` check: when the rule argument is `true` and the value
/// is not null, the value must be a string parsing as `YYYY-MM-DD`.
fn is_date(arg: &Value, _field: &str, value: &Value, out: &mut Vec<String>) {
    if arg != &Value::Bool(true) || value.is_null() {
        return;
    }
    let ok = value
        .as_str()
        .is_some_and(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok());
    if !ok {
        out.push("Must be valid date string YYYY-MM-DD".to_string());
    }
}

/// Built-in `trim` coercion: strips surrounding whitespace from strings.
fn trim(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        other => other,
    }
}
