//! # Validation Engine
//!
//! Runs a compiled [`Schema`] against one raw document, producing a
//! normalized document plus a field-addressed [`ErrorMap`].
//!
//! Per-field evaluation order: coercion first, then null handling, the
//! type check (a type failure short-circuits the remaining checks for that
//! field only), emptiness, membership, numeric bounds, regex, contains,
//! nested schema recursion, dependencies, and finally any custom checks.
//! Errors for different fields are independent; nothing aborts the scan,
//! and every violated constraint on a field appends to that field's
//! message sequence in check order.
//!
//! The engine never mutates its input. The normalized output holds every
//! field that passed (with coerced values), omits absent optional fields,
//! and applies declared defaults for absent fields.

use serde_json::{Map, Value};

use crate::error::ErrorMap;
use crate::schema::{type_of, FieldRule, Schema};

/// The outcome of validating one document: the normalized document and the
/// accumulated error map. `errors.is_empty()` ⇔ the document passed.
#[derive(Debug)]
pub struct Validation {
    /// Fields that passed validation, with coerced values and defaults.
    pub normalized: Map<String, Value>,
    /// Every violation found, addressed by field.
    pub errors: ErrorMap,
}

impl Validation {
    /// Whether the document passed validation.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Schema {
    /// Validate `doc` against this schema.
    ///
    /// Purely synchronous, in-memory computation; safe to call from any
    /// number of concurrent requests sharing the schema.
    pub fn validate(&self, doc: &Map<String, Value>) -> Validation {
        let mut normalized = Map::new();
        let mut errors = ErrorMap::new();

        for (name, rule) in &self.fields {
            match doc.get(name) {
                None => {
                    if let Some(default) = &rule.default {
                        normalized.insert(name.clone(), default.clone());
                    } else if rule.required {
                        errors.push(name, "required field");
                    }
                }
                Some(raw) => {
                    self.check_field(name, rule, raw, doc, &mut normalized, &mut errors);
                }
            }
        }

        // Reject-unknown-by-default policy; pass-through when the schema
        // opts out.
        for (name, value) in doc {
            if !self.fields.contains_key(name) {
                if self.allow_unknown {
                    normalized.insert(name.clone(), value.clone());
                } else {
                    errors.push(name, "unknown field");
                }
            }
        }

        Validation { normalized, errors }
    }

    /// Evaluate every constraint for one present field.
    fn check_field(
        &self,
        name: &str,
        rule: &FieldRule,
        raw: &Value,
        doc: &Map<String, Value>,
        normalized: &mut Map<String, Value>,
        errors: &mut ErrorMap,
    ) {
        // Coercion runs before every constraint check.
        let mut value = raw.clone();
        if let Some(coercion) = &rule.coerce {
            value = (coercion.f)(value);
        }

        let mut msgs: Vec<String> = Vec::new();
        let mut nested_errors: Option<ErrorMap> = None;

        if value.is_null() {
            if rule.nullable {
                // Custom checks still run; built-ins guard null themselves.
                for check in &rule.checks {
                    (check.f)(&check.arg, name, &value, &mut msgs);
                }
                if msgs.is_empty() {
                    normalized.insert(name.to_string(), value);
                } else {
                    errors.extend(name, msgs);
                }
            } else {
                errors.push(name, "null value not allowed");
            }
            return;
        }

        // Type failure short-circuits the remaining checks for this field.
        if !rule.types.is_empty() && !rule.types.iter().any(|t| t.matches(&value)) {
            let expected = rule
                .types
                .iter()
                .map(|t| t.name())
                .collect::<Vec<_>>()
                .join(" or ");
            errors.push(name, format!("must be of {expected} type"));
            return;
        }

        if !rule.empty && is_empty_value(&value) {
            msgs.push("empty values not allowed".to_string());
        }

        if let Some(allowed) = &rule.allowed {
            if !allowed.contains(&value) {
                msgs.push(format!("unallowed value {}", display_value(&value)));
            }
        }

        if let Some(n) = value.as_f64() {
            if let Some(min) = &rule.min {
                if min.as_f64().is_some_and(|m| n < m) {
                    msgs.push(format!("min value is {min}"));
                }
            }
            if let Some(max) = &rule.max {
                if max.as_f64().is_some_and(|m| n > m) {
                    msgs.push(format!("max value is {max}"));
                }
            }
        }

        if let (Some(regex), Some(s)) = (&rule.regex, value.as_str()) {
            if !regex.is_match(s) {
                msgs.push(format!("value does not match regex '{}'", regex.as_str()));
            }
        }

        if let (Some(contains), Some(items)) = (&rule.contains, value.as_array()) {
            let missing: Vec<&Value> =
                contains.iter().filter(|m| !items.contains(m)).collect();
            if !missing.is_empty() {
                msgs.push(format!("missing members {}", display_member_set(&missing)));
            }
        }

        if let Some(sub) = &rule.schema {
            match &mut value {
                Value::Object(obj) => {
                    let result = sub.validate(obj);
                    if result.is_ok() {
                        *obj = result.normalized;
                    } else {
                        nested_errors = Some(result.errors);
                    }
                }
                Value::Array(items) => {
                    let mut by_index = ErrorMap::new();
                    for (idx, item) in items.iter_mut().enumerate() {
                        match item {
                            Value::Object(obj) => {
                                let result = sub.validate(obj);
                                if result.is_ok() {
                                    *obj = result.normalized;
                                } else {
                                    by_index.push_nested(&idx.to_string(), result.errors);
                                }
                            }
                            other => {
                                by_index.push(
                                    &idx.to_string(),
                                    format!("must be of dict type, got {}", type_of(other)),
                                );
                            }
                        }
                    }
                    if !by_index.is_empty() {
                        nested_errors = Some(by_index);
                    }
                }
                other => {
                    msgs.push(format!("must be of dict type, got {}", type_of(other)));
                }
            }
        }

        // Dependency violations are reported under this field's key, not
        // the dependency's.
        for dep in &rule.dependencies {
            let satisfied = doc.get(dep).is_some_and(|v| !v.is_null());
            if !satisfied {
                msgs.push(format!("field '{dep}' is required"));
            }
        }

        for check in &rule.checks {
            (check.f)(&check.arg, name, &value, &mut msgs);
        }

        if msgs.is_empty() && nested_errors.is_none() {
            normalized.insert(name.to_string(), value);
        } else {
            errors.extend(name, msgs);
            if let Some(nested) = nested_errors {
                errors.push_nested(name, nested);
            }
        }
    }
}

/// Whether a value counts as empty for the `empty` rule: the empty string
/// or an empty collection.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(obj) => obj.is_empty(),
        _ => false,
    }
}

/// Render a value for an `unallowed value` message: strings bare, anything
/// else in its JSON form.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render missing `contains` members as a sorted, braced set, e.g. `{'a'}`.
/// Strings are single-quoted; other values render in JSON form.
fn display_member_set(members: &[&Value]) -> String {
    let mut parts: Vec<String> = members
        .iter()
        .map(|m| match m {
            Value::String(s) => format!("'{s}'"),
            other => other.to_string(),
        })
        .collect();
    parts.sort();
    format!("{{{}}}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RuleRegistry;
    use serde_json::json;

    fn schema(decl: Value) -> Schema {
        Schema::from_value(&RuleRegistry::default(), &decl).expect("test schema must parse")
    }

    fn doc(value: Value) -> Map<String, Value> {
        value.as_object().expect("test doc must be an object").clone()
    }

    fn errors_json(result: &Validation) -> Value {
        result.errors.to_value()
    }

    // -- Required / absent fields ---------------------------------------------

    #[test]
    fn missing_required_field_is_reported() {
        let s = schema(json!({"name": {"type": "string", "required": true}}));
        let result = s.validate(&doc(json!({})));
        assert_eq!(errors_json(&result), json!({"name": ["required field"]}));
        assert!(result.normalized.is_empty());
    }

    #[test]
    fn missing_optional_field_is_omitted() {
        let s = schema(json!({"name": {"type": "string"}}));
        let result = s.validate(&doc(json!({})));
        assert!(result.is_ok());
        assert!(result.normalized.is_empty());
    }

    #[test]
    fn default_applies_to_absent_field() {
        let s = schema(json!({"count": {"type": "integer", "required": true, "default": 10}}));
        let result = s.validate(&doc(json!({})));
        assert!(result.is_ok(), "default satisfies required: {result:?}");
        assert_eq!(result.normalized.get("count"), Some(&json!(10)));
    }

    #[test]
    fn default_does_not_override_present_value() {
        let s = schema(json!({"count": {"type": "integer", "default": 10}}));
        let result = s.validate(&doc(json!({"count": 3})));
        assert_eq!(result.normalized.get("count"), Some(&json!(3)));
    }

    // -- Unknown-field policy -------------------------------------------------

    #[test]
    fn unknown_field_is_rejected_by_default() {
        let s = schema(json!({"known": {"type": "string"}}));
        let result = s.validate(&doc(json!({"unknown": "field"})));
        assert_eq!(errors_json(&result), json!({"unknown": ["unknown field"]}));
    }

    #[test]
    fn unknown_field_error_is_independent_of_other_fields() {
        let s = schema(json!({"known": {"type": "string"}}));
        let result = s.validate(&doc(json!({"known": "ok", "unknown": "field"})));
        assert_eq!(errors_json(&result), json!({"unknown": ["unknown field"]}));
        assert_eq!(result.normalized.get("known"), Some(&json!("ok")));
    }

    #[test]
    fn allow_unknown_passes_undeclared_fields_through() {
        let s = schema(json!({"__allow_unknown": true, "known": {"type": "string"}}));
        let result = s.validate(&doc(json!({"known": "ok", "extra": 7})));
        assert!(result.is_ok());
        assert_eq!(result.normalized.get("extra"), Some(&json!(7)));
    }

    // -- Type checks ----------------------------------------------------------

    #[test]
    fn type_mismatch_is_reported() {
        let s = schema(json!({"count": {"type": "integer"}}));
        let result = s.validate(&doc(json!({"count": "three"})));
        assert_eq!(
            errors_json(&result),
            json!({"count": ["must be of integer type"]})
        );
    }

    #[test]
    fn type_mismatch_short_circuits_remaining_checks() {
        // min would also fail, but the type error suppresses it.
        let s = schema(json!({"count": {"type": "integer", "min": 5}}));
        let result = s.validate(&doc(json!({"count": "three"})));
        assert_eq!(
            errors_json(&result),
            json!({"count": ["must be of integer type"]})
        );
    }

    #[test]
    fn type_failure_only_affects_its_own_field() {
        let s = schema(json!({
            "count": {"type": "integer"},
            "name": {"type": "string", "required": true},
        }));
        let result = s.validate(&doc(json!({"count": "three"})));
        assert_eq!(
            errors_json(&result),
            json!({"count": ["must be of integer type"], "name": ["required field"]})
        );
    }

    #[test]
    fn multiple_declared_types_accept_any_match() {
        let s = schema(json!({"id": {"type": ["string", "integer"]}}));
        assert!(s.validate(&doc(json!({"id": "abc"}))).is_ok());
        assert!(s.validate(&doc(json!({"id": 42}))).is_ok());
        let result = s.validate(&doc(json!({"id": true})));
        assert_eq!(
            errors_json(&result),
            json!({"id": ["must be of string or integer type"]})
        );
    }

    #[test]
    fn integer_type_rejects_float() {
        let s = schema(json!({"n": {"type": "integer"}}));
        let result = s.validate(&doc(json!({"n": 2.5})));
        assert!(!result.is_ok());
    }

    #[test]
    fn number_type_accepts_int_and_float() {
        let s = schema(json!({"n": {"type": "number"}}));
        assert!(s.validate(&doc(json!({"n": 2.5}))).is_ok());
        assert!(s.validate(&doc(json!({"n": 2}))).is_ok());
    }

    // -- Nullability ----------------------------------------------------------

    #[test]
    fn null_rejected_unless_nullable() {
        let s = schema(json!({"f": {"type": "string"}}));
        let result = s.validate(&doc(json!({"f": null})));
        assert_eq!(errors_json(&result), json!({"f": ["null value not allowed"]}));
    }

    #[test]
    fn nullable_accepts_explicit_null() {
        let s = schema(json!({"f": {"type": "string", "nullable": true}}));
        let result = s.validate(&doc(json!({"f": null})));
        assert!(result.is_ok());
        assert_eq!(result.normalized.get("f"), Some(&Value::Null));
    }

    #[test]
    fn nullable_null_skips_type_check_but_runs_custom_checks() {
        let s = schema(json!({"f": {"type": "string", "nullable": true, "is_date": true}}));
        // is_date guards null itself, so a null passes.
        assert!(s.validate(&doc(json!({"f": null}))).is_ok());
    }

    // -- Emptiness ------------------------------------------------------------

    #[test]
    fn empty_string_rejected_when_empty_false() {
        let s = schema(json!({"empty_test": {"type": "string", "empty": false}}));
        let result = s.validate(&doc(json!({"empty_test": ""})));
        assert_eq!(
            errors_json(&result),
            json!({"empty_test": ["empty values not allowed"]})
        );
    }

    #[test]
    fn empty_list_rejected_when_empty_false() {
        let s = schema(json!({"tags": {"type": "list", "empty": false}}));
        let result = s.validate(&doc(json!({"tags": []})));
        assert_eq!(
            errors_json(&result),
            json!({"tags": ["empty values not allowed"]})
        );
    }

    #[test]
    fn empty_string_accepted_by_default() {
        let s = schema(json!({"f": {"type": "string"}}));
        assert!(s.validate(&doc(json!({"f": ""}))).is_ok());
    }

    // -- Allowed values -------------------------------------------------------

    #[test]
    fn unallowed_value_is_reported() {
        let s = schema(json!({"allowed_test": {"type": "string", "allowed": ["a", "b", "c"]}}));
        let result = s.validate(&doc(json!({"allowed_test": "d"})));
        assert_eq!(
            errors_json(&result),
            json!({"allowed_test": ["unallowed value d"]})
        );
    }

    #[test]
    fn allowed_value_passes() {
        let s = schema(json!({"allowed_test": {"type": "string", "allowed": ["a", "b", "c"]}}));
        assert!(s.validate(&doc(json!({"allowed_test": "a"}))).is_ok());
    }

    #[test]
    fn unallowed_non_string_renders_json_form() {
        let s = schema(json!({"n": {"type": "integer", "allowed": [1, 2]}}));
        let result = s.validate(&doc(json!({"n": 9})));
        assert_eq!(errors_json(&result), json!({"n": ["unallowed value 9"]}));
    }

    // -- Numeric bounds -------------------------------------------------------

    #[test]
    fn min_violation() {
        let s = schema(json!({"n": {"type": "integer", "min": 5, "max": 10}}));
        let result = s.validate(&doc(json!({"n": 3})));
        assert_eq!(errors_json(&result), json!({"n": ["min value is 5"]}));
    }

    #[test]
    fn max_violation() {
        let s = schema(json!({"n": {"type": "integer", "min": 5, "max": 10}}));
        let result = s.validate(&doc(json!({"n": 15})));
        assert_eq!(errors_json(&result), json!({"n": ["max value is 10"]}));
    }

    #[test]
    fn bounds_are_inclusive() {
        let s = schema(json!({"n": {"type": "integer", "min": 5, "max": 10}}));
        assert!(s.validate(&doc(json!({"n": 5}))).is_ok());
        assert!(s.validate(&doc(json!({"n": 8}))).is_ok());
        assert!(s.validate(&doc(json!({"n": 10}))).is_ok());
    }

    #[test]
    fn float_bounds_render_as_declared() {
        let s = schema(json!({"ratio": {"type": "number", "min": 0.5}}));
        let result = s.validate(&doc(json!({"ratio": 0.25})));
        assert_eq!(errors_json(&result), json!({"ratio": ["min value is 0.5"]}));
    }

    // -- Regex ----------------------------------------------------------------

    const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$";

    #[test]
    fn regex_violation_names_the_pattern() {
        let s = schema(json!({"email_regex_test": {"type": "string", "regex": EMAIL_PATTERN}}));
        let result = s.validate(&doc(json!({"email_regex_test": "abc_at_aaa_dot_aa"})));
        assert_eq!(
            errors_json(&result),
            json!({"email_regex_test": [format!(
                "value does not match regex '{EMAIL_PATTERN}'"
            )]})
        );
    }

    #[test]
    fn regex_match_passes() {
        let s = schema(json!({"email_regex_test": {"type": "string", "regex": EMAIL_PATTERN}}));
        assert!(s
            .validate(&doc(json!({"email_regex_test": "abc@aaa.aa"})))
            .is_ok());
    }

    // -- Contains -------------------------------------------------------------

    #[test]
    fn contains_reports_sorted_missing_members() {
        let s = schema(json!({"contains_test": {"type": "list", "contains": ["a", "b"]}}));
        let result = s.validate(&doc(json!({"contains_test": ["b", "c", "d"]})));
        assert_eq!(
            errors_json(&result),
            json!({"contains_test": ["missing members {'a'}"]})
        );
    }

    #[test]
    fn contains_reports_multiple_missing_members_sorted() {
        let s = schema(json!({"f": {"type": "list", "contains": ["b", "a"]}}));
        let result = s.validate(&doc(json!({"f": ["z"]})));
        assert_eq!(
            errors_json(&result),
            json!({"f": ["missing members {'a', 'b'}"]})
        );
    }

    #[test]
    fn contains_superset_passes() {
        let s = schema(json!({"f": {"type": "list", "contains": ["a", "b"]}}));
        assert!(s.validate(&doc(json!({"f": ["a", "b", "c"]}))).is_ok());
    }

    // -- Nested schemas -------------------------------------------------------

    fn nested_schema() -> Schema {
        schema(json!({
            "schema_test": {"type": "dict", "schema": {
                "name": {"type": "string", "required": true},
                "enabled": {"type": "boolean", "required": true},
            }}
        }))
    }

    #[test]
    fn nested_errors_embed_under_parent_key() {
        let s = nested_schema();
        let result = s.validate(&doc(json!({
            "schema_test": {"name": "Neal Koblitz", "phone": "+15198884567"}
        })));
        assert_eq!(
            errors_json(&result),
            json!({"schema_test": [
                {"enabled": ["required field"], "phone": ["unknown field"]}
            ]})
        );
    }

    #[test]
    fn nested_success_passes_normalized_subdocument() {
        let s = nested_schema();
        let result = s.validate(&doc(json!({
            "schema_test": {"name": "Neal Koblitz", "enabled": true}
        })));
        assert!(result.is_ok());
        assert_eq!(
            result.normalized.get("schema_test"),
            Some(&json!({"name": "Neal Koblitz", "enabled": true}))
        );
    }

    #[test]
    fn nested_coercions_apply_to_subdocument() {
        let s = schema(json!({
            "person": {"type": "dict", "schema": {
                "name": {"type": "string", "coerce": "trim"},
            }}
        }));
        let result = s.validate(&doc(json!({"person": {"name": "  Ada  "}})));
        assert!(result.is_ok());
        assert_eq!(
            result.normalized.get("person"),
            Some(&json!({"name": "Ada"}))
        );
    }

    #[test]
    fn list_of_dicts_validates_each_element() {
        let s = schema(json!({
            "items": {"type": "list", "schema": {
                "id": {"type": "integer", "required": true},
            }}
        }));
        let result = s.validate(&doc(json!({
            "items": [{"id": 1}, {"wrong": true}, "not a dict"]
        })));
        assert_eq!(
            errors_json(&result),
            json!({"items": [{
                "1": [{"id": ["required field"], "wrong": ["unknown field"]}],
                "2": ["must be of dict type, got string"],
            }]})
        );
    }

    #[test]
    fn list_of_dicts_all_valid_passes() {
        let s = schema(json!({
            "items": {"type": "list", "schema": {"id": {"type": "integer"}}}
        }));
        let result = s.validate(&doc(json!({"items": [{"id": 1}, {"id": 2}]})));
        assert!(result.is_ok());
    }

    // -- Dependencies ---------------------------------------------------------

    fn webhook_schema() -> Schema {
        schema(json!({
            "webhook_url": {"type": "string", "nullable": true, "dependencies": "webhook_token"},
            "webhook_token": {"type": "string", "nullable": true, "dependencies": "webhook_url"},
        }))
    }

    #[test]
    fn dependency_violation_reported_under_dependent_field() {
        let s = webhook_schema();
        let result = s.validate(&doc(json!({"webhook_url": "http://example.com/webhook"})));
        assert_eq!(
            errors_json(&result),
            json!({"webhook_url": ["field 'webhook_token' is required"]})
        );
    }

    #[test]
    fn dependency_satisfied_when_both_present() {
        let s = webhook_schema();
        let result = s.validate(&doc(json!({
            "webhook_url": "http://localhost:3000/webhook",
            "webhook_token": "token",
        })));
        assert!(result.is_ok(), "{result:?}");
    }

    #[test]
    fn null_dependency_counts_as_absent() {
        let s = webhook_schema();
        let result = s.validate(&doc(json!({
            "webhook_url": "http://example.com",
            "webhook_token": null,
        })));
        assert_eq!(
            errors_json(&result).get("webhook_url"),
            Some(&json!(["field 'webhook_token' is required"]))
        );
    }

    // -- Coercions ------------------------------------------------------------

    #[test]
    fn trim_coercion_applies_before_type_check() {
        let s = schema(json!({"word": {"type": "string", "coerce": "trim"}}));
        let result = s.validate(&doc(json!({"word": "   hi"})));
        assert!(result.is_ok());
        assert_eq!(result.normalized.get("word"), Some(&json!("hi")));
    }

    #[test]
    fn coerced_empty_string_hits_empty_check() {
        let s = schema(json!({"word": {"type": "string", "empty": false, "coerce": "trim"}}));
        let result = s.validate(&doc(json!({"word": "   "})));
        assert_eq!(
            errors_json(&result),
            json!({"word": ["empty values not allowed"]})
        );
    }

    // -- Custom checks --------------------------------------------------------

    #[test]
    fn is_date_violation() {
        let s = schema(json!({"date_test": {"type": "string", "is_date": true}}));
        let result = s.validate(&doc(json!({"date_test": "invalid_date"})));
        assert_eq!(
            errors_json(&result),
            json!({"date_test": ["Must be valid date string YYYY-MM-DD"]})
        );
    }

    #[test]
    fn is_date_valid_passes() {
        let s = schema(json!({"date_test": {"type": "string", "is_date": true}}));
        assert!(s.validate(&doc(json!({"date_test": "2008-09-10"}))).is_ok());
    }

    // -- Error accumulation ---------------------------------------------------

    #[test]
    fn multiple_violations_on_one_field_append_in_check_order() {
        let s = schema(json!({
            "f": {"type": "string", "empty": false, "allowed": ["a"], "is_date": true}
        }));
        let result = s.validate(&doc(json!({"f": ""})));
        assert_eq!(
            errors_json(&result),
            json!({"f": [
                "empty values not allowed",
                "unallowed value ",
                "Must be valid date string YYYY-MM-DD",
            ]})
        );
    }

    #[test]
    fn errors_across_fields_all_collected() {
        let s = schema(json!({
            "a": {"type": "integer", "min": 5},
            "b": {"type": "string", "empty": false},
            "c": {"type": "string", "required": true},
        }));
        let result = s.validate(&doc(json!({"a": 1, "b": "", "d": 0})));
        let errs = errors_json(&result);
        assert_eq!(errs.as_object().unwrap().len(), 4);
        assert_eq!(errs["a"], json!(["min value is 5"]));
        assert_eq!(errs["b"], json!(["empty values not allowed"]));
        assert_eq!(errs["c"], json!(["required field"]));
        assert_eq!(errs["d"], json!(["unknown field"]));
    }

    // -- Full success scenario ------------------------------------------------

    #[test]
    fn full_document_validates_and_normalizes_to_itself() {
        let s = schema(json!({
            "contains_test": {"type": "list", "contains": ["a", "b"]},
            "min_max_integer_test": {"type": "integer", "min": 5, "max": 10},
            "schema_test": {"type": "dict", "schema": {
                "name": {"type": "string", "required": true},
                "enabled": {"type": "boolean", "required": true},
            }},
        }));
        let input = doc(json!({
            "contains_test": ["a", "b", "c"],
            "min_max_integer_test": 8,
            "schema_test": {"name": "Neal Koblitz", "enabled": true},
        }));
        let result = s.validate(&input);
        assert!(result.is_ok(), "{result:?}");
        assert_eq!(result.normalized, input);
    }

    #[test]
    fn input_document_is_never_mutated() {
        let s = schema(json!({"word": {"type": "string", "coerce": "trim"}}));
        let input = doc(json!({"word": "  padded  "}));
        let before = input.clone();
        let _ = s.validate(&input);
        assert_eq!(input, before);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn flat_schema() -> Schema {
            schema(json!({
                "name": {"type": "string", "coerce": "trim", "empty": false},
                "count": {"type": "integer", "min": 0, "max": 1000},
                "tags": {"type": "list"},
            }))
        }

        fn arb_doc() -> impl Strategy<Value = Map<String, Value>> {
            let name = prop_oneof![
                "[ ]{0,3}[a-z]{0,8}[ ]{0,3}".prop_map(Value::String),
                Just(Value::Null),
                any::<i64>().prop_map(Value::from),
            ];
            let count = prop_oneof![
                (-100i64..1100).prop_map(Value::from),
                Just(Value::Bool(true)),
                "[a-z]{1,4}".prop_map(Value::String),
            ];
            let tags = prop_oneof![
                proptest::collection::vec("[a-z]{1,4}".prop_map(Value::String), 0..4)
                    .prop_map(Value::Array),
                Just(Value::String("not-a-list".to_string())),
            ];
            (
                proptest::option::of(name),
                proptest::option::of(count),
                proptest::option::of(tags),
            )
                .prop_map(|(name, count, tags)| {
                    let mut doc = Map::new();
                    if let Some(v) = name {
                        doc.insert("name".to_string(), v);
                    }
                    if let Some(v) = count {
                        doc.insert("count".to_string(), v);
                    }
                    if let Some(v) = tags {
                        doc.insert("tags".to_string(), v);
                    }
                    doc
                })
        }

        proptest! {
            // A normalized document revalidates cleanly and is a fixed
            // point of normalization.
            #[test]
            fn normalization_is_idempotent(doc in arb_doc()) {
                let s = flat_schema();
                let first = s.validate(&doc);
                if first.is_ok() {
                    let second = s.validate(&first.normalized);
                    prop_assert!(second.is_ok(), "revalidation failed: {:?}", second.errors);
                    prop_assert_eq!(second.normalized, first.normalized);
                }
            }

            // Validation either accepts a field into the normalized output
            // or records an error for it, never both and never neither.
            #[test]
            fn every_field_is_accepted_or_reported(doc in arb_doc()) {
                let s = flat_schema();
                let result = s.validate(&doc);
                for key in doc.keys() {
                    let accepted = result.normalized.contains_key(key);
                    let reported = result.errors.get(key).is_some();
                    prop_assert!(accepted != reported, "field {key}: accepted={accepted} reported={reported}");
                }
            }
        }
    }
}
