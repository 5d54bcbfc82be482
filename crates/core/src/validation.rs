//! Bridging `validator` derive output into [`CoreError::InvalidFields`].
//!
//! Step payloads derive [`Validate`]; the resulting nested error tree is
//! flattened into dotted field paths with stable codes so that API clients
//! can highlight the offending input.

use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::{CoreError, FieldError};

/// Code for a required value that is missing or blank.
pub const CODE_REQUIRED: &str = "required";
/// Code for a value longer than its maximum.
pub const CODE_TOO_LONG: &str = "field_too_long";
/// Code for a value shorter than its (non-trivial) minimum.
pub const CODE_TOO_SHORT: &str = "field_too_short";
/// Code for a number outside its permitted range.
pub const CODE_OUT_OF_RANGE: &str = "out_of_range";
/// Code for a payload that could not be decoded at all.
pub const CODE_MALFORMED: &str = "malformed";
/// Code for a value that is well-formed but not acceptable.
pub const CODE_INVALID: &str = "invalid";

/// Run derive validation and return flattened, sorted field errors.
pub fn field_errors<T: Validate>(value: &T) -> Vec<FieldError> {
    let mut out = Vec::new();
    if let Err(errors) = value.validate() {
        flatten("", &errors, &mut out);
    }
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

/// Convert accumulated field errors into a result.
pub fn into_result(errors: Vec<FieldError>) -> Result<(), CoreError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::InvalidFields(errors))
    }
}

/// Decode a raw JSON step payload into its typed form.
///
/// Decoding failures (wrong types, unknown enum values, missing required
/// keys) are reported against `field`.
pub fn decode_payload<T: DeserializeOwned>(
    field: &str,
    raw: serde_json::Value,
) -> Result<T, CoreError> {
    serde_json::from_value(raw)
        .map_err(|e| CoreError::field(field, CODE_MALFORMED, e.to_string()))
}

/// Trim a string in place.
pub fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Trim an optional string in place, collapsing blank values to `None`.
pub fn trim_optional(value: &mut Option<String>) {
    if let Some(v) = value {
        trim_in_place(v);
        if v.is_empty() {
            *value = None;
        }
    }
}

/// Trim every tag and drop case-insensitive duplicates, keeping the first
/// spelling seen.
pub fn dedupe_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| seen.insert(t.to_lowercase()))
        .collect()
}

/// Per-element checks for a tag list (`validator` only sees the list length).
pub fn check_tags(field: &str, tags: &[String], max_len: usize) -> Vec<FieldError> {
    tags.iter()
        .enumerate()
        .filter_map(|(i, tag)| {
            let len = tag.chars().count();
            if len == 0 {
                Some(FieldError::new(
                    format!("{field}[{i}]"),
                    CODE_REQUIRED,
                    "Tags must not be blank",
                ))
            } else if len > max_len {
                Some(FieldError::new(
                    format!("{field}[{i}]"),
                    CODE_TOO_LONG,
                    format!("Tags must be at most {max_len} characters"),
                ))
            } else {
                None
            }
        })
        .collect()
}

fn flatten(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (name, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|e| to_field_error(&path, e)));
            }
            ValidationErrorsKind::Struct(inner) => flatten(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

fn to_field_error(path: &str, err: &ValidationError) -> FieldError {
    let (code, default_message) = match err.code.as_ref() {
        "length" => classify_length(path, err),
        "range" => (
            CODE_OUT_OF_RANGE.to_string(),
            format!("{path} is out of range"),
        ),
        "email" => ("invalid_email".to_string(), format!("{path} must be a valid email")),
        other => (other.to_string(), format!("{path} is invalid")),
    };
    let message = err
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or(default_message);
    FieldError::new(path, code, message)
}

fn classify_length(path: &str, err: &ValidationError) -> (String, String) {
    let param = |key: &str| err.params.get(key).and_then(|v| v.as_u64());
    let min = param("min");
    let max = param("max");
    let actual = err.params.get("value").map(|v| match v {
        serde_json::Value::String(s) => s.chars().count() as u64,
        serde_json::Value::Array(a) => a.len() as u64,
        _ => 0,
    });

    match (actual, min, max) {
        (Some(len), _, Some(max)) if len > max => (
            CODE_TOO_LONG.to_string(),
            format!("{path} must be at most {max} characters"),
        ),
        (Some(0), Some(_), _) => (CODE_REQUIRED.to_string(), format!("{path} is required")),
        (_, Some(1), _) => (CODE_REQUIRED.to_string(), format!("{path} is required")),
        (_, Some(min), _) => (
            CODE_TOO_SHORT.to_string(),
            format!("{path} must be at least {min} characters"),
        ),
        _ => (CODE_INVALID.to_string(), format!("{path} has an invalid length")),
    }
}
