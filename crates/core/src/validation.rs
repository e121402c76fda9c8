//! Field-level validation helpers shared by every validated input DTO.
//!
//! DTOs declare their rules with `#[derive(validator::Validate)]`; the custom
//! rules the `validator` crate lacks (non-blank strings and sequences of
//! non-blank text items) live here, together with the conversion from
//! [`validator::ValidationErrors`] into the flat, sorted violation list the
//! API reports.

use serde::Serialize;
use serde_json::Value;
use validator::{ValidationError, ValidationErrors};

use crate::error::CoreError;

/// A single failed constraint on a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Field name as it appears on the wire (camelCase).
    pub field: String,
    /// Machine-readable constraint code (`required`, `length`, `range`, ...).
    pub code: String,
    /// Human-readable explanation.
    pub message: String,
}

// ---------------------------------------------------------------------------
// Custom rules
// ---------------------------------------------------------------------------

/// Reject empty and whitespace-only strings.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if is_blank(value) {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

/// Require every element of a sequence to be a non-blank string.
///
/// Items are taken as raw JSON so that a number or object in the list is
/// reported against the field instead of failing deserialization. Reports
/// the first offending position.
pub fn validate_text_items(items: &[Value]) -> Result<(), ValidationError> {
    for (index, item) in items.iter().enumerate() {
        match item.as_str() {
            None => {
                return Err(ValidationError::new("item_type")
                    .with_message(format!("item at position {index} must be a string").into()))
            }
            Some(text) if is_blank(text) => {
                return Err(ValidationError::new("blank_item")
                    .with_message(format!("item at position {index} must not be blank").into()))
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Unwrap items already accepted by [`validate_text_items`].
pub fn into_text_items(items: Vec<Value>) -> Result<Vec<String>, CoreError> {
    items
        .into_iter()
        .map(|item| match item {
            Value::String(text) => Ok(text),
            other => Err(CoreError::Internal(format!(
                "non-string item {other} passed validation"
            ))),
        })
        .collect()
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

// ---------------------------------------------------------------------------
// Error conversion
// ---------------------------------------------------------------------------

/// Flatten `validator` errors into one [`FieldViolation`] per failed rule.
///
/// Output is sorted by field, then code, so responses are deterministic.
pub fn collect_violations(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut violations: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            let name: &str = &field;
            let wire_name = to_camel_case(name);
            field_errors.iter().map(move |err| FieldViolation {
                field: wire_name.clone(),
                code: err.code.to_string(),
                message: err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| default_message(&err.code)),
            })
        })
        .collect();

    violations.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));
    violations
}

fn default_message(code: &str) -> String {
    match code {
        "required" => "is required".to_string(),
        "length" => "has an invalid length".to_string(),
        "range" => "is out of range".to_string(),
        other => format!("failed the '{other}' constraint"),
    }
}

/// Convert a snake_case Rust field name into its camelCase JSON name.
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        CoreError::InvalidFields(collect_violations(&errors))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn not_blank_accepts_text() {
        assert!(validate_not_blank("Ducati").is_ok());
    }

    #[test]
    fn not_blank_rejects_empty_and_whitespace() {
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   \t").is_err());
    }

    #[test]
    fn text_items_accepts_empty_sequence() {
        assert!(validate_text_items(&[]).is_ok());
    }

    #[test]
    fn text_items_reports_blank_position() {
        let items = vec![json!("ABS"), json!(" ")];
        let err = validate_text_items(&items).unwrap_err();
        assert_eq!(err.code, "blank_item");
        assert_eq!(
            err.message.as_deref(),
            Some("item at position 1 must not be blank")
        );
    }

    #[test]
    fn text_items_rejects_non_strings() {
        for item in [json!(1), json!(null), json!({"name": "ABS"}), json!(["ABS"])] {
            let err = validate_text_items(&[json!("ABS"), item]).unwrap_err();
            assert_eq!(err.code, "item_type");
            assert_eq!(
                err.message.as_deref(),
                Some("item at position 1 must be a string")
            );
        }
    }

    #[test]
    fn into_text_items_unwraps_strings() {
        let items = into_text_items(vec![json!("ABS"), json!("Quickshifter")]).unwrap();
        assert_eq!(items, vec!["ABS", "Quickshifter"]);
        assert_matches!(into_text_items(vec![json!(7)]), Err(CoreError::Internal(_)));
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(to_camel_case("edicion_limitada"), "edicionLimitada");
        assert_eq!(to_camel_case("created_at"), "createdAt");
        assert_eq!(to_camel_case("modelo"), "modelo");
    }

    #[test]
    fn collects_all_violations_sorted() {
        let mut errors = ValidationErrors::new();
        errors.add("peso", ValidationError::new("range"));
        errors.add("edicion_limitada", ValidationError::new("required"));
        errors.add(
            "modelo",
            ValidationError::new("blank").with_message("must not be blank".into()),
        );

        let violations = collect_violations(&errors);
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["edicionLimitada", "modelo", "peso"]);
        assert_eq!(violations[0].message, "is required");
        assert_eq!(violations[1].message, "must not be blank");
    }
}
