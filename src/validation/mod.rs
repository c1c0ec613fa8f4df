//! Declarative request validation.
//!
//! Every violation in a request body is collected and reported at once;
//! a request that fails here never reaches a handler's business logic.

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use url::Url;

use crate::error::FieldError;
use crate::resource::{FieldKind, FieldSpec, ResourceDescriptor};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static pattern"));

/// Fields maintained by the store, rejected on any write
const READ_ONLY_FIELDS: &[&str] = &["id", "createdAt", "updatedAt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Required fields enforced, declared defaults applied
    Create,
    /// Only provided fields validated
    Update,
}

/// The outcome of validating one write request: the document payload plus
/// the system columns the caller may set through the wire names `isActive`
/// and `order`.
#[derive(Debug, Default)]
pub struct ValidatedWrite {
    pub doc: Map<String, Value>,
    pub is_active: Option<bool>,
    pub position: Option<i64>,
}

pub fn validate(
    desc: &ResourceDescriptor,
    input: &Value,
    mode: Mode,
) -> Result<ValidatedWrite, Vec<FieldError>> {
    let body = match input.as_object() {
        Some(map) => map,
        None => {
            return Err(vec![FieldError::new(
                "body",
                "Request body must be a JSON object",
                None,
            )])
        }
    };

    let mut errors = Vec::new();
    let mut out = ValidatedWrite::default();

    for field in READ_ONLY_FIELDS {
        if body.contains_key(*field) {
            errors.push(FieldError::new(
                *field,
                format!("{} is read-only", field),
                body.get(*field).cloned(),
            ));
        }
    }
    for derived in desc.derived {
        if body.contains_key(derived.target()) {
            errors.push(FieldError::new(
                derived.target(),
                format!("{} is computed and cannot be set", derived.target()),
                body.get(derived.target()).cloned(),
            ));
        }
    }

    // System columns exposed under their wire names
    if let Some(value) = body.get("isActive") {
        match value.as_bool() {
            Some(flag) => out.is_active = Some(flag),
            None => errors.push(FieldError::new(
                "isActive",
                "isActive must be a boolean",
                Some(value.clone()),
            )),
        }
    }
    if let Some(value) = body.get("order") {
        match value.as_i64() {
            Some(position) => out.position = Some(position),
            None => errors.push(FieldError::new(
                "order",
                "order must be an integer",
                Some(value.clone()),
            )),
        }
    }

    for spec in desc.fields {
        match body.get(spec.name) {
            None | Some(Value::Null) => {
                if mode == Mode::Create {
                    if let Some(default) = spec.default {
                        out.doc.insert(spec.name.to_string(), default.to_value());
                    } else if spec.required {
                        errors.push(FieldError::new(
                            spec.name,
                            format!("{} is required", spec.label),
                            None,
                        ));
                    }
                } else if spec.required && body.contains_key(spec.name) {
                    // Explicit null on a required field is a removal attempt
                    errors.push(FieldError::new(
                        spec.name,
                        format!("{} is required", spec.label),
                        None,
                    ));
                }
            }
            Some(value) => match check_field(spec, value) {
                Ok(()) => {
                    out.doc.insert(spec.name.to_string(), value.clone());
                }
                Err(field_errors) => errors.extend(field_errors),
            },
        }
    }

    // Unknown fields are dropped silently (strict-mode document behavior)

    if errors.is_empty() {
        Ok(out)
    } else {
        Err(errors)
    }
}

/// Check that a merged document still carries every required field. The
/// update path runs this after overlaying the validated patch on the stored
/// document, so stored system-stamped fields survive while removals of
/// required fields are still caught.
pub fn missing_required(desc: &ResourceDescriptor, doc: &Map<String, Value>) -> Vec<FieldError> {
    desc.fields
        .iter()
        .filter(|spec| spec.required)
        .filter(|spec| matches!(doc.get(spec.name), None | Some(Value::Null)))
        .map(|spec| FieldError::new(spec.name, format!("{} is required", spec.label), None))
        .collect()
}

/// Build the default document for a resource from its declared defaults.
/// Used for the lazily created contact singleton.
pub fn default_doc(desc: &ResourceDescriptor) -> Map<String, Value> {
    let mut doc = Map::new();
    for spec in desc.fields {
        if let Some(default) = spec.default {
            doc.insert(spec.name.to_string(), default.to_value());
        }
    }
    doc
}

fn check_field(spec: &FieldSpec, value: &Value) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    match spec.kind {
        FieldKind::Text { max } => match value.as_str() {
            Some(s) => {
                if spec.required && s.trim().is_empty() {
                    errors.push(FieldError::new(
                        spec.name,
                        format!("{} is required", spec.label),
                        Some(value.clone()),
                    ));
                } else if s.chars().count() > max {
                    errors.push(FieldError::new(
                        spec.name,
                        format!("{} must be at most {} characters", spec.label, max),
                        Some(value.clone()),
                    ));
                }
            }
            None => errors.push(type_error(spec, "a string", value)),
        },
        FieldKind::Integer { min, max } => match value.as_i64() {
            Some(n) => {
                if n < min || n > max {
                    errors.push(FieldError::new(
                        spec.name,
                        format!("{} must be between {} and {}", spec.label, min, max),
                        Some(value.clone()),
                    ));
                }
            }
            None => errors.push(type_error(spec, "an integer", value)),
        },
        FieldKind::Flag => {
            if !value.is_boolean() {
                errors.push(type_error(spec, "a boolean", value));
            }
        }
        FieldKind::Date => match value.as_str() {
            Some(s) if parse_date(s).is_some() => {}
            _ => errors.push(FieldError::new(
                spec.name,
                format!("{} must be a valid date (YYYY-MM-DD)", spec.label),
                Some(value.clone()),
            )),
        },
        FieldKind::Enum { values } => match value.as_str() {
            Some(s) if values.contains(&s) => {}
            _ => errors.push(FieldError::new(
                spec.name,
                format!("{} must be one of: {}", spec.label, values.join(", ")),
                Some(value.clone()),
            )),
        },
        FieldKind::Url => match value.as_str() {
            Some(s) if is_http_url(s) => {}
            _ => errors.push(FieldError::new(
                spec.name,
                format!("{} must be a valid URL", spec.label),
                Some(value.clone()),
            )),
        },
        FieldKind::Email => match value.as_str() {
            Some(s) if EMAIL_PATTERN.is_match(s) => {}
            _ => errors.push(FieldError::new(
                spec.name,
                format!("{} must be a valid email address", spec.label),
                Some(value.clone()),
            )),
        },
        FieldKind::TextArray { max_item, non_empty } => match value.as_array() {
            Some(items) => {
                if non_empty && items.is_empty() {
                    errors.push(FieldError::new(
                        spec.name,
                        format!("{} must not be empty", spec.label),
                        Some(value.clone()),
                    ));
                }
                for (index, item) in items.iter().enumerate() {
                    match item.as_str() {
                        Some(s) if s.chars().count() <= max_item => {}
                        Some(_) => errors.push(FieldError::new(
                            format!("{}[{}]", spec.name, index),
                            format!("{} entries must be at most {} characters", spec.label, max_item),
                            Some(item.clone()),
                        )),
                        None => errors.push(FieldError::new(
                            format!("{}[{}]", spec.name, index),
                            format!("{} entries must be strings", spec.label),
                            Some(item.clone()),
                        )),
                    }
                }
            }
            None => errors.push(type_error(spec, "an array of strings", value)),
        },
        FieldKind::RefArray => match value.as_array() {
            Some(items) => {
                for (index, item) in items.iter().enumerate() {
                    let valid = item
                        .as_str()
                        .map(|s| uuid::Uuid::parse_str(s).is_ok())
                        .unwrap_or(false);
                    if !valid {
                        errors.push(FieldError::new(
                            format!("{}[{}]", spec.name, index),
                            format!("{} entries must be record identifiers", spec.label),
                            Some(item.clone()),
                        ));
                    }
                }
            }
            None => errors.push(type_error(spec, "an array of record identifiers", value)),
        },
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn type_error(spec: &FieldSpec, expected: &str, value: &Value) -> FieldError {
    FieldError::new(
        spec.name,
        format!("{} must be {}", spec.label, expected),
        Some(value.clone()),
    )
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

fn is_http_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::catalog;
    use serde_json::json;

    #[test]
    fn valid_skill_passes_with_defaults() {
        let input = json!({
            "name": "React",
            "category": "Frontend Development",
            "level": 85
        });
        let out = validate(&catalog::SKILLS, &input, Mode::Create).unwrap();
        assert_eq!(out.doc["level"], json!(85));
        assert_eq!(out.doc["name"], json!("React"));
        assert!(out.is_active.is_none());
    }

    #[test]
    fn out_of_range_level_reports_exact_message() {
        let input = json!({
            "name": "React",
            "category": "Frontend Development",
            "level": 150
        });
        let errors = validate(&catalog::SKILLS, &input, Mode::Create).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "level");
        assert_eq!(errors[0].message, "Skill level must be between 0 and 100");
        assert_eq!(errors[0].value, Some(json!(150)));
    }

    #[test]
    fn all_violations_reported_at_once() {
        let input = json!({
            "category": "Not A Category",
            "level": -3
        });
        let errors = validate(&catalog::SKILLS, &input, Mode::Create).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"category"));
        assert!(fields.contains(&"level"));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn update_mode_accepts_partial_bodies() {
        let input = json!({ "level": 90 });
        let out = validate(&catalog::SKILLS, &input, Mode::Update).unwrap();
        assert_eq!(out.doc.len(), 1);
        assert_eq!(out.doc["level"], json!(90));
    }

    #[test]
    fn read_only_and_derived_fields_are_rejected() {
        let input = json!({
            "name": "React",
            "category": "Frontend Development",
            "level": 10,
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "proficiencyLabel": "Expert"
        });
        let errors = validate(&catalog::SKILLS, &input, Mode::Create).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"id"));
        assert!(fields.contains(&"proficiencyLabel"));
    }

    #[test]
    fn unknown_fields_are_dropped_silently() {
        let input = json!({
            "name": "React",
            "category": "Frontend Development",
            "level": 50,
            "sneaky": "value"
        });
        let out = validate(&catalog::SKILLS, &input, Mode::Create).unwrap();
        assert!(!out.doc.contains_key("sneaky"));
    }

    #[test]
    fn project_defaults_and_array_rules_apply() {
        let input = json!({
            "title": "Folio",
            "description": "A portfolio backend",
            "technologies": ["Rust", "Axum"],
            "category": "API"
        });
        let out = validate(&catalog::PROJECTS, &input, Mode::Create).unwrap();
        assert_eq!(out.doc["status"], json!("completed"));
        assert_eq!(out.doc["featured"], json!(false));

        let bad = json!({
            "title": "Folio",
            "description": "A portfolio backend",
            "technologies": [],
            "category": "API"
        });
        let errors = validate(&catalog::PROJECTS, &bad, Mode::Create).unwrap_err();
        assert_eq!(errors[0].field, "technologies");
        assert_eq!(errors[0].message, "Technologies must not be empty");
    }

    #[test]
    fn per_element_array_bounds_name_the_offending_index() {
        let long_tag = "x".repeat(31);
        let input = json!({
            "title": "Folio",
            "description": "d",
            "technologies": ["ok", long_tag],
            "category": "API"
        });
        let errors = validate(&catalog::PROJECTS, &input, Mode::Create).unwrap_err();
        assert_eq!(errors[0].field, "technologies[1]");
    }

    #[test]
    fn url_email_and_date_formats_are_checked() {
        let input = json!({
            "title": "Folio",
            "description": "d",
            "technologies": ["Rust"],
            "category": "API",
            "githubUrl": "not a url",
            "startDate": "yesterday"
        });
        let errors = validate(&catalog::PROJECTS, &input, Mode::Create).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"githubUrl"));
        assert!(fields.contains(&"startDate"));

        let message = json!({
            "name": "A",
            "email": "not-an-email",
            "message": "hi"
        });
        let errors = validate(&catalog::MESSAGES, &message, Mode::Create).unwrap_err();
        assert_eq!(errors[0].field, "email");
        assert_eq!(errors[0].message, "Email must be a valid email address");
    }

    #[test]
    fn ref_arrays_require_uuids() {
        let input = json!({
            "name": "Rust",
            "category": "Language",
            "projects": ["not-a-uuid"]
        });
        let errors = validate(&catalog::TECHNOLOGIES, &input, Mode::Create).unwrap_err();
        assert_eq!(errors[0].field, "projects[0]");
    }

    #[test]
    fn wire_system_columns_are_extracted() {
        let input = json!({
            "name": "React",
            "category": "Frontend Development",
            "level": 50,
            "isActive": false,
            "order": 7
        });
        let out = validate(&catalog::SKILLS, &input, Mode::Create).unwrap();
        assert_eq!(out.is_active, Some(false));
        assert_eq!(out.position, Some(7));
        assert!(!out.doc.contains_key("isActive"));
        assert!(!out.doc.contains_key("order"));
    }

    #[test]
    fn contact_defaults_build_the_singleton_document() {
        let doc = default_doc(&catalog::CONTACT);
        assert_eq!(doc["email"], json!("hello@example.com"));
        assert_eq!(doc["availability"], json!("available"));
        assert!(!doc.contains_key("phone"));
    }

    #[test]
    fn dates_accept_both_plain_and_rfc3339() {
        assert!(parse_date("2023-04-01").is_some());
        assert!(parse_date("2023-04-01T10:00:00Z").is_some());
        assert!(parse_date("April 1st").is_none());
    }
}
