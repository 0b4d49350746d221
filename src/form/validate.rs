//! Structural validation of form candidates.

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::ValidationError;
use super::types::{FieldDescriptor, FormCandidate, FormKind, Framework, ValidatedForm};

#[allow(clippy::expect_used)]
static UUID_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-f0-9-]{36}$").expect("UUID pattern is a valid regex"));

/// Whether `id` has the 36 character hex-and-hyphen shape of a form ID.
pub fn is_uuid_format(id: &str) -> bool {
    UUID_FORMAT.is_match(id)
}

/// Validate a candidate, collecting every violated rule.
///
/// On success the candidate's name and form ID are trimmed and its framework
/// resolved: a missing framework becomes the default, an unsupported one
/// becomes [`Framework::Formshive`].
pub fn validate(candidate: &FormCandidate) -> Result<ValidatedForm, ValidationError> {
    let mut messages = Vec::new();

    let name = candidate.name.trim();
    let external_form_id = candidate.external_form_id.trim();

    if name.is_empty() {
        messages.push("Form name is required".to_string());
    }
    if external_form_id.is_empty() {
        messages.push("Form ID is required".to_string());
    }

    let kind = FormKind::parse(&candidate.kind);
    if kind.is_none() {
        messages.push("Valid form type is required".to_string());
    }

    if !external_form_id.is_empty() && !is_uuid_format(external_form_id) {
        messages.push("Form ID must be a valid UUID format".to_string());
    }

    let framework = Framework::coerce(candidate.framework.as_deref(), Framework::default());

    if kind == Some(FormKind::Create) {
        messages.extend(validate_fields(&candidate.form_data.fields));
    }

    match kind {
        Some(kind) if messages.is_empty() => Ok(ValidatedForm {
            name: name.to_string(),
            external_form_id: external_form_id.to_string(),
            kind,
            framework,
            form_data: candidate.form_data.clone(),
        }),
        _ => Err(ValidationError::new(messages)),
    }
}

/// Check the shape of each field; positions in messages are 1-based.
pub fn validate_fields(fields: &[FieldDescriptor]) -> Vec<String> {
    let mut messages = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        let position = index + 1;
        if !field.field_type.is_known() {
            if field.field_type.as_str().is_empty() {
                messages.push(format!("Field {}: type is required", position));
            } else {
                messages.push(format!(
                    "Field {}: type '{}' is not supported",
                    position, field.field_type
                ));
            }
        }
        if field.name.trim().is_empty() {
            messages.push(format!("Field {}: name is required", position));
        }
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::types::FieldType;

    const FORM_ID: &str = "2ce22659-397b-412c-abe8-a64ce53dc4a0";

    #[test]
    fn test_valid_embed_form() {
        let candidate = FormCandidate::new("Contact", FORM_ID, "embed").with_framework("bootstrap");
        let form = validate(&candidate).unwrap();
        assert_eq!(form.kind, FormKind::Embed);
        assert_eq!(form.framework, Framework::Bootstrap);
    }

    #[test]
    fn test_unsupported_framework_is_coerced() {
        let candidate = FormCandidate::new("Contact", FORM_ID, "embed").with_framework("tailwind");
        let form = validate(&candidate).unwrap();
        assert_eq!(form.framework, Framework::Formshive);
    }

    #[test]
    fn test_collects_all_errors() {
        let candidate = FormCandidate::new("", "", "survey");
        let err = validate(&candidate).unwrap_err();
        assert_eq!(
            err.messages(),
            [
                "Form name is required",
                "Form ID is required",
                "Valid form type is required",
            ]
        );
    }

    #[test]
    fn test_rejects_malformed_form_id() {
        let candidate = FormCandidate::new("Contact", "not-a-uuid", "embed");
        let err = validate(&candidate).unwrap_err();
        assert_eq!(err.messages(), ["Form ID must be a valid UUID format"]);
    }

    #[test]
    fn test_uuid_format_is_case_insensitive() {
        assert!(is_uuid_format("2CE22659-397B-412C-ABE8-A64CE53DC4A0"));
        assert!(!is_uuid_format("2ce22659-397b-412c-abe8-a64ce53dc4a"));
        assert!(!is_uuid_format("zce22659-397b-412c-abe8-a64ce53dc4a0"));
    }

    #[test]
    fn test_field_errors_join_the_aggregate() {
        let candidate = FormCandidate::new("", FORM_ID, "create")
            .with_field(FieldDescriptor::new("text", "first_name"))
            .with_field(FieldDescriptor::new("color", ""));
        let err = validate(&candidate).unwrap_err();
        assert_eq!(
            err.messages(),
            [
                "Form name is required",
                "Field 2: type 'color' is not supported",
                "Field 2: name is required",
            ]
        );
    }

    #[test]
    fn test_embed_forms_skip_field_checks() {
        let candidate = FormCandidate::new("Contact", FORM_ID, "embed")
            .with_field(FieldDescriptor::new(FieldType::default(), ""));
        assert!(validate(&candidate).is_ok());
    }

    #[test]
    fn test_choice_fields_may_have_no_options() {
        let candidate = FormCandidate::new("Poll", FORM_ID, "create")
            .with_field(FieldDescriptor::new("radio", "answer"));
        assert!(validate(&candidate).is_ok());
    }
}
