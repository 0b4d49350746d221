//! Data types for form records and their field descriptors.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a form's markup is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    /// Markup is fetched from the Formshive API at render time.
    Embed,
    /// Markup is built locally from the declared field list.
    Create,
}

impl FormKind {
    /// Parse a kind tag. Unknown tags yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "embed" => Some(Self::Embed),
            "create" => Some(Self::Create),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Embed => "embed",
            Self::Create => "create",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CSS framework the remote HTML is styled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Formshive,
    #[default]
    Bootstrap,
    Bulma,
}

impl Framework {
    /// Every framework the remote API can style for.
    pub const ALL: [Framework; 3] = [Self::Formshive, Self::Bootstrap, Self::Bulma];

    /// Parse a framework tag. Unknown tags yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "formshive" => Some(Self::Formshive),
            "bootstrap" => Some(Self::Bootstrap),
            "bulma" => Some(Self::Bulma),
            _ => None,
        }
    }

    /// Resolve user input to a framework.
    ///
    /// Empty input takes `default`; unsupported input falls back to
    /// [`Framework::Formshive`] without raising an error.
    pub fn coerce(input: Option<&str>, default: Framework) -> Self {
        match input.map(str::trim) {
            None | Some("") => default,
            Some(s) => Self::parse(s).unwrap_or(Self::Formshive),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Formshive => "formshive",
            Self::Bootstrap => "bootstrap",
            Self::Bulma => "bulma",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publication status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    #[default]
    Active,
    Inactive,
}

impl FormStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input type of a single field.
///
/// Tags the renderer does not know are kept verbatim in [`FieldType::Other`]
/// so the validator can report them by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Email,
    Tel,
    Url,
    Number,
    Date,
    Datetime,
    Time,
    Textarea,
    Select,
    Radio,
    Checkbox,
    File,
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Tel => "tel",
            Self::Url => "url",
            Self::Number => "number",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Time => "time",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::File => "file",
            Self::Other(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl Default for FieldType {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "text" => Self::Text,
            "email" => Self::Email,
            "tel" => Self::Tel,
            "url" => Self::Url,
            "number" => Self::Number,
            "date" => Self::Date,
            "datetime" => Self::Datetime,
            "time" => Self::Time,
            "textarea" => Self::Textarea,
            "select" => Self::Select,
            "radio" => Self::Radio,
            "checkbox" => Self::Checkbox,
            "file" => Self::File,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for FieldType {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable entry of a select, radio or checkbox field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldOption {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub label: String,
}

impl FieldOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Declarative description of one input in a `create` form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    /// Machine name, used as the submitted key.
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    /// Visible rows, textarea only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    /// MIME type or extension filter, file only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
}

impl FieldDescriptor {
    pub fn new(field_type: impl Into<FieldType>, name: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(FieldOption::new(value, label));
        self
    }

    pub fn with_rows(mut self, rows: u32) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }
}

/// The `form_data` payload: field list plus submit button override.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormData {
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_text: Option<String>,
}

impl FormData {
    /// Interpret an arbitrary JSON payload as form data.
    ///
    /// Anything that is not a JSON object is treated as an empty payload.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        if !value.is_object() {
            return Ok(Self::default());
        }
        serde_json::from_value(value)
    }
}

/// Unvalidated input for an insert or update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormCandidate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub external_form_id: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub form_data: FormData,
}

impl FormCandidate {
    pub fn new(
        name: impl Into<String>,
        external_form_id: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            external_form_id: external_form_id.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = Some(framework.into());
        self
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.form_data.fields.push(field);
        self
    }

    pub fn with_submit_text(mut self, text: impl Into<String>) -> Self {
        self.form_data.submit_text = Some(text.into());
        self
    }
}

/// A candidate that passed validation, with its framework resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedForm {
    pub name: String,
    pub external_form_id: String,
    pub kind: FormKind,
    pub framework: Framework,
    pub form_data: FormData,
}

/// A persisted form record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormRecord {
    pub id: u64,
    pub name: String,
    pub external_form_id: String,
    pub kind: FormKind,
    pub framework: Framework,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_text: Option<String>,
    pub status: FormStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FormRecord {
    /// The record's field list and submit text in `form_data` shape.
    pub fn form_data(&self) -> FormData {
        FormData {
            fields: self.fields.clone(),
            submit_text: self.submit_text.clone(),
        }
    }

    /// Rebuild an insertable candidate from this record.
    pub fn to_candidate(&self) -> FormCandidate {
        FormCandidate {
            name: self.name.clone(),
            external_form_id: self.external_form_id.clone(),
            kind: self.kind.as_str().to_string(),
            framework: Some(self.framework.as_str().to_string()),
            form_data: self.form_data(),
        }
    }
}

/// Aggregate counts over the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormStats {
    pub total: u64,
    pub active: u64,
    pub embed_count: u64,
    pub create_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framework_coercion() {
        assert_eq!(Framework::coerce(Some("bulma"), Framework::Bootstrap), Framework::Bulma);
        assert_eq!(Framework::coerce(Some("tailwind"), Framework::Bootstrap), Framework::Formshive);
        assert_eq!(Framework::coerce(Some(""), Framework::Bulma), Framework::Bulma);
        assert_eq!(Framework::coerce(None, Framework::Bootstrap), Framework::Bootstrap);
    }

    #[test]
    fn test_field_type_keeps_unknown_tag() {
        let field: FieldDescriptor =
            serde_json::from_str(r#"{"type": "color", "name": "fav"}"#).unwrap();
        assert_eq!(field.field_type, FieldType::Other("color".into()));
        assert!(!field.field_type.is_known());

        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "color");
    }

    #[test]
    fn test_form_data_from_non_object_is_empty() {
        let data = FormData::from_value(serde_json::json!("not an object")).unwrap();
        assert!(data.fields.is_empty());
        assert!(data.submit_text.is_none());

        let data = FormData::from_value(serde_json::json!({
            "fields": [{"type": "email", "name": "email", "required": true}],
            "submit_text": "Send"
        }))
        .unwrap();
        assert_eq!(data.fields.len(), 1);
        assert_eq!(data.fields.first().map(|f| &f.field_type), Some(&FieldType::Email));
        assert_eq!(data.submit_text.as_deref(), Some("Send"));
    }
}
