//! Structured render output and its HTML serialization.

use std::fmt::{self, Write};

use crate::form::FieldType;

/// One selectable entry in a choice control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

/// Label shown above a control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLabel {
    pub text: String,
    /// Render a required marker after the text.
    pub required: bool,
}

/// The input element(s) a field renders to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// Single-line `<input>` of the given type.
    Input {
        input_type: &'static str,
        name: String,
        placeholder: String,
        required: bool,
    },
    TextArea {
        name: String,
        placeholder: String,
        rows: u32,
        required: bool,
    },
    /// `<select>`; a placeholder, when present, is the first choice with an
    /// empty value.
    Select {
        name: String,
        required: bool,
        choices: Vec<Choice>,
    },
    /// One radio button per choice, all sharing `name`.
    RadioGroup {
        name: String,
        required: bool,
        choices: Vec<Choice>,
    },
    /// One checkbox per choice; `name` already carries the `[]` suffix.
    CheckboxGroup { name: String, choices: Vec<Choice> },
    File {
        name: String,
        accept: Option<String>,
        required: bool,
    },
}

/// A rendered field: optional label, control and description.
///
/// A field whose type is not recognized has no control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNode {
    pub field_type: FieldType,
    pub label: Option<FieldLabel>,
    pub control: Option<Control>,
    pub description: Option<String>,
}

impl FieldNode {
    /// Serialize to HTML. `element_id` ties the label to its control.
    pub fn to_html(&self, element_id: &str) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_html(&mut out, element_id);
        out
    }

    fn write_html(&self, out: &mut String, element_id: &str) -> fmt::Result {
        write!(
            out,
            r#"<div class="formshive-field formshive-field-{}">"#,
            escape(self.field_type.as_str())
        )?;

        if let Some(label) = &self.label {
            write!(
                out,
                r#"<label for="{}" class="formshive-label">{}"#,
                escape(element_id),
                escape(&label.text)
            )?;
            if label.required {
                out.push_str(r#" <span class="required">*</span>"#);
            }
            out.push_str("</label>");
        }

        if let Some(control) = &self.control {
            write_control(out, control, element_id)?;
        }

        if let Some(description) = &self.description {
            write!(
                out,
                r#"<small class="formshive-field-description">{}</small>"#,
                escape(description)
            )?;
        }

        out.push_str("</div>");
        Ok(())
    }
}

fn write_control(out: &mut String, control: &Control, element_id: &str) -> fmt::Result {
    match control {
        Control::Input {
            input_type,
            name,
            placeholder,
            required,
        } => write!(
            out,
            r#"<input type="{}" id="{}" name="{}" placeholder="{}" class="formshive-input"{}>"#,
            input_type,
            escape(element_id),
            escape(name),
            escape(placeholder),
            required_attr(*required)
        ),
        Control::TextArea {
            name,
            placeholder,
            rows,
            required,
        } => write!(
            out,
            r#"<textarea id="{}" name="{}" placeholder="{}" class="formshive-textarea" rows="{}"{}></textarea>"#,
            escape(element_id),
            escape(name),
            escape(placeholder),
            rows,
            required_attr(*required)
        ),
        Control::Select {
            name,
            required,
            choices,
        } => {
            write!(
                out,
                r#"<select id="{}" name="{}" class="formshive-select"{}>"#,
                escape(element_id),
                escape(name),
                required_attr(*required)
            )?;
            for choice in choices {
                write!(
                    out,
                    r#"<option value="{}">{}</option>"#,
                    escape(&choice.value),
                    escape(&choice.label)
                )?;
            }
            out.push_str("</select>");
            Ok(())
        }
        Control::RadioGroup {
            name,
            required,
            choices,
        } => write_choice_group(out, "radio", name, *required, choices),
        Control::CheckboxGroup { name, choices } => {
            write_choice_group(out, "checkbox", name, false, choices)
        }
        Control::File {
            name,
            accept,
            required,
        } => {
            write!(
                out,
                r#"<input type="file" id="{}" name="{}" class="formshive-file"{}"#,
                escape(element_id),
                escape(name),
                required_attr(*required)
            )?;
            if let Some(accept) = accept {
                write!(out, r#" accept="{}""#, escape(accept))?;
            }
            out.push('>');
            Ok(())
        }
    }
}

fn write_choice_group(
    out: &mut String,
    kind: &str,
    name: &str,
    required: bool,
    choices: &[Choice],
) -> fmt::Result {
    if choices.is_empty() {
        return Ok(());
    }

    write!(out, r#"<div class="formshive-{}-group">"#, kind)?;
    for choice in choices {
        write!(
            out,
            r#"<label class="formshive-{kind}-label"><input type="{kind}" name="{}" value="{}" class="formshive-{kind}"{}> {}</label>"#,
            escape(name),
            escape(&choice.value),
            required_attr(required),
            escape(&choice.label),
        )?;
    }
    out.push_str("</div>");
    Ok(())
}

fn required_attr(required: bool) -> &'static str {
    if required { " required" } else { "" }
}

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
