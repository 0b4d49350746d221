//! Field descriptor to render node dispatch.

use crate::form::{FieldDescriptor, FieldOption, FieldType};

use super::node::{Choice, Control, FieldLabel, FieldNode};

/// Rows of a textarea that does not set its own.
pub const DEFAULT_TEXTAREA_ROWS: u32 = 4;

/// Render one field descriptor.
///
/// Empty label, placeholder and description strings count as absent. An
/// unrecognized field type renders a node without a control.
pub fn render_field(field: &FieldDescriptor) -> FieldNode {
    let name = field.name.clone();
    let placeholder = non_empty(&field.placeholder);
    let required = field.required;

    let control = match &field.field_type {
        FieldType::Text => Some(input("text", field)),
        FieldType::Email => Some(input("email", field)),
        FieldType::Tel => Some(input("tel", field)),
        FieldType::Url => Some(input("url", field)),
        FieldType::Number => Some(input("number", field)),
        FieldType::Date => Some(input("date", field)),
        FieldType::Datetime => Some(input("datetime", field)),
        FieldType::Time => Some(input("time", field)),
        FieldType::Textarea => Some(Control::TextArea {
            name,
            placeholder: placeholder.clone().unwrap_or_default(),
            rows: field.rows.unwrap_or(DEFAULT_TEXTAREA_ROWS),
            required,
        }),
        FieldType::Select => {
            let leading = placeholder.clone().map(|label| Choice {
                value: String::new(),
                label,
            });
            Some(Control::Select {
                name,
                required,
                choices: leading.into_iter().chain(choices(&field.options)).collect(),
            })
        }
        FieldType::Radio => Some(Control::RadioGroup {
            name,
            required,
            choices: choices(&field.options).collect(),
        }),
        FieldType::Checkbox => Some(Control::CheckboxGroup {
            name: format!("{}[]", name),
            choices: choices(&field.options).collect(),
        }),
        FieldType::File => Some(Control::File {
            name,
            accept: non_empty(&field.accept),
            required,
        }),
        FieldType::Other(_) => None,
    };

    FieldNode {
        field_type: field.field_type.clone(),
        label: non_empty(&field.label).map(|text| FieldLabel { text, required }),
        control,
        description: non_empty(&field.description),
    }
}

fn input(input_type: &'static str, field: &FieldDescriptor) -> Control {
    Control::Input {
        input_type,
        name: field.name.clone(),
        placeholder: non_empty(&field.placeholder).unwrap_or_default(),
        required: field.required,
    }
}

fn choices(options: &[FieldOption]) -> impl Iterator<Item = Choice> + '_ {
    options.iter().map(|option| Choice {
        value: option.value.clone(),
        label: option.label.clone(),
    })
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
}
