//! Form records, field descriptors and their validation.

mod error;
mod types;
mod validate;

pub use error::ValidationError;
pub use types::{
    FieldDescriptor, FieldOption, FieldType, FormCandidate, FormData, FormKind, FormRecord,
    FormStats, FormStatus, Framework, ValidatedForm,
};
pub use validate::{is_uuid_format, validate, validate_fields};
