//! Rendering of form records to HTML.
//!
//! [`render_field`] turns one [`FieldDescriptor`](crate::form::FieldDescriptor)
//! into a [`FieldNode`]; [`RenderPipeline`] renders whole records, fetching
//! remote HTML for embedded forms and building locally created ones.

mod field;
mod node;
mod pipeline;

pub use field::{DEFAULT_TEXTAREA_ROWS, render_field};
pub use node::{Choice, Control, FieldLabel, FieldNode, escape};
pub use pipeline::{Markup, RenderAttributes, RenderPipeline};
