//! Record to markup dispatch.

use std::fmt::{self, Write};
use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::form::{FormKind, FormRecord, Framework};
use crate::logging::{debug, warn};
use crate::remote::{RemoteHtmlCache, submit_url};
use crate::settings::Settings;
use crate::store::CachedFormStore;

use super::field::render_field;
use super::node::escape;

const FORM_NOT_FOUND: &str = "Form not found.";
const NO_FIELDS: &str = "No form fields configured.";
const LOAD_FAILED: &str = "Unable to load form.";
const DEFAULT_SUBMIT_TEXT: &str = "Submit";

/// Rendered HTML, ready to be embedded in a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    /// The user-visible error fragment.
    pub fn error(message: &str) -> Self {
        Self(format!(
            r#"<div class="formshive-error">{}</div>"#,
            escape(message)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_error(&self) -> bool {
        self.0.starts_with(r#"<div class="formshive-error">"#)
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Markup> for String {
    fn from(markup: Markup) -> Self {
        markup.0
    }
}

/// Attributes naming the form to render, as an embedding page passes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RenderAttributes {
    /// Local record id. Takes precedence over `form_id`. Blank or
    /// non-numeric input counts as absent.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<u64>,
    /// External form ID.
    #[serde(default)]
    pub form_id: Option<String>,
    /// Framework override.
    #[serde(default)]
    pub framework: Option<String>,
}

/// Embedding pages send every attribute, empty ones as `""`.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Number(id)) => Some(id),
        Some(RawId::Text(text)) => text.trim().parse().ok(),
        None => None,
    }
    .filter(|id| *id > 0))
}

/// Turns records into markup.
///
/// Rendering never fails: every problem becomes an error fragment and the
/// underlying cause is logged.
pub struct RenderPipeline {
    forms: Arc<CachedFormStore>,
    remote: Arc<RemoteHtmlCache>,
    settings: Settings,
}

impl RenderPipeline {
    pub fn new(forms: Arc<CachedFormStore>, remote: Arc<RemoteHtmlCache>, settings: Settings) -> Self {
        Self {
            forms,
            remote,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Render a record, optionally styled for another framework.
    ///
    /// An empty override keeps the record's framework; an unsupported one
    /// falls back to [`Framework::Formshive`].
    pub async fn render(&self, record: &FormRecord, framework: Option<&str>) -> Markup {
        let framework = Framework::coerce(framework, record.framework);
        match record.kind {
            FormKind::Embed => self.render_embed(record, framework).await,
            FormKind::Create => self.render_create(record),
        }
    }

    /// Resolve a record by numeric id, else by external ID, then render it.
    pub async fn render_attributes(&self, attrs: &RenderAttributes) -> Markup {
        let external_id = attrs
            .form_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let lookup = match (attrs.id.filter(|id| *id > 0), external_id) {
            (Some(id), _) => self.forms.get(id),
            (None, Some(form_id)) => self.forms.get_by_external_id(form_id),
            (None, None) => Ok(None),
        };

        match lookup {
            Ok(Some(record)) => self.render(&record, attrs.framework.as_deref()).await,
            Ok(None) => {
                debug!(id = ?attrs.id, form_id = ?attrs.form_id, "form not found for render");
                Markup::error(FORM_NOT_FOUND)
            }
            Err(e) => {
                warn!(id = ?attrs.id, form_id = ?attrs.form_id, error = %e, "form lookup failed");
                Markup::error(FORM_NOT_FOUND)
            }
        }
    }

    async fn render_embed(&self, record: &FormRecord, framework: Framework) -> Markup {
        let html = match self
            .remote
            .get_or_fetch(&record.external_form_id, framework)
            .await
        {
            Ok(html) => html,
            Err(e) => {
                warn!(
                    form_id = %record.external_form_id,
                    framework = %framework,
                    error = %e,
                    "failed to load remote form"
                );
                return Markup::error(LOAD_FAILED);
            }
        };

        Markup(format!(
            r#"<div id="{}" class="formshive-embed" data-form-id="{}" data-framework="{}">{}</div>"#,
            dom_id("formshive"),
            escape(&record.external_form_id),
            framework,
            html
        ))
    }

    fn render_create(&self, record: &FormRecord) -> Markup {
        if record.fields.is_empty() {
            return Markup::error(NO_FIELDS);
        }

        let container = dom_id("formshive-form");
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_form(&mut out, record, &container);
        Markup(out)
    }

    fn write_form(&self, out: &mut String, record: &FormRecord, container: &str) -> fmt::Result {
        write!(
            out,
            r#"<form id="{}" class="formshive-created-form" data-form-id="{}" action="{}" method="post">"#,
            container,
            escape(&record.external_form_id),
            escape(&submit_url(&self.settings.api_endpoint, &record.external_form_id))
        )?;

        for (n, field) in record.fields.iter().enumerate() {
            let element_id = format!("{}-field-{}", container, n + 1);
            write!(
                out,
                r#"<div class="formshive-field-wrapper">{}</div>"#,
                render_field(field).to_html(&element_id)
            )?;
        }

        let submit_text = record
            .submit_text
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SUBMIT_TEXT);
        write!(
            out,
            r#"<div class="formshive-submit-wrapper"><button type="submit" class="formshive-submit-btn">{}</button></div></form>"#,
            escape(submit_text)
        )
    }
}

/// A DOM id unique across renders.
fn dom_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}
