use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use formshive::render::RenderPipeline;
use formshive::settings::DEFAULT_API_ENDPOINT;
use formshive::form::FormData;
use formshive::{
    CachedFormStore, FormCandidate, FormRecord, FormStatus, FormStore, HttpFetcher, MemoryCache,
    RemoteError, RemoteFormStatus, RemoteHtmlCache, Settings, StoreError, extract_external_id,
    validate_remote_form,
};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Form {0} not found")]
    FormNotFound(u64),

    #[error("Invalid Formshive URL: {0}")]
    InvalidUrl(String),

    #[error("Form {0} not found or not accessible")]
    RemoteFormNotFound(String),

    #[error("Form {0} exists but has no fields configured")]
    RemoteFormIncomplete(String),
}

/// Status filter for listing.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum StatusFilter {
    #[default]
    Active,
    Inactive,
    All,
}

impl StatusFilter {
    fn to_status(self) -> Option<FormStatus> {
        match self {
            Self::Active => Some(FormStatus::Active),
            Self::Inactive => Some(FormStatus::Inactive),
            Self::All => None,
        }
    }
}

#[derive(Parser)]
#[command(name = "formshive")]
#[command(about = "Manage Formshive form records and render them to HTML")]
struct Cli {
    /// Store path
    #[arg(long, global = true, default_value = ".formshive", env = "FORMSHIVE_PATH")]
    path: PathBuf,

    /// Formshive API endpoint
    #[arg(long, global = true, default_value = DEFAULT_API_ENDPOINT, env = "FORMSHIVE_ENDPOINT")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new form store
    Init,

    /// List forms, newest first
    List {
        #[arg(long, value_enum, default_value_t = StatusFilter::Active)]
        status: StatusFilter,
    },

    /// Print a form as JSON
    Get { id: u64 },

    /// Insert a form from a JSON file, or update one with --id
    Save {
        /// JSON file with name, form_id, type, framework and form_data
        #[arg(long)]
        file: PathBuf,

        /// Update this form instead of inserting
        #[arg(long)]
        id: Option<u64>,
    },

    /// Delete a form
    Delete { id: u64 },

    /// Copy a form under a new id
    Duplicate { id: u64 },

    /// Activate a form
    Activate { id: u64 },

    /// Deactivate a form
    Deactivate { id: u64 },

    /// Print form counts
    Stats,

    /// Render a form to HTML on stdout
    Render {
        id: u64,

        /// Framework override (formshive, bootstrap, bulma)
        #[arg(long)]
        framework: Option<String>,
    },

    /// Validate a Formshive digest URL and print its form ID
    CheckUrl { url: String },

    /// Remove every stored form
    Uninstall,
}

/// A form as written in a `save` input file.
#[derive(Debug, Deserialize)]
struct FormFile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    form_id: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    framework: Option<String>,
    #[serde(default)]
    form_data: serde_json::Value,
}

impl FormFile {
    fn into_candidate(self) -> Result<FormCandidate, AppError> {
        Ok(FormCandidate {
            name: self.name,
            external_form_id: self.form_id,
            kind: self.kind,
            framework: self.framework,
            form_data: FormData::from_value(self.form_data)?,
        })
    }
}

fn open_forms(path: &Path) -> Result<Arc<CachedFormStore>, AppError> {
    let store = FormStore::open(path)?;
    Ok(Arc::new(CachedFormStore::new(store, Arc::new(MemoryCache::new()))))
}

fn print_record(record: &FormRecord) {
    println!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        record.id, record.name, record.external_form_id, record.kind, record.framework, record.status
    );
}

fn report_validation(err: &StoreError) {
    if let Some(messages) = err.validation_messages() {
        for message in messages {
            eprintln!("  {}", message);
        }
    }
}

fn set_status(path: &Path, id: u64, status: FormStatus) -> Result<(), AppError> {
    let forms = open_forms(path)?;
    if !forms.set_status(id, status)? {
        return Err(AppError::FormNotFound(id));
    }
    println!("Form {} is now {}", id, status);
    Ok(())
}

fn check_remote_status(form_id: String, status: RemoteFormStatus) -> Result<String, AppError> {
    if !status.exists {
        return Err(AppError::RemoteFormNotFound(form_id));
    }
    if !status.has_valid_html {
        return Err(AppError::RemoteFormIncomplete(form_id));
    }
    Ok(form_id)
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let settings = Settings::default().with_endpoint(&cli.endpoint);
    let path = cli.path;

    match cli.command {
        Commands::Init => {
            let store = FormStore::init(&path)?;
            drop(store);
            println!("Initialized form store at {}", path.display());
            Ok(())
        }
        Commands::List { status } => {
            let forms = open_forms(&path)?;
            let records = forms.list(status.to_status())?;
            if records.is_empty() {
                println!("No forms found");
            } else {
                for record in &records {
                    print_record(record);
                }
            }
            Ok(())
        }
        Commands::Get { id } => {
            let forms = open_forms(&path)?;
            let record = forms.get(id)?.ok_or(AppError::FormNotFound(id))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Commands::Save { file, id } => {
            let forms = open_forms(&path)?;
            let mut form: FormFile = serde_json::from_str(&std::fs::read_to_string(&file)?)?;
            if form.framework.as_deref().is_none_or(|f| f.trim().is_empty()) {
                form.framework = Some(settings.default_framework.to_string());
            }
            let candidate = form.into_candidate()?;

            let result = match id.filter(|id| *id > 0) {
                None => forms.insert(&candidate),
                Some(id) => match forms.update(id, &candidate) {
                    Ok(true) => Ok(id),
                    Ok(false) => return Err(AppError::FormNotFound(id)),
                    Err(e) => Err(e),
                },
            };

            match result {
                Ok(id) => {
                    println!("Saved form {}", id);
                    Ok(())
                }
                Err(e) => {
                    report_validation(&e);
                    Err(e.into())
                }
            }
        }
        Commands::Delete { id } => {
            let forms = open_forms(&path)?;
            if !forms.delete(id)? {
                return Err(AppError::FormNotFound(id));
            }
            println!("Deleted form {}", id);
            Ok(())
        }
        Commands::Duplicate { id } => {
            let forms = open_forms(&path)?;
            let record = forms.get(id)?.ok_or(AppError::FormNotFound(id))?;
            let mut candidate = record.to_candidate();
            candidate.name = format!("{} (Copy)", record.name);
            let new_id = forms.insert(&candidate)?;
            println!("Duplicated form {} as {}", id, new_id);
            Ok(())
        }
        Commands::Activate { id } => set_status(&path, id, FormStatus::Active),
        Commands::Deactivate { id } => set_status(&path, id, FormStatus::Inactive),
        Commands::Stats => {
            let stats = open_forms(&path)?.stats()?;
            println!("total:  {}", stats.total);
            println!("active: {}", stats.active);
            println!("embed:  {}", stats.embed_count);
            println!("create: {}", stats.create_count);
            Ok(())
        }
        Commands::Render { id, framework } => {
            let forms = open_forms(&path)?;
            let record = forms.get(id)?.ok_or(AppError::FormNotFound(id))?;
            let fetcher = Arc::new(HttpFetcher::new(settings.request_timeout)?);
            let remote = Arc::new(RemoteHtmlCache::new(
                fetcher,
                Arc::new(MemoryCache::new()),
                settings.api_endpoint.clone(),
                settings.html_cache_ttl,
            ));
            let pipeline = RenderPipeline::new(forms, remote, settings);

            let runtime = tokio::runtime::Runtime::new()?;
            let markup = runtime.block_on(pipeline.render(&record, framework.as_deref()));
            println!("{}", markup);
            Ok(())
        }
        Commands::CheckUrl { url } => {
            let form_id = extract_external_id(&url).ok_or_else(|| AppError::InvalidUrl(url.clone()))?;
            let fetcher = HttpFetcher::new(settings.request_timeout)?;

            let runtime = tokio::runtime::Runtime::new()?;
            let status = runtime.block_on(validate_remote_form(
                &fetcher,
                &settings.api_endpoint,
                &form_id,
            ));

            println!("{}", check_remote_status(form_id, status)?);
            Ok(())
        }
        Commands::Uninstall => {
            let forms = open_forms(&path)?;
            let removed = forms.purge()?;
            println!("Removed {} form(s) from {}", removed, path.display());
            Ok(())
        }
    }
}
