//! pf-document: model document format, loading and storage.
//!
//! A model document is the YAML/JSON rendition of one PRODML product flow
//! model. Loading lowers it into a validated `pf_network::Model`; saving
//! raises a model back into document form.

pub mod lower;
pub mod schema;
pub mod store;

use std::path::Path;

use pf_network::{Model, NetworkError};
use tracing::{debug, warn};

pub use lower::{FieldFinding, ValidationReport, lower, raise};
pub use schema::*;
pub use store::DocumentStore;

pub type DocumentResult<T> = Result<T, DocumentError>;

#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationReport),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
}

fn lower_logged(doc: &ModelDocument, source: &str) -> DocumentResult<Model> {
    let result = lower(doc);
    match &result {
        Ok(model) => debug!(source, model = %model, "loaded model document"),
        Err(DocumentError::Validation(report)) => {
            warn!(source, findings = report.len(), "model document has field findings")
        }
        Err(e) => warn!(source, error = %e, "model document rejected"),
    }
    result
}

pub fn from_yaml_str(content: &str) -> DocumentResult<Model> {
    let doc: ModelDocument = serde_yaml::from_str(content)?;
    lower_logged(&doc, "yaml")
}

pub fn from_json_str(content: &str) -> DocumentResult<Model> {
    let doc: ModelDocument = serde_json::from_str(content)?;
    lower_logged(&doc, "json")
}

pub fn to_yaml_string(model: &Model) -> DocumentResult<String> {
    Ok(serde_yaml::to_string(&raise(model))?)
}

pub fn to_json_string(model: &Model) -> DocumentResult<String> {
    Ok(serde_json::to_string_pretty(&raise(model))?)
}

pub fn load_yaml(path: &Path) -> DocumentResult<Model> {
    let content = std::fs::read_to_string(path)?;
    let doc: ModelDocument = serde_yaml::from_str(&content)?;
    lower_logged(&doc, &path.display().to_string())
}

pub fn save_yaml(path: &Path, model: &Model) -> DocumentResult<()> {
    let content = to_yaml_string(model)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> DocumentResult<Model> {
    let content = std::fs::read_to_string(path)?;
    let doc: ModelDocument = serde_json::from_str(&content)?;
    lower_logged(&doc, &path.display().to_string())
}

pub fn save_json(path: &Path, model: &Model) -> DocumentResult<()> {
    let content = to_json_string(model)?;
    std::fs::write(path, content)?;
    Ok(())
}
