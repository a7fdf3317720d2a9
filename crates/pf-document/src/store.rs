//! In-memory document store.
//!
//! Filled once (from files or already-built models) and then only read; it
//! serves as the `ModelLookup` for cross-document resolution.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use pf_core::DataObjectReference;
use pf_network::{Model, ModelLookup};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{DocumentResult, load_json, load_yaml};

#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    models: HashMap<Uuid, Arc<Model>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a model, replacing any earlier document with the same UUID.
    pub fn insert(&mut self, model: Model) -> Arc<Model> {
        let model = Arc::new(model);
        if self.models.insert(model.uuid(), Arc::clone(&model)).is_some() {
            warn!(model = %model, "replaced model document with the same uuid");
        }
        model
    }

    /// Load one `.yaml`/`.yml`/`.json` document and add it.
    pub fn load_file(&mut self, path: &Path) -> DocumentResult<Arc<Model>> {
        let model = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => load_json(path)?,
            _ => load_yaml(path)?,
        };
        Ok(self.insert(model))
    }

    /// Load every document file in a directory (not recursive), in file name
    /// order. Stops at the first document that fails to load.
    pub fn load_dir(&mut self, dir: &Path) -> DocumentResult<usize> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_document = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml" | "yml" | "json")
            );
            if path.is_file() && is_document {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            self.load_file(path)?;
        }
        debug!(dir = %dir.display(), documents = paths.len(), "loaded document directory");
        Ok(paths.len())
    }

    pub fn get(&self, uuid: Uuid) -> Option<&Arc<Model>> {
        self.models.get(&uuid)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn models(&self) -> impl Iterator<Item = &Arc<Model>> {
        self.models.values()
    }
}

impl ModelLookup for DocumentStore {
    /// Only `ProductFlowModel` references resolve; the version is not
    /// consulted because the store keeps one revision per document.
    fn lookup(&self, reference: &DataObjectReference) -> Option<Arc<Model>> {
        if reference.object_type() != DataObjectReference::PRODUCT_FLOW_MODEL {
            return None;
        }
        self.models.get(&reference.uuid()).cloned()
    }
}

impl FromIterator<Model> for DocumentStore {
    fn from_iter<I: IntoIterator<Item = Model>>(iter: I) -> Self {
        let mut store = Self::new();
        for model in iter {
            store.insert(model);
        }
        store
    }
}
