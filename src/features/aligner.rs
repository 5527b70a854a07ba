use super::{CATEGORICAL_COLUMN, FeatureVector, HouseFeatures};
use crate::{Error, Result, error::PredictError};
use serde_json::{Map, Value};
use std::{
    collections::BTreeSet,
    io::Read,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};
use tracing::{debug, info};

/// Column layout the model was fitted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSchema {
    columns: Vec<String>,
}

impl ReferenceSchema {
    pub fn from_columns(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn load(path: impl AsRef<Path>, target: &str, rows: usize) -> Result<Self> {
        let path = path.as_ref();
        debug!("Deriving reference schema from {}", path.display());
        let reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        Self::derive(reader, target, rows)
    }

    pub fn from_reader<R: Read>(reader: R, target: &str, rows: usize) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);
        Self::derive(reader, target, rows)
    }

    /// Applies the training-time transform to the first `rows` records: the
    /// target is dropped and a raw categorical column becomes indicator
    /// columns, sorted, with the first category dropped. Yes/no columns keep
    /// their names, so only the categorical column needs record values.
    fn derive<R: Read>(mut reader: csv::Reader<R>, target: &str, rows: usize) -> Result<Self> {
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        if !headers.iter().any(|h| h == target) {
            return Err(Error::config(format!(
                "target column '{target}' not found in reference table"
            )));
        }

        let categorical_idx = headers.iter().position(|h| h == CATEGORICAL_COLUMN);

        let mut categories = BTreeSet::new();
        if let Some(idx) = categorical_idx {
            for record in reader.records().take(rows) {
                let record = record?;
                if let Some(value) = record.get(idx).filter(|v| !v.is_empty()) {
                    categories.insert(value.to_string());
                }
            }
        }

        let mut columns: Vec<String> = headers
            .iter()
            .filter(|h| h.as_str() != target && h.as_str() != CATEGORICAL_COLUMN)
            .cloned()
            .collect();

        columns.extend(
            categories
                .iter()
                .skip(1)
                .map(|category| format!("{CATEGORICAL_COLUMN}_{category}")),
        );

        Ok(Self { columns })
    }
}

#[derive(Debug, Clone)]
struct ReferenceSource {
    path: PathBuf,
    target: String,
    rows: usize,
}

/// Reshapes raw feature maps into the model's input schema.
///
/// The schema is derived once and cached; `reload` is the only way to
/// pick up a changed reference file.
pub struct SchemaAligner {
    source: Option<ReferenceSource>,
    schema: RwLock<Arc<ReferenceSchema>>,
}

impl SchemaAligner {
    pub fn load(path: impl Into<PathBuf>, target: &str, rows: usize) -> Result<Self> {
        let source = ReferenceSource {
            path: path.into(),
            target: target.to_string(),
            rows,
        };
        let schema = ReferenceSchema::load(&source.path, &source.target, source.rows)?;
        info!(
            "Reference schema loaded from {} with {} columns",
            source.path.display(),
            schema.columns().len()
        );

        Ok(Self {
            source: Some(source),
            schema: RwLock::new(Arc::new(schema)),
        })
    }

    pub fn from_schema(schema: ReferenceSchema) -> Self {
        Self {
            source: None,
            schema: RwLock::new(Arc::new(schema)),
        }
    }

    pub fn schema(&self) -> Arc<ReferenceSchema> {
        // The lock only guards an Arc swap, so a poisoned value is still whole.
        let guard = self.schema.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    pub fn align(&self, raw: &Map<String, Value>) -> std::result::Result<FeatureVector, PredictError> {
        let features = HouseFeatures::from_raw(raw)?;
        Ok(features.expand().align_to(&self.schema()))
    }

    /// Re-reads the reference file and swaps in the new schema.
    pub fn reload(&self) -> Result<Arc<ReferenceSchema>> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| Error::config("schema was not loaded from a reference file"))?;

        let schema = Arc::new(ReferenceSchema::load(
            &source.path,
            &source.target,
            source.rows,
        )?);

        let mut guard = self.schema.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::clone(&schema);
        info!(
            "Reference schema reloaded from {} with {} columns",
            source.path.display(),
            schema.columns().len()
        );
        Ok(schema)
    }
}
