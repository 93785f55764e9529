// ============================================================
// Layer 2 — Shared Preparation Steps
// ============================================================
// The steps both use cases run before they partition anything:
//
//   Step 1: Load metadata + feature config   (Layer 4 - data)
//   Step 2: Keep only datasets marked in use
//   Step 3: Load and normalize the raw table (Layer 4 - data)
//   Step 4: Derive the schema document       (Layer 4 - data)

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::data::{
    loader::{load_features_config, load_metadata},
    preprocessor::Normalizer,
    schema_gen::generate_schema,
};
use crate::domain::{
    metadata::{DatasetMetadata, FeatureConfig},
    schema::SchemaDocument,
    table::Table,
    traits::RawDatasetSource,
};
use crate::infra::config::PathsConfig;

/// Both configuration tables, loaded once per run.
pub struct Catalog {
    pub datasets: Vec<DatasetMetadata>,
    pub features: Vec<FeatureConfig>,
}

impl Catalog {
    pub fn load(paths: &PathsConfig) -> Result<Self> {
        let datasets = load_metadata(&paths.dataset_cfg_path)?;
        let features = load_features_config(&paths.features_cfg_path)?;
        Ok(Self { datasets, features })
    }

    /// Datasets marked for use, in metadata order.
    pub fn in_use(&self) -> impl Iterator<Item = &DatasetMetadata> {
        self.datasets.iter().filter(|d| d.in_use)
    }
}

/// A normalized dataset together with its schema.
pub struct PreparedDataset {
    pub table:  Table,
    pub schema: SchemaDocument,
}

/// Load, normalize and describe one dataset.
pub fn prepare_dataset(
    meta:       &DatasetMetadata,
    features:   &[FeatureConfig],
    source:     &dyn RawDatasetSource,
    normalizer: &Normalizer,
) -> Result<PreparedDataset> {
    let raw = source
        .load_raw(&meta.name)
        .with_context(|| format!("Cannot load raw data for dataset '{}'", meta.name))?;

    let table = normalizer.normalize(raw, &meta.id_name);

    let schema = generate_schema(meta, features, &table)
        .with_context(|| format!("Cannot generate schema for dataset '{}'", meta.name))?;

    Ok(PreparedDataset { table, schema })
}

/// What a run wrote.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    /// Datasets fully processed
    pub datasets:    usize,
    /// One entry per fold or split directory written
    pub output_dirs: Vec<PathBuf>,
}
