// ============================================================
// Layer 2 — SplitUseCase
// ============================================================
// The single-split variant of the pipeline. Each dataset in use
// gets one stratified train/test split written to
// `<processed_root>/<name>/` alongside its schema.

use anyhow::{Context, Result};

use crate::application::prepare::{prepare_dataset, Catalog, RunSummary};
use crate::data::{loader::CsvDatasetLoader, preprocessor::Normalizer, splitter::stratified_split};
use crate::domain::traits::RawDatasetSource;
use crate::infra::{config::PipelineConfig, writer::DatasetWriter};

pub struct SplitUseCase {
    config: PipelineConfig,
    source: Box<dyn RawDatasetSource>,
}

impl SplitUseCase {
    pub fn new(config: PipelineConfig) -> Self {
        let source = Box::new(CsvDatasetLoader::new(&config.paths.raw_root));
        Self::with_source(config, source)
    }

    pub fn with_source(config: PipelineConfig, source: Box<dyn RawDatasetSource>) -> Self {
        Self { config, source }
    }

    pub fn execute(&self) -> Result<RunSummary> {
        let cfg        = &self.config;
        let catalog    = Catalog::load(&cfg.paths)?;
        let normalizer = Normalizer::new(cfg.nan_token.as_str());
        let options    = cfg.split_options();

        let mut summary = RunSummary::default();

        for meta in catalog.in_use() {
            tracing::info!("Creating train/test files for dataset: {}", meta.name);

            let prepared = prepare_dataset(meta, &catalog.features, self.source.as_ref(), &normalizer)?;

            let split = stratified_split(&prepared.table, &meta.target_name, &options)
                .with_context(|| format!("Cannot split dataset '{}'", meta.name))?;

            let writer = DatasetWriter::create(cfg.paths.split_dir(&meta.name))?;
            writer.write_schema(&meta.name, &prepared.schema)?;
            writer
                .write_partition(&meta.name, &split, &meta.id_name, &meta.target_name)
                .with_context(|| format!("Cannot write split of dataset '{}'", meta.name))?;

            tracing::info!(
                "Wrote '{}': {} train / {} test rows",
                meta.name,
                split.train.n_rows(),
                split.test.n_rows()
            );
            summary.output_dirs.push(writer.dir().to_path_buf());
            summary.datasets += 1;
        }

        Ok(summary)
    }
}
