// ============================================================
// Layer 2 — FoldsUseCase
// ============================================================
// Orchestrates the k-fold pipeline for every dataset in use:
//
//   Step 1: Load catalog, drop unused datasets   (prepare.rs)
//   Step 2: Normalize the raw table               (Layer 4 - data)
//   Step 3: Derive the schema                     (Layer 4 - data)
//   Step 4: Build k stratified folds              (Layer 4 - data)
//   Step 5: Per fold, write schema + 3 CSV files  (Layer 6 - infra)
//
// Datasets are processed one after another. The first error stops
// the whole run; files already written stay on disk.

use anyhow::{Context, Result};

use crate::application::prepare::{prepare_dataset, Catalog, RunSummary};
use crate::data::{loader::CsvDatasetLoader, preprocessor::Normalizer, splitter::stratified_kfolds};
use crate::domain::traits::RawDatasetSource;
use crate::infra::{
    config::{fold_stem, PipelineConfig},
    writer::DatasetWriter,
};

pub struct FoldsUseCase {
    config: PipelineConfig,
    source: Box<dyn RawDatasetSource>,
}

impl FoldsUseCase {
    /// Read raw datasets from `config.paths.raw_root`.
    pub fn new(config: PipelineConfig) -> Self {
        let source = Box::new(CsvDatasetLoader::new(&config.paths.raw_root));
        Self::with_source(config, source)
    }

    pub fn with_source(config: PipelineConfig, source: Box<dyn RawDatasetSource>) -> Self {
        Self { config, source }
    }

    /// Execute the k-fold pipeline end to end
    pub fn execute(&self) -> Result<RunSummary> {
        let cfg        = &self.config;
        let catalog    = Catalog::load(&cfg.paths)?;
        let normalizer = Normalizer::new(cfg.nan_token.as_str());
        let options    = cfg.kfold_options();

        let mut summary = RunSummary::default();

        for meta in catalog.in_use() {
            tracing::info!("Processing dataset: {}", meta.name);

            let prepared = prepare_dataset(meta, &catalog.features, self.source.as_ref(), &normalizer)?;

            let folds = stratified_kfolds(&prepared.table, &meta.target_name, &options)
                .with_context(|| {
                    format!("Cannot build {} folds for dataset '{}'", options.num_folds, meta.name)
                })?;

            for (k, fold) in folds.iter().enumerate() {
                let stem   = fold_stem(&meta.name, k);
                let writer = DatasetWriter::create(cfg.paths.fold_dir(&meta.name, k))?;

                writer.write_schema(&stem, &prepared.schema)?;
                writer
                    .write_partition(&stem, fold, &meta.id_name, &meta.target_name)
                    .with_context(|| format!("Cannot write fold {k} of dataset '{}'", meta.name))?;

                tracing::info!(
                    "Wrote fold {} of '{}': {} train / {} test rows",
                    k,
                    meta.name,
                    fold.train.n_rows(),
                    fold.test.n_rows()
                );
                summary.output_dirs.push(writer.dir().to_path_buf());
            }
            summary.datasets += 1;
        }

        Ok(summary)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{write_catalog, MemorySource};
    use crate::data::loader::read_table;
    use crate::domain::{schema::SchemaDocument, table::table_of};
    use crate::infra::config::PathsConfig;
    use std::{fs, path::Path};

    /// 25 rows, classes "a" x15 and "b" x10, a constant column and a "?".
    fn demo_raw() -> crate::domain::table::Table {
        let rows: Vec<Vec<String>> = (0..25)
            .map(|i| {
                let class  = if i % 5 < 3 { "a" } else { "b" };
                let colour = if i == 4 { "?".to_string() } else { ["red", "blue"][i % 2].to_string() };
                vec![format!("{}.5", i), colour, "const".to_string(), class.to_string()]
            })
            .collect();
        let rows: Vec<Vec<&str>> = rows.iter().map(|r| r.iter().map(String::as_str).collect()).collect();
        let rows: Vec<&[&str]> = rows.iter().map(Vec::as_slice).collect();
        table_of(&["0", "colour", "flag", "class"], &rows)
    }

    fn config_in(root: &Path) -> PipelineConfig {
        PipelineConfig {
            paths: PathsConfig {
                dataset_cfg_path:  root.join("datasets.csv"),
                features_cfg_path: root.join("fields.csv"),
                raw_root:          root.join("raw"),
                processed_root:    root.join("processed"),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_writes_every_fold_for_used_datasets_only() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        write_catalog(&cfg.paths);

        let source  = MemorySource::new(&[("demo", demo_raw())]);
        let summary = FoldsUseCase::with_source(cfg.clone(), Box::new(source)).execute().unwrap();

        assert_eq!(summary.datasets, 1);
        assert_eq!(summary.output_dirs.len(), 5);

        let mut total_test_rows = 0;
        for k in 0..5 {
            let fold_dir = cfg.paths.processed_root.join(format!("demo_fold_{k}"));
            for suffix in ["train.csv", "test.csv", "test_key.csv", "schema.json"] {
                assert!(fold_dir.join(format!("demo_fold_{k}_{suffix}")).exists());
            }
            let train = read_table(&fold_dir.join(format!("demo_fold_{k}_train.csv"))).unwrap();
            assert_eq!(train.columns(), &["id", "f0", "colour", "class"]);
            let key = read_table(&fold_dir.join(format!("demo_fold_{k}_test_key.csv"))).unwrap();
            total_test_rows += key.n_rows();
        }
        assert_eq!(total_test_rows, 25);

        // the unused dataset was never touched
        assert!(!cfg.paths.processed_root.join("skipped_fold_0").exists());
    }

    #[test]
    fn test_schema_written_per_fold() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        write_catalog(&cfg.paths);

        FoldsUseCase::with_source(cfg.clone(), Box::new(MemorySource::new(&[("demo", demo_raw())])))
            .execute()
            .unwrap();

        let path   = cfg.paths.processed_root.join("demo_fold_2/demo_fold_2_schema.json");
        let schema: SchemaDocument =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(schema.target.classes, vec!["a", "b"]);
        let colour = schema.features.iter().find(|f| f.name == "colour").unwrap();
        assert_eq!(colour.categories, Some(vec![serde_json::json!("blue"), serde_json::json!("red")]));
        assert!(colour.nullable);
    }

    #[test]
    fn test_missing_class_aborts_run_naming_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        write_catalog(&cfg.paths);

        // "rare" has 2 rows, too few for 5 test folds
        let mut labels = vec!["a"; 10];
        labels.extend(vec!["b"; 10]);
        labels.extend(["rare", "rare"]);
        let rows: Vec<Vec<String>> = labels
            .iter()
            .enumerate()
            .map(|(i, l)| vec![i.to_string(), ["red", "blue"][i % 2].to_string(), l.to_string()])
            .collect();
        let rows: Vec<Vec<&str>> = rows.iter().map(|r| r.iter().map(String::as_str).collect()).collect();
        let rows: Vec<&[&str]> = rows.iter().map(Vec::as_slice).collect();
        let raw = table_of(&["0", "colour", "class"], &rows);

        let err = FoldsUseCase::with_source(cfg.clone(), Box::new(MemorySource::new(&[("demo", raw)])))
            .execute()
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("'demo'"));
        assert!(message.contains("rare"));

        // folds are all validated before the first one is written
        for k in 0..5 {
            assert!(!cfg.paths.fold_dir("demo", k).exists());
        }
        assert!(!cfg.paths.processed_root.exists());
    }
}
