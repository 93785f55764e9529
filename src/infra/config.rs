// ============================================================
// Layer 6 — Pipeline Configuration
// ============================================================
// One explicit configuration object handed to every use case.
// It can be read from a JSON file; CLI flags override it.
//
// Example config.json (every key optional):
//   {
//     "paths": {
//       "dataset_cfg_path":  "config/datasets.csv",
//       "features_cfg_path": "config/datasets_fields.csv",
//       "raw_root":          "datasets/raw",
//       "processed_root":    "datasets/processed"
//     },
//     "num_folds": 5,
//     "seed": 123
//   }
//
// Output layout:
//   <processed_root>/<name>_fold_<k>/<name>_fold_<k>_{train,test,test_key}.csv
//   <processed_root>/<name>_fold_<k>/<name>_fold_<k>_schema.json
//   <processed_root>/<name>/<name>_{train,test,test_key}.csv   (single split)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::data::preprocessor::DEFAULT_NAN_TOKEN;
use crate::data::splitter::{
    KFoldOptions, SplitOptions, DEFAULT_KFOLD_SEED, DEFAULT_NUM_FOLDS, DEFAULT_SPLIT_SEED,
    DEFAULT_TEST_SIZE,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Dataset metadata table
    pub dataset_cfg_path:  PathBuf,
    /// Feature configuration table
    pub features_cfg_path: PathBuf,
    /// Holds `<name>/<name>_raw.csv` per dataset
    pub raw_root:          PathBuf,
    /// Receives one directory per fold or split
    pub processed_root:    PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            dataset_cfg_path:  PathBuf::from("config/datasets.csv"),
            features_cfg_path: PathBuf::from("config/datasets_fields.csv"),
            raw_root:          PathBuf::from("datasets/raw"),
            processed_root:    PathBuf::from("datasets/processed"),
        }
    }
}

impl PathsConfig {
    /// `<processed_root>/<name>_fold_<k>`
    pub fn fold_dir(&self, dataset_name: &str, fold: usize) -> PathBuf {
        self.processed_root.join(fold_stem(dataset_name, fold))
    }

    /// `<processed_root>/<name>`
    pub fn split_dir(&self, dataset_name: &str) -> PathBuf {
        self.processed_root.join(dataset_name)
    }
}

/// File and directory stem for fold `fold` of a dataset.
pub fn fold_stem(dataset_name: &str, fold: usize) -> String {
    format!("{dataset_name}_fold_{fold}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths:      PathsConfig,
    pub num_folds:  usize,
    pub shuffle:    bool,
    /// Seed for k-fold assignment
    pub seed:       u64,
    /// Seed for the single train/test split
    pub split_seed: u64,
    pub test_size:  f64,
    /// Raw cell value that stands for a missing value
    pub nan_token:  String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            paths:      PathsConfig::default(),
            num_folds:  DEFAULT_NUM_FOLDS,
            shuffle:    true,
            seed:       DEFAULT_KFOLD_SEED,
            split_seed: DEFAULT_SPLIT_SEED,
            test_size:  DEFAULT_TEST_SIZE,
            nan_token:  DEFAULT_NAN_TOKEN.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Read a config from JSON. Keys left out keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        let cfg = serde_json::from_str(&json)
            .with_context(|| format!("Invalid config in '{}'", path.display()))?;
        tracing::debug!("Loaded pipeline config from '{}'", path.display());
        Ok(cfg)
    }

    pub fn kfold_options(&self) -> KFoldOptions {
        KFoldOptions { num_folds: self.num_folds, shuffle: self.shuffle, seed: self.seed }
    }

    pub fn split_options(&self) -> SplitOptions {
        SplitOptions { test_size: self.test_size, seed: self.split_seed }
    }
}
