// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `folds` and `split`, and their flags.
//
// Every flag is optional. A run starts from the defaults (or from
// the file given with --config) and each flag that is present
// overrides the matching config value.
//
// Reference: Rust Book §12 (Building a CLI Program)

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::infra::config::PipelineConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write stratified k-fold train/test/test-key files for every dataset in use
    Folds(FoldsArgs),

    /// Write a single stratified train/test/test-key split for every dataset in use
    Split(SplitArgs),
}

/// Flags shared by both subcommands.
#[derive(Args, Debug, Default)]
pub struct CommonArgs {
    /// JSON config file; the flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Dataset metadata CSV
    #[arg(long)]
    pub dataset_cfg: Option<PathBuf>,

    /// Feature configuration CSV
    #[arg(long)]
    pub features_cfg: Option<PathBuf>,

    /// Directory holding <name>/<name>_raw.csv
    #[arg(long)]
    pub raw_root: Option<PathBuf>,

    /// Directory receiving the processed datasets
    #[arg(long)]
    pub processed_root: Option<PathBuf>,

    /// Raw cell value treated as missing
    #[arg(long)]
    pub nan_token: Option<String>,

    /// Random seed for the split
    #[arg(long)]
    pub seed: Option<u64>,
}

impl CommonArgs {
    /// Start from the config file (or defaults) and apply path overrides.
    fn base_config(&self) -> Result<PipelineConfig> {
        let mut cfg = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None       => PipelineConfig::default(),
        };
        if let Some(p) = &self.dataset_cfg {
            cfg.paths.dataset_cfg_path = p.clone();
        }
        if let Some(p) = &self.features_cfg {
            cfg.paths.features_cfg_path = p.clone();
        }
        if let Some(p) = &self.raw_root {
            cfg.paths.raw_root = p.clone();
        }
        if let Some(p) = &self.processed_root {
            cfg.paths.processed_root = p.clone();
        }
        if let Some(token) = &self.nan_token {
            cfg.nan_token = token.clone();
        }
        Ok(cfg)
    }
}

/// All arguments for the `folds` command
#[derive(Args, Debug)]
pub struct FoldsArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Number of cross-validation folds
    #[arg(long)]
    pub num_folds: Option<usize>,

    /// Assign folds without shuffling
    #[arg(long)]
    pub no_shuffle: bool,
}

/// Convert CLI FoldsArgs into the pipeline config.
/// Fallible because --config names a file that has to be read.
impl TryFrom<FoldsArgs> for PipelineConfig {
    type Error = anyhow::Error;

    fn try_from(a: FoldsArgs) -> Result<Self> {
        let mut cfg = a.common.base_config()?;
        if let Some(k) = a.num_folds {
            cfg.num_folds = k;
        }
        if let Some(seed) = a.common.seed {
            cfg.seed = seed;
        }
        if a.no_shuffle {
            cfg.shuffle = false;
        }
        Ok(cfg)
    }
}

/// All arguments for the `split` command
#[derive(Args, Debug)]
pub struct SplitArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Proportion of rows placed in the test partition
    #[arg(long)]
    pub test_size: Option<f64>,
}

impl TryFrom<SplitArgs> for PipelineConfig {
    type Error = anyhow::Error;

    fn try_from(a: SplitArgs) -> Result<Self> {
        let mut cfg = a.common.base_config()?;
        if let Some(size) = a.test_size {
            cfg.test_size = size;
        }
        if let Some(seed) = a.common.seed {
            cfg.split_seed = seed;
        }
        Ok(cfg)
    }
}
