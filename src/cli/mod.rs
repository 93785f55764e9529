// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses command line arguments with `clap` and hands the
// resulting PipelineConfig to a use case in Layer 2.
//
// Two commands are supported:
//   1. `folds` — k stratified folds per dataset (the default run)
//   2. `split` — one stratified train/test split per dataset

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, FoldsArgs, SplitArgs};

use crate::application::prepare::RunSummary;
use crate::infra::config::PipelineConfig;

#[derive(Parser, Debug)]
#[command(
    name = "bench-prep",
    version,
    about = "Clean raw CSV datasets, derive their schema and write stratified train/test folds."
)]
pub struct Cli {
    /// The subcommand to run (folds or split)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Folds(args) => run_folds(args),
            Commands::Split(args) => run_split(args),
        }
    }
}

fn run_folds(args: FoldsArgs) -> Result<()> {
    use crate::application::folds_use_case::FoldsUseCase;

    let config = PipelineConfig::try_from(args)?;
    tracing::info!(
        "Building {} folds from '{}' into '{}'",
        config.num_folds,
        config.paths.raw_root.display(),
        config.paths.processed_root.display()
    );

    let summary = FoldsUseCase::new(config).execute()?;
    report(&summary, "fold");
    Ok(())
}

fn run_split(args: SplitArgs) -> Result<()> {
    use crate::application::split_use_case::SplitUseCase;

    let config = PipelineConfig::try_from(args)?;
    let summary = SplitUseCase::new(config).execute()?;
    report(&summary, "split");
    Ok(())
}

fn report(summary: &RunSummary, unit: &str) {
    tracing::info!("Run finished: {:?}", summary);
    println!(
        "Processed {} datasets, wrote {} {} directories.",
        summary.datasets,
        summary.output_dirs.len(),
        unit
    );
}
