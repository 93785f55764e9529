// ============================================================
// Layer 3 — Pipeline Errors
// ============================================================
// Failures a pipeline stage can raise on its own. The application
// layer wraps these in anyhow with the dataset name attached, so
// the variants only carry what the stage itself knows.
//
// Malformed byte-string literals are NOT in this list: the
// normalizer recovers from them by keeping the original cell.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepError {
    /// A test partition lacks at least one class of the full dataset
    #[error("test fold {fold} is missing samples from classes: {}", .missing.join(", "))]
    MissingClasses { fold: usize, missing: Vec<String> },

    /// A non-categorical feature has no value to show as an example
    #[error("feature '{feature}' has no non-missing value to use as an example")]
    NoExampleValue { feature: String },

    #[error("column '{0}' not found in dataset")]
    MissingColumn(String),

    /// Stratification needs a label on every row
    #[error("target column '{column}' is missing a value at row {row}")]
    MissingLabel { column: String, row: usize },

    #[error("invalid split: {0}")]
    InvalidSplit(String),

    #[error("dataset '{dataset}' is marked for use but '{field}' is empty")]
    IncompleteMetadata { dataset: String, field: &'static str },

    #[error("row {row} has {found} cells but the header has {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
}
