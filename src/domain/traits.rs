// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The use cases never open raw CSV files themselves. They ask a
// RawDatasetSource for a dataset by name, so tests can hand them
// an in-memory table instead of a directory tree.

use anyhow::Result;
use crate::domain::table::Table;

// ─── RawDatasetSource ─────────────────────────────────────────────────────────
/// Anything that can produce the raw, un-normalized table for a dataset.
///
/// Implementations:
///   - CsvDatasetLoader → reads `<raw_root>/<name>/<name>_raw.csv`
pub trait RawDatasetSource {
    /// Load the raw table for `dataset_name`.
    fn load_raw(&self, dataset_name: &str) -> Result<Table>;
}
