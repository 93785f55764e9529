// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a raw CSV file on disk and the folds that
// get written back out.
//
// The pipeline flows in this order:
//
//   <name>_raw.csv
//       │
//       ▼
//   CsvDatasetLoader  → reads the file into a Table
//       │
//       ▼
//   Normalizer        → trims, renames, adds ids, decodes, drops, nulls
//       │
//       ├──────────────► schema_gen → SchemaDocument
//       ▼
//   splitter          → k stratified (train, test) folds
//
// Each module is responsible for exactly one step.

/// Reads raw datasets and the two configuration tables
pub mod loader;

/// Cleans one raw table
pub mod preprocessor;

/// Stratified k-fold and single train/test splitting
pub mod splitter;

/// Derives the schema document for a dataset
pub mod schema_gen;
