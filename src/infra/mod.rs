// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns the pipeline layers lean on:
//
//   config.rs — PipelineConfig: paths, fold count, seeds, the
//               missing-value token. Optionally read from JSON.
//
//   writer.rs — Writes train / test / test-key CSV files and the
//               schema JSON into one output directory per fold.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Pipeline configuration and output path layout
pub mod config;

/// CSV and JSON output
pub mod writer;
