// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe the data flowing through the
// preparation pipeline. Nothing in here touches the filesystem
// or parses CSV; that lives in `data` and `infra`.
//
//   table.rs    — the in-memory table every stage transforms
//   metadata.rs — typed dataset metadata and feature config rows
//   schema.rs   — the JSON schema document written per dataset
//   fold.rs     — one (train, test) pair
//   error.rs    — typed failures raised by the pipeline stages
//   traits.rs   — the seam used to fetch raw datasets
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// Row-oriented table of optional string cells
pub mod table;

/// Dataset metadata and feature configuration records
pub mod metadata;

/// Schema document emitted as `<name>_schema.json`
pub mod schema;

/// A single train/test partition
pub mod fold;

/// Pipeline error taxonomy
pub mod error;

/// Core abstractions other layers implement
pub mod traits;
