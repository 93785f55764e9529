// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for one whole run:
//
//   folds  — normalize, describe, k-fold split and write every dataset
//   split  — same, with a single stratified train/test split
//
// No CSV parsing, splitting math or printing lives here, only
// the order in which the other layers are called.

/// Loading, normalizing and describing a dataset
pub mod prepare;

/// The k-fold workflow
pub mod folds_use_case;

/// The single train/test split workflow
pub mod split_use_case;

#[cfg(test)]
pub mod test_support;
