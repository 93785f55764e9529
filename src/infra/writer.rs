// ============================================================
// Layer 6 — Dataset Writer
// ============================================================
// Writes one partition directory:
//
//   <stem>_train.csv     every column of the train partition
//   <stem>_test.csv      the test partition without the target
//   <stem>_test_key.csv  id + target of the test partition
//   <stem>_schema.json   the schema document, pretty-printed
//
// Every file is created fresh (truncate, never append). Missing
// cells are written as empty fields.
//
// Why split the test partition into two files?
//   test.csv is what a model sees at scoring time: the features and
//   the id, but no answer. test_key.csv holds the withheld answers.
//   A scorer joins predictions to the key on the id column.

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::{fold::Fold, schema::SchemaDocument, table::Table};

/// Writes partition files into a single directory.
pub struct DatasetWriter {
    dir: PathBuf,
}

impl DatasetWriter {
    /// Create the writer, creating `dir` (and parents) if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the train, test and test-key files for `fold`.
    pub fn write_partition(
        &self,
        stem:        &str,
        fold:        &Fold,
        id_name:     &str,
        target_name: &str,
    ) -> Result<()> {
        let test_inputs = fold.test.drop_column(target_name)?;
        let test_key    = fold.test.select_columns(&[id_name, target_name])?;

        write_table(&self.dir.join(format!("{stem}_train.csv")), &fold.train)?;
        write_table(&self.dir.join(format!("{stem}_test.csv")), &test_inputs)?;
        write_table(&self.dir.join(format!("{stem}_test_key.csv")), &test_key)?;
        Ok(())
    }

    /// Write `schema` as `<stem>_schema.json`.
    pub fn write_schema(&self, stem: &str, schema: &SchemaDocument) -> Result<PathBuf> {
        let path = self.dir.join(format!("{stem}_schema.json"));
        let json = serde_json::to_string_pretty(schema)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write schema to '{}'", path.display()))?;
        tracing::debug!("Saved schema to '{}'", path.display());
        Ok(path)
    }
}

/// Write `table` as CSV with a header row, replacing any existing file.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let mut w = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;

    w.write_record(table.columns())?;
    for row in table.rows() {
        w.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
    }
    w.flush()
        .with_context(|| format!("Cannot flush '{}'", path.display()))?;

    tracing::debug!("Wrote {} rows to '{}'", table.n_rows(), path.display());
    Ok(())
}
