// ============================================================
// Layer 4 — CSV Loader
// ============================================================
// Reads three kinds of CSV file:
//
//   1. Raw datasets       <raw_root>/<name>/<name>_raw.csv → Table
//   2. Dataset metadata   one row per dataset              → DatasetMetadata
//   3. Feature config     one row per (dataset, field)     → FeatureConfig
//
// Raw cells are read the way dataframe readers do it: empty cells
// and the usual NA spellings ("NA", "NaN", "null", ...) become
// missing, blank header labels become "Unnamed: <i>", repeated
// labels get ".1", ".2" suffixes and short rows are padded with
// missing cells. A row longer than the header is an error.
//
// The configuration tables are deserialised with serde into
// private record structs, then validated and converted into the
// typed domain structs at load time.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::{
    collections::HashSet,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use crate::domain::{
    metadata::{DatasetMetadata, FeatureConfig, FieldRole},
    table::{Cell, Table},
    traits::RawDatasetSource,
};

/// Cell spellings read as a missing value.
pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan",
    "1.#IND", "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a",
    "nan", "null",
];

/// Separator between class labels in the metadata's `target_classes`.
pub const CLASS_DELIMITER: char = '|';

// ─── Raw datasets ─────────────────────────────────────────────────────────────

/// Loads raw dataset files laid out as `<raw_root>/<name>/<name>_raw.csv`.
pub struct CsvDatasetLoader {
    raw_root: PathBuf,
}

impl CsvDatasetLoader {
    pub fn new(raw_root: impl Into<PathBuf>) -> Self {
        Self { raw_root: raw_root.into() }
    }

    /// Where the raw file for `dataset_name` is expected to live.
    pub fn raw_path(&self, dataset_name: &str) -> PathBuf {
        self.raw_root
            .join(dataset_name)
            .join(format!("{dataset_name}_raw.csv"))
    }
}

impl RawDatasetSource for CsvDatasetLoader {
    fn load_raw(&self, dataset_name: &str) -> Result<Table> {
        let path  = self.raw_path(dataset_name);
        let table = read_table(&path)?;
        tracing::debug!(
            "Loaded '{}' ({} rows x {} columns)",
            path.display(),
            table.n_rows(),
            table.n_cols()
        );
        Ok(table)
    }
}

/// Read a CSV file with a header row into a Table.
pub fn read_table(path: &Path) -> Result<Table> {
    let file = File::open(path)
        .with_context(|| format!("Cannot open '{}'", path.display()))?;
    read_table_from(file)
        .with_context(|| format!("Cannot parse '{}'", path.display()))
}

/// Read CSV text from any reader into a Table.
pub fn read_table_from<R: Read>(reader: R) -> Result<Table> {
    // flexible(true): short rows are padded below, long rows surface
    // as our RaggedRow error instead of the csv crate's own
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let raw_headers: Vec<String> = rdr
        .byte_headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let label = String::from_utf8_lossy(h).into_owned();
            if i == 0 {
                label.trim_start_matches('\u{feff}').to_string()
            } else {
                label
            }
        })
        .collect();
    let columns = unique_labels(raw_headers);

    let mut rows = Vec::new();
    for (line, record) in rdr.byte_records().enumerate() {
        let record = record?;
        let mut cells: Vec<Cell> = record.iter().map(parse_cell).collect();
        if cells.len() < columns.len() {
            // a row cut short is missing its trailing values
            tracing::debug!("Row {} has {} of {} cells, padding", line, cells.len(), columns.len());
            cells.resize(columns.len(), None);
        }
        rows.push(cells);
    }

    Ok(Table::new(columns, rows)?)
}

fn parse_cell(raw: &[u8]) -> Cell {
    let value = String::from_utf8_lossy(raw);
    if NA_TOKENS.contains(&&*value) {
        None
    } else {
        Some(value.into_owned())
    }
}

/// Give blank labels a placeholder name and de-duplicate repeats.
fn unique_labels(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut out = Vec::with_capacity(raw.len());

    for (i, label) in raw.into_iter().enumerate() {
        let base = if label.is_empty() { format!("Unnamed: {i}") } else { label };
        let mut candidate = base.clone();
        let mut n = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{n}");
            n += 1;
        }
        if candidate != base {
            tracing::warn!("Duplicate column label '{}' renamed to '{}'", base, candidate);
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

// ─── Dataset metadata ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct MetadataRecord {
    name:               String,
    use_dataset:        String,
    #[serde(default)]
    id_name:            String,
    #[serde(default)]
    id_description:     String,
    #[serde(default)]
    target_name:        String,
    #[serde(default)]
    target_description: String,
    #[serde(default)]
    target_classes:     String,
    #[serde(default)]
    title:              String,
    #[serde(default)]
    description:        String,
    #[serde(default)]
    model_category:     String,
    #[serde(default)]
    encoding:           String,
}

/// Load and validate the dataset metadata table.
pub fn load_metadata(path: &Path) -> Result<Vec<DatasetMetadata>> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .with_context(|| format!("Cannot open dataset metadata '{}'", path.display()))?;

    let mut datasets = Vec::new();
    for (line, record) in rdr.deserialize::<MetadataRecord>().enumerate() {
        let r = record.with_context(|| {
            format!("Bad metadata row {} in '{}'", line + 1, path.display())
        })?;
        let meta = DatasetMetadata {
            in_use:             parse_use_flag(&r.use_dataset)
                .with_context(|| format!("Dataset '{}' has a bad use_dataset flag", r.name))?,
            target_classes:     r.target_classes.split(CLASS_DELIMITER).map(str::to_string).collect(),
            name:               r.name,
            id_name:            r.id_name,
            id_description:     r.id_description,
            target_name:        r.target_name,
            target_description: r.target_description,
            title:              r.title,
            description:        r.description,
            model_category:     r.model_category,
            encoding:           r.encoding,
        };
        meta.validate()?;
        datasets.push(meta);
    }

    tracing::info!("Loaded metadata for {} datasets", datasets.len());
    Ok(datasets)
}

/// Accepts the usual spellings of a boolean flag, including `1.0`.
fn parse_use_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" | "y" => Ok(true),
        "0" | "0.0" | "false" | "no" | "n" | "" => Ok(false),
        other => anyhow::bail!("expected 0/1, got '{other}'"),
    }
}

// ─── Feature configuration ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct FeatureRecord {
    name:              String,
    field_name:        String,
    #[serde(default)]
    field_description: String,
    #[serde(default)]
    field_type:        String,
    #[serde(default)]
    data_type:         String,
}

/// Load the feature configuration table, stripping stray quotes
/// from every value.
pub fn load_features_config(path: &Path) -> Result<Vec<FeatureConfig>> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .with_context(|| format!("Cannot open feature config '{}'", path.display()))?;

    let mut features = Vec::new();
    for (line, record) in rdr.deserialize::<FeatureRecord>().enumerate() {
        let r = record.with_context(|| {
            format!("Bad feature config row {} in '{}'", line + 1, path.display())
        })?;
        features.push(FeatureConfig {
            dataset_name:      strip_quotes(&r.name),
            field_name:        strip_quotes(&r.field_name),
            field_description: strip_quotes(&r.field_description),
            field_role:        FieldRole::parse(&strip_quotes(&r.field_type)),
            data_type:         strip_quotes(&r.data_type),
        });
    }

    tracing::info!("Loaded {} feature config rows", features.len());
    Ok(features)
}

/// Remove surrounding whitespace and quote characters.
pub fn strip_quotes(value: &str) -> String {
    value
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}
