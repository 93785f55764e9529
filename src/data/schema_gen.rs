// ============================================================
// Layer 4 — Schema Generator
// ============================================================
// Builds the SchemaDocument for one dataset from three inputs:
//
//   DatasetMetadata   → title, description, id and target sections
//   FeatureConfig[]   → which fields are features, their types
//   normalized Table  → categories, examples, nullability
//
// Only config rows for this dataset with the "feature" role make
// it into the feature list. Categorical features list their sorted
// distinct values; all others show the first non-missing value.
//
// How are values typed in the JSON?
//   The whole column decides, not each cell on its own:
//   - every present cell parses as an integer → JSON integers
//   - every present cell parses as a finite number → JSON floats
//   - anything else → JSON strings
//   So a column holding "1", "1.0" and "2" is a float column, and
//   "1" and "1.0" collapse into the single category 1.0.

use serde_json::{Number, Value};

use crate::domain::{
    error::PrepError,
    metadata::{DatasetMetadata, FeatureConfig, FieldRole},
    schema::{FeatureSpec, IdSpec, SchemaDocument, TargetSpec, INPUT_DATA_FORMAT, SCHEMA_VERSION},
    table::Table,
};

/// Derive the schema document for the dataset described by `meta`.
pub fn generate_schema(
    meta:     &DatasetMetadata,
    features: &[FeatureConfig],
    data:     &Table,
) -> Result<SchemaDocument, PrepError> {
    let features = features
        .iter()
        .filter(|f| f.dataset_name == meta.name && f.field_role == FieldRole::Feature)
        .map(|f| feature_spec(f, data))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!("Schema for '{}' lists {} features", meta.name, features.len());

    Ok(SchemaDocument {
        title:             meta.title.clone(),
        description:       meta.description.clone(),
        model_category:    meta.model_category.clone(),
        schema_version:    SCHEMA_VERSION,
        input_data_format: INPUT_DATA_FORMAT.to_string(),
        encoding:          meta.encoding.clone(),
        id: IdSpec {
            name:        meta.id_name.clone(),
            description: meta.id_description.clone(),
        },
        target: TargetSpec {
            name:        meta.target_name.clone(),
            description: meta.target_description.clone(),
            classes:     meta.target_classes.clone(),
        },
        features,
    })
}

fn feature_spec(cfg: &FeatureConfig, data: &Table) -> Result<FeatureSpec, PrepError> {
    let cells    = data.column_by_name(&cfg.field_name)?;
    let present: Vec<&str> = cells.iter().flatten().copied().collect();
    let nullable = present.len() < cells.len();
    let kind     = ValueKind::of_column(&present);

    let (categories, example) = if cfg.is_categorical() {
        // convert first so that distinct means distinct as a value
        let mut categories: Vec<Value> = present.iter().map(|v| kind.json_value(v)).collect();
        categories.sort_by_cached_key(sort_key);
        categories.dedup();
        (Some(categories), None)
    } else {
        let first = present.first().ok_or_else(|| PrepError::NoExampleValue {
            feature: cfg.field_name.clone(),
        })?;
        (None, Some(kind.json_value(first)))
    };

    Ok(FeatureSpec {
        name:        cfg.field_name.clone(),
        description: cfg.field_description.clone(),
        data_type:   cfg.data_type.trim().to_uppercase(),
        categories,
        example,
        nullable,
    })
}

/// True for text that parses as a finite number.
pub fn is_number(value: &str) -> bool {
    value.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}

/// The JSON type every value of one column is written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Integer,
    Float,
    Text,
}

impl ValueKind {
    fn of_column(present: &[&str]) -> Self {
        if present.is_empty() {
            ValueKind::Text
        } else if present.iter().all(|v| v.parse::<i64>().is_ok()) {
            ValueKind::Integer
        } else if present.iter().all(|v| is_number(v)) {
            ValueKind::Float
        } else {
            ValueKind::Text
        }
    }

    fn json_value(self, value: &str) -> Value {
        let number = match self {
            ValueKind::Integer => value.parse::<i64>().ok().map(Number::from),
            ValueKind::Float   => value.parse::<f64>().ok().and_then(Number::from_f64),
            ValueKind::Text    => None,
        };
        match number {
            Some(n) => Value::Number(n),
            None    => Value::String(value.to_string()),
        }
    }
}

/// Categories are ordered by their string form: `1.0` before `10.0` before `9.0`.
fn sort_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other            => other.to_string(),
    }
}
