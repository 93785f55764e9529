// ============================================================
// Layer 3 — Dataset Metadata and Feature Configuration
// ============================================================
// Two configuration tables drive the pipeline:
//
//   datasets.csv         one row per dataset (names, target classes,
//                        titles, a use flag)
//   datasets_fields.csv  one row per (dataset, field) with a
//                        description, a role and a declared type
//
// The loader turns their loosely typed CSV rows into the structs
// below, so the rest of the pipeline reads named fields instead of
// looking cells up by column name.

use serde::{Deserialize, Serialize};

use crate::domain::error::PrepError;

/// Metadata describing one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub name:               String,
    pub in_use:             bool,
    pub id_name:            String,
    pub id_description:     String,
    pub target_name:        String,
    pub target_description: String,
    /// Class labels in declaration order, already split on `|`
    pub target_classes:     Vec<String>,
    pub title:              String,
    pub description:        String,
    pub model_category:     String,
    pub encoding:           String,
}

impl DatasetMetadata {
    /// A dataset marked for use must name its id and target columns
    /// and declare its target classes.
    pub fn validate(&self) -> Result<(), PrepError> {
        if !self.in_use {
            return Ok(());
        }
        let missing = if self.id_name.trim().is_empty() {
            Some("id_name")
        } else if self.target_name.trim().is_empty() {
            Some("target_name")
        } else if self.target_classes.iter().all(|c| c.trim().is_empty()) {
            Some("target_classes")
        } else {
            None
        };
        match missing {
            Some(field) => Err(PrepError::IncompleteMetadata { dataset: self.name.clone(), field }),
            None => Ok(()),
        }
    }
}

/// The role a configured field plays in its dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldRole {
    /// Listed in the schema's feature section
    Feature,
    /// Id, target, or anything else kept out of the feature list
    Other,
}

impl FieldRole {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("feature") {
            FieldRole::Feature
        } else {
            FieldRole::Other
        }
    }
}

/// One configured field of one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Name of the dataset this field belongs to
    pub dataset_name:      String,
    pub field_name:        String,
    pub field_description: String,
    pub field_role:        FieldRole,
    /// Declared type as written in the config, e.g. `categorical` or `numeric`
    pub data_type:         String,
}

impl FeatureConfig {
    pub fn is_categorical(&self) -> bool {
        self.data_type.trim().eq_ignore_ascii_case("categorical")
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
pub fn sample_metadata(name: &str) -> DatasetMetadata {
    DatasetMetadata {
        name:               name.to_string(),
        in_use:             true,
        id_name:            "id".to_string(),
        id_description:     "Row identifier".to_string(),
        target_name:        "class".to_string(),
        target_description: "Class label".to_string(),
        target_classes:     vec!["a".to_string(), "b".to_string()],
        title:              format!("{name} dataset"),
        description:        "A small test dataset".to_string(),
        model_category:     "binary_classification".to_string(),
        encoding:           "utf-8".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_target_for_used_dataset() {
        let mut meta    = sample_metadata("iris");
        meta.target_name = "  ".to_string();
        let err = meta.validate().unwrap_err();
        assert!(matches!(err, PrepError::IncompleteMetadata { field: "target_name", .. }));
    }

    #[test]
    fn test_validate_ignores_unused_dataset() {
        let mut meta = sample_metadata("iris");
        meta.in_use  = false;
        meta.id_name = String::new();
        assert!(meta.validate().is_ok());
    }

    #[test]
    fn test_field_role_parsing() {
        assert_eq!(FieldRole::parse("feature"), FieldRole::Feature);
        assert_eq!(FieldRole::parse(" Feature "), FieldRole::Feature);
        assert_eq!(FieldRole::parse("target"), FieldRole::Other);
        assert_eq!(FieldRole::parse("id"), FieldRole::Other);
    }

    #[test]
    fn test_is_categorical_is_case_insensitive() {
        let f = FeatureConfig {
            dataset_name:      "iris".into(),
            field_name:        "colour".into(),
            field_description: String::new(),
            field_role:        FieldRole::Feature,
            data_type:         "CATEGORICAL".into(),
        };
        assert!(f.is_categorical());
    }
}
