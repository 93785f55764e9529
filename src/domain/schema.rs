// ============================================================
// Layer 3 — Schema Document
// ============================================================
// The descriptive JSON document written next to every fold:
//
//   {
//     "title": "...", "description": "...", "modelCategory": "...",
//     "schemaVersion": 1.0, "inputDataFormat": "CSV", "encoding": "utf-8",
//     "id":       { "name": "id", "description": "..." },
//     "target":   { "name": "class", "description": "...", "classes": [...] },
//     "features": [ { "name": ..., "dataType": "CATEGORICAL",
//                     "categories": [...], "nullable": true }, ... ]
//   }
//
// Field order in the structs is the key order in the output.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SCHEMA_VERSION: f64 = 1.0;

pub const INPUT_DATA_FORMAT: &str = "CSV";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    pub title:             String,
    pub description:       String,
    pub model_category:    String,
    pub schema_version:    f64,
    pub input_data_format: String,
    pub encoding:          String,
    pub id:                IdSpec,
    pub target:            TargetSpec,
    pub features:          Vec<FeatureSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdSpec {
    pub name:        String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub name:        String,
    pub description: String,
    pub classes:     Vec<String>,
}

/// One entry of the feature list. Categorical features carry
/// `categories`, everything else carries a single `example`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSpec {
    pub name:        String,
    pub description: String,
    pub data_type:   String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories:  Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example:     Option<Value>,
    pub nullable:    bool,
}
