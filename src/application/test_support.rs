//! Fixtures shared by the use case tests.

use anyhow::{anyhow, Result};
use std::{collections::HashMap, fs};

use crate::domain::{table::Table, traits::RawDatasetSource};
use crate::infra::config::PathsConfig;

/// Serves raw tables from memory instead of `<raw_root>`.
pub struct MemorySource {
    tables: HashMap<String, Table>,
}

impl MemorySource {
    pub fn new(tables: &[(&str, Table)]) -> Self {
        Self {
            tables: tables.iter().map(|(n, t)| (n.to_string(), t.clone())).collect(),
        }
    }
}

impl RawDatasetSource for MemorySource {
    fn load_raw(&self, dataset_name: &str) -> Result<Table> {
        self.tables
            .get(dataset_name)
            .cloned()
            .ok_or_else(|| anyhow!("no raw table for '{dataset_name}'"))
    }
}

/// Metadata with one dataset in use ("demo") and one skipped, plus
/// a feature config for both.
pub fn write_catalog(paths: &PathsConfig) {
    fs::write(
        &paths.dataset_cfg_path,
        "name,use_dataset,id_name,id_description,target_name,target_description,\
         target_classes,title,description,model_category,encoding\n\
         demo,1,id,Row id,class,Label,a|b,Demo,Demo data,binary_classification,utf-8\n\
         skipped,0,id,Row id,class,Label,x|y,Skipped,Not used,binary_classification,utf-8\n",
    )
    .unwrap();
    fs::write(
        &paths.features_cfg_path,
        "name,field_name,field_description,field_type,data_type\n\
         demo,id,Row id,id,NUMERIC\n\
         demo,f0,First measurement,feature,NUMERIC\n\
         demo,colour,Colour,feature,CATEGORICAL\n\
         demo,class,Label,target,CATEGORICAL\n\
         skipped,x,Unused,feature,NUMERIC\n",
    )
    .unwrap();
}
