use std::fs;
use std::path::Path;

use chrono::Datelike;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Result;

/// The `info` block of `dataset_info.json` and of the final COCO document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Info {
    pub description: String,
    pub version: String,
    pub url: String,
    pub year: i32,
    pub contributor: String,
    pub date_created: String,
}

impl Default for Info {
    fn default() -> Self {
        let now = chrono::Utc::now();
        Self {
            description: "Synthetic dataset".to_string(),
            version: "1.0".to_string(),
            url: String::new(),
            year: now.year(),
            contributor: String::new(),
            date_created: now.date_naive().to_string(),
        }
    }
}

/// The `license` block of `dataset_info.json`; the COCO document carries it
/// as a single-element list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct License {
    pub url: String,
    pub id: u32,
    pub name: String,
}

impl Default for License {
    fn default() -> Self {
        Self {
            url: String::new(),
            id: 1,
            name: "Unknown".to_string(),
        }
    }
}

/// Contents of `dataset_info.json`: user-supplied metadata collected by the
/// compose run and consumed by the COCO export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DatasetMetadata {
    pub info: Info,
    pub license: License,
}

impl DatasetMetadata {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_serializable() {
        let metadata = DatasetMetadata::default();
        let json = serde_json::to_string(&metadata).unwrap();
        let parsed: DatasetMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, metadata);
        assert_eq!(parsed.license.id, 1);
    }

    #[test]
    fn test_reads_handwritten_document() {
        let json = r#"{
            "info": {
                "description": "boxes",
                "version": "0.1",
                "url": "https://example.com",
                "year": 2024,
                "contributor": "me",
                "date_created": "2024-01-01"
            },
            "license": { "url": "", "id": 3, "name": "CC0" }
        }"#;
        let parsed: DatasetMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.info.description, "boxes");
        assert_eq!(parsed.license.id, 3);
    }
}
