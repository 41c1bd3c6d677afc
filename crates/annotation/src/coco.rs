use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use synth_common::{Info, License};

use crate::error::Result;

/// COCO category record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub supercategory: String,
    pub id: u32,
    pub name: String,
}

/// COCO image record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub license: u32,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub id: u32,
}

/// COCO annotation record: polygon segmentation, derived bounds and area,
/// and the ids tying it to its image and category. `iscrowd` is fixed at 0;
/// every annotation here describes a single object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub segmentation: Vec<Vec<f64>>,
    pub iscrowd: u32,
    pub image_id: u32,
    pub category_id: u32,
    pub id: u32,
    pub bbox: [f64; 4],
    pub area: f64,
}

/// The assembled COCO document. `license` is a single-element list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocoDocument {
    pub info: Info,
    pub license: Vec<License>,
    pub images: Vec<ImageRecord>,
    pub annotations: Vec<Annotation>,
    pub categories: Vec<Category>,
}

impl CocoDocument {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes the document in compact form. Unlike the hand-editable
    /// `mask_definitions.json` / `dataset_info.json`, `coco.json` is
    /// machine-consumed and can run to many megabytes, so it is not
    /// pretty-printed.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Builds the category list from an ordered super-category map, assigning
/// numeric ids starting at 1. Also returns the name -> id lookup used to
/// resolve each mask color's declared category.
pub fn build_categories(
    super_categories: &BTreeMap<String, BTreeSet<String>>,
) -> (Vec<Category>, BTreeMap<String, u32>) {
    let mut categories = Vec::new();
    let mut id_by_name = BTreeMap::new();
    let mut next_id = 1u32;

    for (super_category, names) in super_categories {
        for name in names {
            categories.push(Category {
                supercategory: super_category.clone(),
                id: next_id,
                name: name.clone(),
            });
            id_by_name.insert(name.clone(), next_id);
            next_id += 1;
        }
    }

    (categories, id_by_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ids_start_at_one_and_follow_map_order() {
        let mut supers: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        supers
            .entry("animal".to_string())
            .or_default()
            .extend(["dog".to_string(), "cat".to_string()]);
        supers
            .entry("vehicle".to_string())
            .or_default()
            .insert("car".to_string());

        let (categories, id_by_name) = build_categories(&supers);
        assert_eq!(categories.len(), 3);
        assert_eq!(id_by_name["cat"], 1);
        assert_eq!(id_by_name["dog"], 2);
        assert_eq!(id_by_name["car"], 3);
        assert_eq!(categories[2].supercategory, "vehicle");
    }

    #[test]
    fn test_document_round_trips_through_json() {
        let document = CocoDocument {
            info: Info::default(),
            license: vec![License::default()],
            images: vec![ImageRecord {
                license: 1,
                file_name: "00000000.jpg".to_string(),
                width: 100,
                height: 100,
                id: 0,
            }],
            annotations: vec![Annotation {
                segmentation: vec![vec![0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 0.0]],
                iscrowd: 0,
                image_id: 0,
                category_id: 1,
                id: 0,
                bbox: [0.0, 0.0, 10.0, 10.0],
                area: 50.0,
            }],
            categories: vec![Category {
                supercategory: "animal".to_string(),
                id: 1,
                name: "cat".to_string(),
            }],
        };

        let json = serde_json::to_string(&document).unwrap();
        let parsed: CocoDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, document);
    }
}
