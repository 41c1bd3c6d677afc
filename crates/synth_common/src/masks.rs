use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ColorKey, Result};

/// Category declaration for one color key within one generated mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorCategory {
    pub category: String,
    pub super_category: String,
}

/// One generated image's mask record: the mask's relative path plus the
/// per-color-key category declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskEntry {
    pub mask: String,
    pub color_categories: BTreeMap<ColorKey, ColorCategory>,
}

/// Contents of `mask_definitions.json`: written by the compose run, read by
/// the COCO export.
///
/// Both maps are ordered. Image paths are zero-padded, so lexicographic
/// order equals generation order and image ids stay contiguous on export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskDefinitions {
    pub masks: BTreeMap<String, MaskEntry>,
    pub super_categories: BTreeMap<String, BTreeSet<String>>,
}

impl MaskDefinitions {
    /// Registers a category under its super-category.
    ///
    /// Returns false if the category was already registered.
    pub fn add_category(&mut self, category: &str, super_category: &str) -> bool {
        self.super_categories
            .entry(super_category.to_string())
            .or_default()
            .insert(category.to_string())
    }

    /// Adds one generated image's mask record, registering every category it
    /// declares.
    ///
    /// Returns false if the image path was already present.
    pub fn add_mask(
        &mut self,
        image_path: String,
        mask_path: String,
        color_categories: BTreeMap<ColorKey, ColorCategory>,
    ) -> bool {
        if self.masks.contains_key(&image_path) {
            return false;
        }

        for declaration in color_categories.values() {
            self.add_category(&declaration.category, &declaration.super_category);
        }

        self.masks.insert(
            image_path,
            MaskEntry {
                mask: mask_path,
                color_categories,
            },
        );
        true
    }

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

    fn declaration(category: &str, super_category: &str) -> ColorCategory {
        ColorCategory {
            category: category.to_string(),
            super_category: super_category.to_string(),
        }
    }

    #[test]
    fn test_add_category_deduplicates() {
        let mut defs = MaskDefinitions::default();
        assert!(defs.add_category("moving_box", "cardboard_box"));
        assert!(!defs.add_category("moving_box", "cardboard_box"));
        assert!(defs.add_category("shipping_box", "cardboard_box"));
        assert_eq!(defs.super_categories["cardboard_box"].len(), 2);
    }

    #[test]
    fn test_add_mask_registers_categories_and_rejects_duplicates() {
        let mut defs = MaskDefinitions::default();
        let mut colors = BTreeMap::new();
        colors.insert(ColorKey::new(255, 0, 0), declaration("moving_box", "cardboard_box"));

        assert!(defs.add_mask(
            "images/00000000.jpg".to_string(),
            "masks/00000000.png".to_string(),
            colors.clone(),
        ));
        assert!(!defs.add_mask(
            "images/00000000.jpg".to_string(),
            "masks/00000000.png".to_string(),
            colors,
        ));
        assert!(defs.super_categories["cardboard_box"].contains("moving_box"));
    }

    #[test]
    fn test_json_shape_matches_mask_definitions_document() {
        let mut defs = MaskDefinitions::default();
        let mut colors = BTreeMap::new();
        colors.insert(ColorKey::new(0, 255, 0), declaration("cat", "animal"));
        defs.add_mask(
            "images/00000001.jpg".to_string(),
            "masks/00000001.png".to_string(),
            colors,
        );

        let value = serde_json::to_value(&defs).unwrap();
        let entry = &value["masks"]["images/00000001.jpg"];
        assert_eq!(entry["mask"], "masks/00000001.png");
        assert_eq!(entry["color_categories"]["(0, 255, 0)"]["category"], "cat");
        assert_eq!(value["super_categories"]["animal"][0], "cat");
    }

    #[test]
    fn test_masks_iterate_in_generation_order() {
        let mut defs = MaskDefinitions::default();
        for index in [2u32, 0, 1] {
            defs.add_mask(
                format!("images/{:08}.jpg", index),
                format!("masks/{:08}.png", index),
                BTreeMap::new(),
            );
        }
        let order: Vec<_> = defs.masks.keys().cloned().collect();
        assert_eq!(
            order,
            vec![
                "images/00000000.jpg",
                "images/00000001.jpg",
                "images/00000002.jpg"
            ]
        );
    }
}
