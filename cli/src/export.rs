use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::info;

use annotation::{
    AnnotationBuilder, AnnotationCounter, CocoDocument, ImageRecord, build_categories, decompose,
    verify_color_keys,
};
use synth_common::{ColorKey, DatasetMetadata, MaskDefinitions};

use crate::Result;

/// Orchestrates one coco run: replays the mask definitions written by the
/// compose run, extracts polygon annotations from every mask, and assembles
/// `coco.json` next to the mask definition document.
pub struct CocoExporter {
    pub mask_definition: PathBuf,
    pub dataset_info: PathBuf,
}

impl CocoExporter {
    pub fn new(mask_definition: PathBuf, dataset_info: PathBuf) -> Self {
        Self {
            mask_definition,
            dataset_info,
        }
    }

    /// Runs the export, returning the path of the written COCO document.
    ///
    /// Image ids follow the ordered mask map; file stems are zero-padded, so
    /// id order equals generation order. The annotation counter is shared
    /// across all images, keeping annotation ids contiguous from 0.
    pub fn export(&self) -> Result<PathBuf> {
        let definitions = MaskDefinitions::from_json_file(&self.mask_definition)?;
        let metadata = DatasetMetadata::from_json_file(&self.dataset_info)?;
        let dataset_dir = self
            .mask_definition
            .parent()
            .unwrap_or_else(|| Path::new("."));

        let (categories, id_by_name) = build_categories(&definitions.super_categories);
        info!("exporting {} categories", categories.len());

        let builder = AnnotationBuilder::default();
        let mut counter = AnnotationCounter::new();
        let mut images = Vec::with_capacity(definitions.masks.len());
        let mut annotations = Vec::new();

        for (index, (image_path, entry)) in definitions.masks.iter().enumerate() {
            let image_id = index as u32;

            let composite = image::open(dataset_dir.join(image_path))?;
            // COCO image records carry the bare file name, not the
            // images/-relative path used to key the mask definitions
            let file_name = Path::new(image_path)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| image_path.clone());
            images.push(ImageRecord {
                license: metadata.license.id,
                file_name,
                width: composite.width(),
                height: composite.height(),
                id: image_id,
            });

            let mask = image::open(dataset_dir.join(&entry.mask))?.to_rgb8();
            let isolated = decompose(&mask);

            let assigned: BTreeSet<ColorKey> = entry.color_categories.keys().copied().collect();
            verify_color_keys(&isolated, &assigned, image_path);

            let registry: BTreeMap<ColorKey, u32> = entry
                .color_categories
                .iter()
                .filter_map(|(color, declaration)| {
                    id_by_name
                        .get(&declaration.category)
                        .map(|&category_id| (*color, category_id))
                })
                .collect();

            annotations.extend(builder.build_annotations(
                &isolated,
                image_id,
                &registry,
                &mut counter,
            )?);
        }

        let document = CocoDocument {
            info: metadata.info,
            license: vec![metadata.license],
            images,
            annotations,
            categories,
        };

        let output = dataset_dir.join("coco.json");
        document.to_json_file(&output)?;
        info!(
            "wrote {} images and {} annotations to {}",
            document.images.len(),
            document.annotations.len(),
            output.display()
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::fs;
    use synth_common::{ColorCategory, MASK_PALETTE};

    fn paint_square(mask: &mut RgbImage, x0: u32, y0: u32, side: u32, color: ColorKey) {
        let [r, g, b] = color.rgb();
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                mask.put_pixel(x, y, Rgb([r, g, b]));
            }
        }
    }

    /// Lays out a tiny two-image dataset on disk: composites, masks, and
    /// the two JSON documents of a compose run.
    fn build_dataset(root: &Path) {
        fs::create_dir_all(root.join("images")).unwrap();
        fs::create_dir_all(root.join("masks")).unwrap();

        let mut definitions = MaskDefinitions::default();
        for (index, (x, y, side)) in [(0u32, (10, 10, 50)), (1u32, (100, 60, 30))] {
            let stem = synth_common::padded_stem(index);
            RgbImage::from_pixel(200, 200, Rgb([80, 80, 80]))
                .save(root.join(format!("images/{stem}.jpg")))
                .unwrap();

            let mut mask = RgbImage::new(200, 200);
            paint_square(&mut mask, x, y, side, MASK_PALETTE[0]);
            mask.save(root.join(format!("masks/{stem}.png"))).unwrap();

            let mut colors = BTreeMap::new();
            colors.insert(
                MASK_PALETTE[0],
                ColorCategory {
                    category: "moving_box".to_string(),
                    super_category: "cardboard_box".to_string(),
                },
            );
            definitions.add_mask(
                format!("images/{stem}.jpg"),
                format!("masks/{stem}.png"),
                colors,
            );
        }
        definitions
            .to_json_file(root.join("mask_definitions.json"))
            .unwrap();
        DatasetMetadata::default()
            .to_json_file(root.join("dataset_info.json"))
            .unwrap();
    }

    #[test]
    fn test_export_assembles_a_complete_document() {
        let dir = tempfile::tempdir().unwrap();
        build_dataset(dir.path());

        let exporter = CocoExporter::new(
            dir.path().join("mask_definitions.json"),
            dir.path().join("dataset_info.json"),
        );
        let output = exporter.export().unwrap();
        assert_eq!(output, dir.path().join("coco.json"));

        let document = CocoDocument::from_json_file(&output).unwrap();
        assert_eq!(document.images.len(), 2);
        assert_eq!(document.annotations.len(), 2);
        assert_eq!(document.categories.len(), 1);
        assert_eq!(document.categories[0].id, 1);
        assert_eq!(document.license.len(), 1);

        // ids contiguous, in generation order; file names are bare stems,
        // not the images/-relative mask-definition keys
        assert_eq!(document.images[0].id, 0);
        assert_eq!(document.images[0].file_name, "00000000.jpg");
        assert_eq!(document.images[1].file_name, "00000001.jpg");
        assert_eq!(document.annotations[0].id, 0);
        assert_eq!(document.annotations[1].id, 1);
        assert_eq!(document.annotations[1].image_id, 1);

        // the 50x50 square recovers its area within tolerance
        assert!((document.annotations[0].area - 2500.0).abs() < 60.0);
    }
}
