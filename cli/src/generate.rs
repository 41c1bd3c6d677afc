use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use image::RgbaImage;
use rand::Rng;
use tracing::info;

use compositing::{AssetLibrary, Composite, Compositor, ForegroundTransformer, Layer};
use synth_common::{
    ColorCategory, ColorKey, DatasetMetadata, Info, License, MASK_PALETTE, MAX_FOREGROUNDS,
    MaskDefinitions, padded_stem,
};

use crate::{CliError, GenerationConfig, Prompt, Result};

/// Orchestrates one compose run: scans the input assets, generates `count`
/// composites with their masks, and writes `mask_definitions.json` and
/// `dataset_info.json` alongside them.
#[derive(Debug)]
pub struct DatasetGenerator {
    config: GenerationConfig,
    transformer: ForegroundTransformer,
    compositor: Compositor,
}

impl DatasetGenerator {
    pub fn new(config: GenerationConfig) -> Result<Self> {
        config.validate()?;
        let compositor = Compositor::new(config.width, config.height);
        Ok(Self {
            config,
            transformer: ForegroundTransformer::default(),
            compositor,
        })
    }

    pub fn run<R: Rng, P: Prompt>(&self, rng: &mut R, prompt: &P) -> Result<()> {
        let library = AssetLibrary::scan(&self.config.input_dir)?;
        info!(
            "scanned {} foregrounds and {} backgrounds from {}",
            library.foregrounds.len(),
            library.backgrounds.len(),
            self.config.input_dir.display()
        );

        let images_dir = self.prepare_output_dir("images", prompt)?;
        let masks_dir = self.prepare_output_dir("masks", prompt)?;

        let mut definitions = MaskDefinitions::default();
        for index in 0..self.config.count {
            let stem = padded_stem(index);
            let image_name = format!("{stem}.{}", self.config.output_type.extension());
            let mask_name = format!("{stem}.png");

            let (composite, colors) = self.generate_one(&library, rng)?;
            composite.image.save(images_dir.join(&image_name))?;
            composite.mask.save(masks_dir.join(&mask_name))?;

            definitions.add_mask(
                format!("images/{image_name}"),
                format!("masks/{mask_name}"),
                colors,
            );
            info!("generated composite {} of {}", index + 1, self.config.count);
        }

        definitions.to_json_file(self.config.output_dir.join("mask_definitions.json"))?;
        self.write_dataset_info(prompt)?;

        info!(
            "compose run complete: {} images in {}",
            self.config.count,
            self.config.output_dir.display()
        );
        Ok(())
    }

    /// Creates `<output_dir>/<name>`, asking before reusing a non-empty one.
    fn prepare_output_dir<P: Prompt>(&self, name: &str, prompt: &P) -> Result<PathBuf> {
        let dir = self.config.output_dir.join(name);
        fs::create_dir_all(&dir)?;

        if fs::read_dir(&dir)?.next().is_some() {
            let question = format!(
                "output directory {} is not empty, existing files may be overwritten. Continue?",
                dir.display()
            );
            if !prompt.confirm(&question)? {
                return Err(CliError::Aborted);
            }
        }
        Ok(dir)
    }

    fn generate_one<R: Rng>(
        &self,
        library: &AssetLibrary,
        rng: &mut R,
    ) -> Result<(Composite, BTreeMap<ColorKey, ColorCategory>)> {
        let background = image::open(library.random_background(rng))?.to_rgb8();

        let layer_count = rng.gen_range(1..=MAX_FOREGROUNDS);
        let mut layers = Vec::with_capacity(layer_count);
        for slot in 0..layer_count {
            let asset = library.random_foreground(rng);
            let cutout: RgbaImage = image::open(&asset.path)?.to_rgba8();
            let transformed = self.transformer.transform(&cutout, &asset.path, rng)?;
            layers.push(Layer {
                image: transformed,
                color: MASK_PALETTE[slot],
                category: asset.category.clone(),
                super_category: asset.super_category.clone(),
            });
        }

        let colors = layers
            .iter()
            .map(|layer| {
                (
                    layer.color,
                    ColorCategory {
                        category: layer.category.clone(),
                        super_category: layer.super_category.clone(),
                    },
                )
            })
            .collect();

        let composite = self.compositor.compose(&background, &layers, rng)?;
        Ok((composite, colors))
    }

    /// Collects the dataset metadata, through the prompt when interactive,
    /// and writes `dataset_info.json`.
    fn write_dataset_info<P: Prompt>(&self, prompt: &P) -> Result<()> {
        let path = self.config.output_dir.join("dataset_info.json");
        if path.is_file() && !prompt.confirm("dataset_info.json already exists. Rewrite it?")? {
            return Ok(());
        }

        let defaults = Info::default();
        let info = Info {
            description: prompt.read_line("Description of the dataset:", &defaults.description)?,
            version: prompt.read_line("Dataset version:", &defaults.version)?,
            url: prompt.read_line("Dataset URL:", &defaults.url)?,
            contributor: prompt.read_line("Contributor:", &defaults.contributor)?,
            year: defaults.year,
            date_created: defaults.date_created,
        };
        let license_defaults = License::default();
        let license = License {
            name: prompt.read_line("License name:", &license_defaults.name)?,
            url: prompt.read_line("License URL:", &license_defaults.url)?,
            id: license_defaults.id,
        };

        DatasetMetadata { info, license }.to_json_file(&path)?;
        info!("wrote dataset metadata to {}", path.display());
        Ok(())
    }
}

/// Exists so tests can decline the overwrite confirmation.
#[cfg(test)]
struct RefusingPrompt;

#[cfg(test)]
impl Prompt for RefusingPrompt {
    fn confirm(&self, _question: &str) -> Result<bool> {
        Ok(false)
    }

    fn read_line(&self, _question: &str, default: &str) -> Result<String> {
        Ok(default.to_string())
    }
}
