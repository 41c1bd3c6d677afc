use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::warn;

use crate::error::{CompositeError, Result};

/// Raster formats accepted for background images.
pub const ALLOWED_BACKGROUND_TYPES: [&str; 3] = ["png", "jpg", "jpeg"];

/// One cut-out foreground image together with the category labels derived
/// from its position in the `foregrounds/<super>/<category>/` hierarchy.
#[derive(Debug, Clone)]
pub struct ForegroundAsset {
    pub path: PathBuf,
    pub category: String,
    pub super_category: String,
}

/// The scanned contents of an input directory: a two-level foreground
/// hierarchy and a flat directory of backgrounds.
///
/// Stray files or directories at unexpected levels are skipped with a
/// warning; an input tree yielding zero usable assets is a fatal
/// configuration error.
#[derive(Debug, Clone)]
pub struct AssetLibrary {
    pub foregrounds: Vec<ForegroundAsset>,
    pub backgrounds: Vec<PathBuf>,
}

impl AssetLibrary {
    /// Scans `<input_dir>/foregrounds` and `<input_dir>/backgrounds`.
    pub fn scan(input_dir: &Path) -> Result<Self> {
        let foregrounds_dir = Self::subdirectory(input_dir, "foregrounds")?;
        let backgrounds_dir = Self::subdirectory(input_dir, "backgrounds")?;

        let foregrounds = Self::scan_foregrounds(&foregrounds_dir)?;
        if foregrounds.is_empty() {
            return Err(CompositeError::NoForegrounds(foregrounds_dir));
        }

        let backgrounds = Self::scan_backgrounds(&backgrounds_dir)?;
        if backgrounds.is_empty() {
            return Err(CompositeError::NoBackgrounds(backgrounds_dir));
        }

        Ok(Self {
            foregrounds,
            backgrounds,
        })
    }

    fn subdirectory(input_dir: &Path, name: &'static str) -> Result<PathBuf> {
        let dir = input_dir.join(name);
        if !dir.is_dir() {
            return Err(CompositeError::MissingInputFolder {
                name,
                input_dir: input_dir.to_path_buf(),
            });
        }
        Ok(dir)
    }

    fn scan_foregrounds(foregrounds_dir: &Path) -> Result<Vec<ForegroundAsset>> {
        let mut assets = Vec::new();

        for super_entry in sorted_entries(foregrounds_dir)? {
            if !super_entry.is_dir() {
                warn!(
                    "file found in foregrounds directory (expected a super-category \
                     directory), ignoring: {}",
                    super_entry.display()
                );
                continue;
            }
            let super_category = directory_name(&super_entry);

            for category_entry in sorted_entries(&super_entry)? {
                if !category_entry.is_dir() {
                    warn!(
                        "file found in super-category directory (expected a category \
                         directory), ignoring: {}",
                        category_entry.display()
                    );
                    continue;
                }
                let category = directory_name(&category_entry);

                for image_entry in sorted_entries(&category_entry)? {
                    if !image_entry.is_file() {
                        warn!(
                            "directory found inside category directory (expected an \
                             image file), ignoring: {}",
                            image_entry.display()
                        );
                        continue;
                    }
                    if !has_extension(&image_entry, &["png"]) {
                        warn!(
                            "foreground image must be a png file, skipping: {}",
                            image_entry.display()
                        );
                        continue;
                    }

                    assets.push(ForegroundAsset {
                        path: image_entry,
                        category: category.clone(),
                        super_category: super_category.clone(),
                    });
                }
            }
        }

        Ok(assets)
    }

    fn scan_backgrounds(backgrounds_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut backgrounds = Vec::new();

        for entry in sorted_entries(backgrounds_dir)? {
            if !entry.is_file() {
                warn!(
                    "directory found inside backgrounds folder (expecting an image \
                     file), ignoring: {}",
                    entry.display()
                );
                continue;
            }
            if !has_extension(&entry, &ALLOWED_BACKGROUND_TYPES) {
                warn!(
                    "background type not allowed, ignoring: {}",
                    entry.display()
                );
                continue;
            }
            backgrounds.push(entry);
        }

        Ok(backgrounds)
    }

    /// Uniformly random foreground across every category.
    pub fn random_foreground<R: Rng>(&self, rng: &mut R) -> &ForegroundAsset {
        self.foregrounds
            .choose(rng)
            .expect("scan guarantees at least one foreground")
    }

    /// Uniformly random background.
    pub fn random_background<R: Rng>(&self, rng: &mut R) -> &Path {
        self.backgrounds
            .choose(rng)
            .expect("scan guarantees at least one background")
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .collect();
    entries.sort();
    Ok(entries)
}

fn directory_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| allowed.iter().any(|allow| ext.eq_ignore_ascii_case(allow)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::write(path, b"").unwrap();
    }

    fn build_input_tree(root: &Path) {
        let cat_dir = root.join("foregrounds/cardboard_box/moving_box");
        fs::create_dir_all(&cat_dir).unwrap();
        touch(&cat_dir.join("box_01.png"));
        touch(&cat_dir.join("box_02.png"));
        touch(&cat_dir.join("notes.txt"));

        let bg_dir = root.join("backgrounds");
        fs::create_dir_all(&bg_dir).unwrap();
        touch(&bg_dir.join("floor.jpg"));
        touch(&bg_dir.join("readme.md"));
    }

    #[test]
    fn test_scan_collects_labeled_assets() {
        let dir = tempfile::tempdir().unwrap();
        build_input_tree(dir.path());

        let library = AssetLibrary::scan(dir.path()).unwrap();
        assert_eq!(library.foregrounds.len(), 2);
        assert_eq!(library.backgrounds.len(), 1);

        let asset = &library.foregrounds[0];
        assert_eq!(asset.category, "moving_box");
        assert_eq!(asset.super_category, "cardboard_box");
    }

    #[test]
    fn test_scan_requires_both_input_folders() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("foregrounds")).unwrap();

        let err = AssetLibrary::scan(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            CompositeError::MissingInputFolder { name: "backgrounds", .. }
        ));
    }

    #[test]
    fn test_scan_rejects_empty_foregrounds() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("foregrounds/animal/cat")).unwrap();
        fs::create_dir_all(dir.path().join("backgrounds")).unwrap();
        touch(&dir.path().join("backgrounds/floor.png"));

        let err = AssetLibrary::scan(dir.path()).unwrap_err();
        assert!(matches!(err, CompositeError::NoForegrounds(_)));
    }
}
