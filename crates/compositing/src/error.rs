use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompositeError {
    #[error(
        "Foreground has no transparency: {path} (cutouts must carry an alpha \
         channel with at least one fully transparent pixel)"
    )]
    MalformedForeground { path: PathBuf },

    #[error(
        "Background {width}x{height} is smaller than the {target_width}x{target_height} target"
    )]
    BackgroundTooSmall {
        width: u32,
        height: u32,
        target_width: u32,
        target_height: u32,
    },

    #[error(
        "Foreground {width}x{height} does not fit the {target_width}x{target_height} composite"
    )]
    ForegroundTooLarge {
        width: u32,
        height: u32,
        target_width: u32,
        target_height: u32,
    },

    #[error("No valid foreground images were found in {0}")]
    NoForegrounds(PathBuf),

    #[error("No valid background images were found in {0}")]
    NoBackgrounds(PathBuf),

    #[error("Missing '{name}' folder in input directory: {input_dir}")]
    MissingInputFolder { name: &'static str, input_dir: PathBuf },

    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CompositeError>;
