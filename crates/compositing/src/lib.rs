//! # Compositing - Synthetic Scene Assembly
//!
//! Builds synthetic training images by layering transformed foreground
//! cutouts onto random crops of background photos, while accreting a
//! color-coded instance mask in lock-step with the blending.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use compositing::{AssetLibrary, Compositor, ForegroundTransformer, Layer};
//! use synth_common::MASK_PALETTE;
//! use std::path::Path;
//!
//! let library = AssetLibrary::scan(Path::new("input"))?;
//! let mut rng = rand::thread_rng();
//!
//! let asset = library.random_foreground(&mut rng);
//! let cutout = image::open(&asset.path)?.to_rgba8();
//! let transformed = ForegroundTransformer::default()
//!     .transform(&cutout, &asset.path, &mut rng)?;
//!
//! let background = image::open(library.random_background(&mut rng))?.to_rgb8();
//! let layer = Layer {
//!     image: transformed,
//!     color: MASK_PALETTE[0],
//!     category: asset.category.clone(),
//!     super_category: asset.super_category.clone(),
//! };
//! let composite = Compositor::new(512, 512).compose(&background, &[layer], &mut rng)?;
//! composite.image.save("out.jpg")?;
//! composite.mask.save("out_mask.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod compose;
pub mod error;
pub mod sources;
pub mod transform;

// Re-exports for convenience
pub use compose::{Composite, Compositor, Layer, OPACITY_THRESHOLD};
pub use error::{CompositeError, Result};
pub use sources::{ALLOWED_BACKGROUND_TYPES, AssetLibrary, ForegroundAsset};
pub use transform::ForegroundTransformer;
