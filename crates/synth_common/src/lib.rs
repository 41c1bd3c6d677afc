//! # Synth Common - Shared Types for the Dataset Kit
//!
//! Foundational types shared by the compositing and annotation crates: mask
//! color keys, the on-disk `mask_definitions.json` / `dataset_info.json`
//! documents, and the palette limits of the generator.
//!
//! ## Example
//!
//! ```rust
//! use synth_common::{ColorKey, MaskDefinitions, MASK_PALETTE};
//!
//! let key = MASK_PALETTE[0];
//! assert_eq!(key.to_string(), "(255, 0, 0)");
//!
//! let mut defs = MaskDefinitions::default();
//! assert!(defs.add_category("moving_box", "cardboard_box"));
//! ```

use thiserror::Error;

pub mod color;
pub mod dataset;
pub mod masks;

pub use color::{ColorKey, MASK_PALETTE, MAX_FOREGROUNDS};
pub use dataset::{DatasetMetadata, Info, License};
pub use masks::{ColorCategory, MaskDefinitions, MaskEntry};

// Re-exports for convenience
pub use chrono::{DateTime, Utc};

/// Result type for shared document operations
pub type Result<T> = std::result::Result<T, SynthError>;

/// Standard error type for the shared document layer
#[derive(Error, Debug)]
pub enum SynthError {
    #[error("Invalid color key: {0}")]
    InvalidColorKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Number of digits in generated file stems, e.g. `00000027.png`.
/// Supports up to 100 million images per dataset.
pub const ZERO_PADDING: usize = 8;

/// Zero-padded file stem for the image/mask pair at `index`.
pub fn padded_stem(index: u32) -> String {
    format!("{:01$}", index, ZERO_PADDING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_stem() {
        assert_eq!(padded_stem(0), "00000000");
        assert_eq!(padded_stem(27), "00000027");
        assert_eq!(padded_stem(99_999_999), "99999999");
    }
}
