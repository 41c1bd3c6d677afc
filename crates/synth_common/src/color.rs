use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SynthError;

/// An RGB triple acting as a unique, stable identifier for one foreground
/// instance within one composite's mask.
///
/// Serializes as the string `"(r, g, b)"` so it can key JSON maps in
/// `mask_definitions.json` and the COCO export registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct ColorKey([u8; 3]);

/// The fixed palette of mask colors, one per concurrently placed foreground.
///
/// This is a hard capacity, not a growth-safe design: the palette must stay
/// at least as long as [`MAX_FOREGROUNDS`].
pub const MASK_PALETTE: [ColorKey; 3] = [
    ColorKey([255, 0, 0]),
    ColorKey([0, 255, 0]),
    ColorKey([0, 0, 255]),
];

/// Maximum number of foregrounds placed into a single composite.
pub const MAX_FOREGROUNDS: usize = 3;

const _: () = assert!(MASK_PALETTE.len() >= MAX_FOREGROUNDS);

impl ColorKey {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub const fn rgb(&self) -> [u8; 3] {
        self.0
    }

    /// Pure black marks "no object" in an instance mask.
    pub fn is_background(&self) -> bool {
        self.0 == [0, 0, 0]
    }
}

impl From<[u8; 3]> for ColorKey {
    fn from(rgb: [u8; 3]) -> Self {
        Self(rgb)
    }
}

impl fmt::Display for ColorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "({}, {}, {})", r, g, b)
    }
}

impl FromStr for ColorKey {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SynthError::InvalidColorKey(s.to_string());
        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;

        let mut channels = inner.split(',').map(|part| part.trim().parse::<u8>());
        let r = channels.next().ok_or_else(invalid)?.map_err(|_| invalid())?;
        let g = channels.next().ok_or_else(invalid)?.map_err(|_| invalid())?;
        let b = channels.next().ok_or_else(invalid)?.map_err(|_| invalid())?;
        if channels.next().is_some() {
            return Err(invalid());
        }

        Ok(Self([r, g, b]))
    }
}

impl TryFrom<String> for ColorKey {
    type Error = SynthError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ColorKey> for String {
    fn from(key: ColorKey) -> Self {
        key.to_string()
    }
}
