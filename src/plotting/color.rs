use std::fmt;

use plotters::style::RGBColor;
use serde::{Serialize, Serializer};

/// Color of a contributor's chart series, derived from their name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContributorColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ContributorColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Deterministic color for `name`. Equal names give equal colors across
    /// runs; distinct names may collide.
    pub fn for_name(name: &str) -> Self {
        Self::from_hash(name_hash(name))
    }

    /// Low 24 bits of the hash as `0xRRGGBB`.
    pub fn from_hash(hash: i32) -> Self {
        let rgb = (hash as u32) & 0x00FF_FFFF;
        Self {
            r: ((rgb >> 16) & 0xFF) as u8,
            g: ((rgb >> 8) & 0xFF) as u8,
            b: (rgb & 0xFF) as u8,
        }
    }

    /// Six uppercase hex digits without the leading `#`.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn to_rgb(self) -> RGBColor {
        RGBColor(self.r, self.g, self.b)
    }
}

impl fmt::Display for ContributorColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.hex())
    }
}

impl Serialize for ContributorColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Polynomial string hash (`hash * 31 + unit`) over UTF-16 code units with
/// 32-bit signed wraparound.
pub fn name_hash(name: &str) -> i32 {
    name.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}
