//! Per-channel conversion of scalar samples to ARGB display pixels.
//!
//! A sample is first mapped into an 8-bit display index through a
//! [`DisplayRange`]:
//! ```text
//! index = clamp(round((v − min) × 255 / (max − min)), 0, 255)
//! ```
//! The index is then either replicated into a gray pixel or looked up in a
//! [`ColorTable`].
//!
//! # Composite blending
//! Channels are blended additively. Each channel's contribution is converted
//! on its own, then accumulated in channel order:
//! ```text
//! rgb   = min(255, Σ contribution.rgb)
//! alpha = max(contribution.alpha)
//! ```

use serde::{Deserialize, Serialize};

use crate::color_table::ColorTable;

/// Pack four 8-bit components into `0xAARRGGBB`.
#[inline]
pub const fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Split `0xAARRGGBB` into `[a, r, g, b]`.
#[inline]
pub const fn unpack_argb(argb: u32) -> [u8; 4] {
    [(argb >> 24) as u8, (argb >> 16) as u8, (argb >> 8) as u8, argb as u8]
}

/// Sample values mapped onto the full 0..=255 display index range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRange {
    pub min: f64,
    pub max: f64,
}

impl DisplayRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Display index for `value`. A degenerate range (`max <= min`) is a
    /// threshold at `min`.
    #[inline]
    pub fn index(&self, value: f64) -> u8 {
        let width = self.max - self.min;
        if width <= 0.0 {
            return if value >= self.min { 255 } else { 0 };
        }
        let scaled = ((value - self.min) * 255.0 / width).round();
        if scaled.is_nan() {
            return 0;
        }
        scaled.clamp(0.0, 255.0) as u8
    }
}

impl Default for DisplayRange {
    fn default() -> Self {
        Self::new(0.0, 255.0)
    }
}

/// Converts one sample into one ARGB pixel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelConverter {
    /// Opaque gray level, no color table.
    Gray { range: DisplayRange },
    /// Color looked up in a table.
    Lut { range: DisplayRange, table: ColorTable },
}

impl ChannelConverter {
    pub fn gray(range: DisplayRange) -> Self {
        Self::Gray { range }
    }

    pub fn lut(range: DisplayRange, table: ColorTable) -> Self {
        Self::Lut { range, table }
    }

    pub fn range(&self) -> DisplayRange {
        match self {
            Self::Gray { range } | Self::Lut { range, .. } => *range,
        }
    }

    /// The color table, if this converter uses one.
    pub fn table(&self) -> Option<&ColorTable> {
        match self {
            Self::Gray { .. } => None,
            Self::Lut { table, .. } => Some(table),
        }
    }

    /// Swap the color table. A gray converter becomes a table converter.
    pub fn set_table(&mut self, table: ColorTable) {
        let range = self.range();
        *self = Self::Lut { range, table };
    }

    #[inline]
    pub fn convert(&self, value: f64) -> u32 {
        match self {
            Self::Gray { range } => {
                let v = range.index(value);
                pack_argb(0xff, v, v, v)
            }
            Self::Lut { range, table } => table.argb(range.index(value)),
        }
    }
}

/// Additively accumulate one channel's `contribution` into `acc`.
#[inline]
pub fn blend_additive(acc: u32, contribution: u32) -> u32 {
    let [aa, ar, ag, ab] = unpack_argb(acc);
    let [ca, cr, cg, cb] = unpack_argb(contribution);
    pack_argb(
        aa.max(ca),
        ar.saturating_add(cr),
        ag.saturating_add(cg),
        ab.saturating_add(cb),
    )
}

/// Blend a whole pixel from one sample per channel.
///
/// `samples[c]` is converted by `converters[c]`; extra entries on either side
/// are ignored.
pub fn composite(converters: &[ChannelConverter], samples: &[f64]) -> u32 {
    converters
        .iter()
        .zip(samples)
        .fold(0, |acc, (converter, &v)| blend_additive(acc, converter.convert(v)))
}
