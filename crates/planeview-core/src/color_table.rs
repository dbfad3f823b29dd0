//! 256-entry color lookup tables.
//!
//! A [`ColorTable`] maps an 8-bit display index to an RGBA color. Tables are
//! immutable and cheap to clone (entries are shared behind an `Arc`).

use palette::{FromColor, Hsv, Srgb};
use std::sync::Arc;

use crate::error::{PlaneviewError, Result};

/// Number of entries in every color table.
pub const TABLE_SIZE: usize = 256;

/// An immutable 256-entry RGBA lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTable {
    entries: Arc<[[u8; 4]]>,
}

impl ColorTable {
    /// Build a table from exactly 256 RGBA entries.
    pub fn from_rgba(entries: Vec<[u8; 4]>) -> Result<Self> {
        if entries.len() != TABLE_SIZE {
            return Err(PlaneviewError::ColorTableLength(entries.len()));
        }
        Ok(Self {
            entries: entries.into(),
        })
    }

    /// Build an opaque table from exactly 256 RGB entries.
    pub fn from_rgb(entries: &[[u8; 3]]) -> Result<Self> {
        Self::from_rgba(entries.iter().map(|&[r, g, b]| [r, g, b, 0xff]).collect())
    }

    /// Build an opaque table from three separate 256-entry component arrays.
    pub fn from_components(red: &[u8], green: &[u8], blue: &[u8]) -> Result<Self> {
        for len in [red.len(), green.len(), blue.len()] {
            if len != TABLE_SIZE {
                return Err(PlaneviewError::ColorTableLength(len));
            }
        }
        let entries = (0..TABLE_SIZE)
            .map(|i| [red[i], green[i], blue[i], 0xff])
            .collect();
        Self::from_rgba(entries)
    }

    /// Linear ramp from black to `color`.
    pub fn ramp(color: Srgb<u8>) -> Self {
        let entries: Arc<[[u8; 4]]> = (0..TABLE_SIZE)
            .map(|i| {
                [
                    scale(color.red, i),
                    scale(color.green, i),
                    scale(color.blue, i),
                    0xff,
                ]
            })
            .collect();
        Self { entries }
    }

    pub fn gray() -> Self {
        Self::ramp(Srgb::new(255, 255, 255))
    }

    pub fn red() -> Self {
        Self::ramp(Srgb::new(255, 0, 0))
    }

    pub fn green() -> Self {
        Self::ramp(Srgb::new(0, 255, 0))
    }

    pub fn blue() -> Self {
        Self::ramp(Srgb::new(0, 0, 255))
    }

    pub fn cyan() -> Self {
        Self::ramp(Srgb::new(0, 255, 255))
    }

    pub fn magenta() -> Self {
        Self::ramp(Srgb::new(255, 0, 255))
    }

    pub fn yellow() -> Self {
        Self::ramp(Srgb::new(255, 255, 0))
    }

    /// Ramp from black to the fully saturated color at `hue_degrees`.
    pub fn hue(hue_degrees: f32) -> Self {
        let hsv: Hsv = Hsv::new(hue_degrees, 1.0, 1.0);
        let rgb: Srgb<u8> = Srgb::from_color(hsv).into_format();
        Self::ramp(rgb)
    }

    /// One table per channel: red, green, blue, gray, cyan, magenta, yellow,
    /// then repeating.
    pub fn defaults_for_channels(channels: usize) -> Vec<Self> {
        let stock = [
            Self::red(),
            Self::green(),
            Self::blue(),
            Self::gray(),
            Self::cyan(),
            Self::magenta(),
            Self::yellow(),
        ];
        (0..channels).map(|c| stock[c % stock.len()].clone()).collect()
    }

    /// RGBA entry at `index`.
    #[inline]
    pub fn rgba(&self, index: u8) -> [u8; 4] {
        self.entries[index as usize]
    }

    /// Entry at `index` packed as `0xAARRGGBB`.
    #[inline]
    pub fn argb(&self, index: u8) -> u32 {
        let [r, g, b, a] = self.rgba(index);
        crate::convert::pack_argb(a, r, g, b)
    }

    pub fn entries(&self) -> &[[u8; 4]] {
        &self.entries
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::gray()
    }
}

/// `component × i / 255`, rounded.
fn scale(component: u8, i: usize) -> u8 {
    ((component as usize * i + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_endpoints() {
        let table = ColorTable::red();
        assert_eq!(table.rgba(0), [0, 0, 0, 255]);
        assert_eq!(table.rgba(255), [255, 0, 0, 255]);
        assert_eq!(table.argb(255), 0xffff_0000);
        assert_eq!(ColorTable::gray().rgba(128), [128, 128, 128, 255]);
    }

    #[test]
    fn test_wrong_length_rejected() {
        let err = ColorTable::from_rgb(&[[1, 2, 3]; 255]).unwrap_err();
        assert!(matches!(err, PlaneviewError::ColorTableLength(255)));
        let err = ColorTable::from_components(&[0; 256], &[0; 256], &[0; 10]).unwrap_err();
        assert!(matches!(err, PlaneviewError::ColorTableLength(10)));
    }

    #[test]
    fn test_from_components_interleaves() {
        let red: Vec<u8> = (0..=255).collect();
        let green = vec![7u8; 256];
        let blue: Vec<u8> = (0..=255).rev().collect();
        let table = ColorTable::from_components(&red, &green, &blue).expect("256 entries");
        assert_eq!(table.rgba(10), [10, 7, 245, 255]);
        assert_eq!(table.entries().len(), TABLE_SIZE);
    }

    #[test]
    fn test_hue_primaries() {
        assert_eq!(ColorTable::hue(0.0).rgba(255), [255, 0, 0, 255]);
        assert_eq!(ColorTable::hue(120.0).rgba(255), [0, 255, 0, 255]);
        assert_eq!(ColorTable::hue(240.0).rgba(255), [0, 0, 255, 255]);
    }

    #[test]
    fn test_defaults_cycle() {
        let tables = ColorTable::defaults_for_channels(9);
        assert_eq!(tables.len(), 9);
        assert_eq!(tables[0], ColorTable::red());
        assert_eq!(tables[3], ColorTable::gray());
        assert_eq!(tables[7], ColorTable::red());
    }
}
