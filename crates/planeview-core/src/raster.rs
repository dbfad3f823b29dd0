//! Flat ARGB pixel buffer produced by display projection.

use ::image::{Rgba, RgbaImage};

use crate::convert::unpack_argb;

/// A `width × height` buffer of `0xAARRGGBB` pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgbRaster {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl ArgbRaster {
    /// A fully transparent black raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.pixels[self.offset(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, argb: u32) {
        let i = self.offset(x, y);
        self.pixels[i] = argb;
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Raw pixel words as bytes, in native endianness, for handing to a host surface.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Convert to an `image` crate RGBA buffer, e.g. for saving to disk.
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let [a, r, g, b] = unpack_argb(self.get(x, y));
            Rgba([r, g, b, a])
        })
    }
}
