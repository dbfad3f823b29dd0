//! Synthetic three-channel test datasets.

use planeview_core::{Axis, Dataset, Image, Result, SampleKind};

/// Number of channels in the synthetic datasets.
pub const CHANNELS: usize = 3;

/// Horizontal, vertical, and diagonal 8-bit ramps, one per channel.
pub fn gradients(size: usize) -> Result<Dataset> {
    let mut image = Image::new(&[size, size, CHANNELS], SampleKind::U8)?;
    let max = (size - 1).max(1) as f64;
    for y in 0..size {
        for x in 0..size {
            let (fx, fy) = (x as f64 / max, y as f64 / max);
            let (xi, yi) = (x as i64, y as i64);
            image.set(&[xi, yi, 0], fx * 255.0);
            image.set(&[xi, yi, 1], fy * 255.0);
            image.set(&[xi, yi, 2], (fx + fy) * 127.5);
        }
    }
    Dataset::new(
        "Gradients",
        vec![Axis::X, Axis::Y, Axis::Channel],
        image,
    )
}

/// A centered disc of value 200 on a zero background, identical in every channel.
pub fn disc(size: usize) -> Result<Dataset> {
    let mut image = Image::new(&[size, size, CHANNELS], SampleKind::U8)?;
    let center = size as f64 / 2.0;
    let radius = size as f64 / 3.0;
    for y in 0..size {
        for x in 0..size {
            let (dx, dy) = (x as f64 + 0.5 - center, y as f64 + 0.5 - center);
            if dx * dx + dy * dy <= radius * radius {
                for c in 0..CHANNELS {
                    image.set(&[x as i64, y as i64, c as i64], 200.0);
                }
            }
        }
    }
    Dataset::new("Disc", vec![Axis::X, Axis::Y, Axis::Channel], image)
}
