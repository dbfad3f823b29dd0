//! Pixel-wise combination of two images, and sample copying between images.
//!
//! # Algorithm
//! One pass over the shared coordinate space:
//! ```text
//! for pos in region(dims):
//!     out[pos] = op(a[pos] as f64, b[pos] as f64)
//! ```
//! The result is always an `f64` image so no intermediate value is clipped or
//! rounded. Narrowing to a concrete sample kind happens later, in
//! [`copy_into`].
//!
//! # Complexity
//! O(N) in the element count, no memory beyond the output image.

use crate::error::{PlaneviewError, Result};
use crate::image::Image;
use crate::ops::BinaryOp;
use crate::region::HyperVolume;
use crate::sample::SampleKind;

/// Combine `input1` and `input2` sample by sample into a new `f64` image.
///
/// Neither input is modified. Fails with [`PlaneviewError::ShapeMismatch`] if
/// the inputs differ in rank or in the size of any axis.
pub fn combine(input1: &Image, input2: &Image, op: BinaryOp) -> Result<Image> {
    check_shapes(input1, input2)?;

    let mut out = Image::new(input1.dims(), SampleKind::F64)?;
    let apply = op.function();
    let region = HyperVolume::covering(input1.dims())?;
    let mut positions = region.positions();
    while let Some(pos) = positions.advance() {
        let value = apply(input1.get(pos), input2.get(pos));
        out.set(pos, value);
    }

    tracing::debug!(
        "combined {:?} images with {} ({} samples)",
        input1.dims(),
        op,
        region.element_count()
    );
    Ok(out)
}

/// Copy every sample of `src` into `dst`, narrowing to `dst`'s sample kind.
///
/// Walks the inclusive region `[0, dims - 1]` on every axis.
pub fn copy_into(dst: &mut Image, src: &Image) -> Result<()> {
    check_shapes(dst, src)?;

    let first = vec![0; src.ndim()];
    let region = HyperVolume::from_bounds(&first, &last_point(src.dims()))?;
    let mut positions = region.positions();
    while let Some(pos) = positions.advance() {
        dst.set(pos, src.get(pos));
    }
    Ok(())
}

/// Last valid coordinate of an image with the given dimensions.
pub fn last_point(dims: &[usize]) -> Vec<i64> {
    dims.iter().map(|&d| d as i64 - 1).collect()
}

fn check_shapes(a: &Image, b: &Image) -> Result<()> {
    if a.same_shape(b) {
        Ok(())
    } else {
        Err(PlaneviewError::ShapeMismatch {
            left: a.dims().to_vec(),
            right: b.dims().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_constant_images_combine_to_operator_value() {
        let c1 = 10.0;
        let c2 = 3.0;
        let a = Image::filled(&[3, 2, 2], SampleKind::U8, c1).expect("valid image");
        let b = Image::filled(&[3, 2, 2], SampleKind::U8, c2).expect("valid image");
        for op in BinaryOp::ALL {
            let out = combine(&a, &b, op).expect("same shape");
            assert_eq!(out.kind(), SampleKind::F64);
            assert_eq!(out.dims(), a.dims());
            let expected = op.apply(c1, c2);
            for v in out.to_f64_vec() {
                assert!((v - expected).abs() < EPSILON, "{op}: {v} vs {expected}");
            }
        }
    }

    #[test]
    fn test_result_is_not_clipped_to_input_kind() {
        let a = Image::filled(&[2, 2], SampleKind::U8, 200.0).expect("valid image");
        let b = Image::filled(&[2, 2], SampleKind::U8, 100.0).expect("valid image");
        let sum = combine(&a, &b, BinaryOp::Add).expect("same shape");
        assert_eq!(sum.get(&[1, 1]), 300.0);
        let diff = combine(&b, &a, BinaryOp::Subtract).expect("same shape");
        assert_eq!(diff.get(&[0, 0]), -100.0);
    }

    #[test]
    fn test_shape_mismatch_leaves_inputs_untouched() {
        let a = Image::filled(&[2, 2], SampleKind::U8, 1.0).expect("valid image");
        let b = Image::filled(&[2, 3], SampleKind::U8, 2.0).expect("valid image");
        let (a_before, b_before) = (a.clone(), b.clone());
        let err = combine(&a, &b, BinaryOp::Add).unwrap_err();
        assert!(matches!(err, PlaneviewError::ShapeMismatch { .. }));
        assert_eq!(a, a_before);
        assert_eq!(b, b_before);

        let c = Image::filled(&[2, 2, 1], SampleKind::U8, 2.0).expect("valid image");
        assert!(matches!(
            combine(&a, &c, BinaryOp::Add),
            Err(PlaneviewError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_add_then_subtract_recovers_first_operand() {
        let values: Vec<f64> = (0..24).map(|i| i as f64 * 1.25 - 7.0).collect();
        let a = Image::from_values(&[4, 3, 2], SampleKind::F64, &values).expect("valid image");
        let b = Image::from_values(
            &[4, 3, 2],
            SampleKind::F32,
            &(0..24).map(|i| (i % 5) as f64 + 0.5).collect::<Vec<_>>(),
        )
        .expect("valid image");
        let sum = combine(&a, &b, BinaryOp::Add).expect("same shape");
        let back = combine(&sum, &b, BinaryOp::Subtract).expect("same shape");
        for (got, want) in back.to_f64_vec().iter().zip(&values) {
            assert!((got - want).abs() < EPSILON);
        }
    }

    #[test]
    fn test_copy_into_covers_last_index() {
        let src = Image::from_values(&[3, 2], SampleKind::F64, &[0.4, 1.6, 2.5, 300.0, -3.0, 7.0])
            .expect("valid image");
        let mut dst = Image::new(&[3, 2], SampleKind::U8).expect("valid image");
        copy_into(&mut dst, &src).expect("same shape");
        assert_eq!(dst.to_f64_vec(), vec![0.0, 2.0, 3.0, 255.0, 0.0, 7.0]);
        assert_eq!(last_point(&[3, 2]), vec![2, 1]);
    }
}
