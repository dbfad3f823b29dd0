//! Sample kinds and typed sample storage.
//!
//! Images keep their samples in the narrowest native representation, but all
//! arithmetic happens in `f64`. Conversion happens only at the access boundary:
//! [`SampleBuffer::get`] widens, [`SampleBuffer::set`] narrows.
//!
//! # Narrowing
//! ```text
//! integer kinds: NaN → 0, otherwise round half away from zero, then clamp to [MIN, MAX]
//! f32:           clamp to [-f32::MAX, f32::MAX], then cast (NaN stays NaN)
//! f64:           stored unchanged
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric element kind of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleKind {
    /// 8-bit unsigned integer.
    U8,
    /// 8-bit signed integer.
    I8,
    /// 16-bit unsigned integer.
    U16,
    /// 16-bit signed integer.
    I16,
    /// 32-bit unsigned integer.
    U32,
    /// 32-bit signed integer.
    I32,
    /// 32-bit floating point.
    F32,
    /// 64-bit floating point.
    F64,
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8 => write!(f, "8-bit unsigned"),
            Self::I8 => write!(f, "8-bit signed"),
            Self::U16 => write!(f, "16-bit unsigned"),
            Self::I16 => write!(f, "16-bit signed"),
            Self::U32 => write!(f, "32-bit unsigned"),
            Self::I32 => write!(f, "32-bit signed"),
            Self::F32 => write!(f, "32-bit float"),
            Self::F64 => write!(f, "64-bit float"),
        }
    }
}

impl SampleKind {
    /// Resolve a kind from the `(bits, signed, floating)` triple used by dataset factories.
    ///
    /// Floating kinds are always signed; the `signed` flag is ignored for them.
    pub const fn from_parts(bits: u32, signed: bool, floating: bool) -> Option<Self> {
        match (bits, signed, floating) {
            (32, _, true) => Some(Self::F32),
            (64, _, true) => Some(Self::F64),
            (8, false, false) => Some(Self::U8),
            (8, true, false) => Some(Self::I8),
            (16, false, false) => Some(Self::U16),
            (16, true, false) => Some(Self::I16),
            (32, false, false) => Some(Self::U32),
            (32, true, false) => Some(Self::I32),
            _ => None,
        }
    }

    /// Bits per sample.
    pub const fn bits(self) -> u32 {
        match self {
            Self::U8 | Self::I8 => 8,
            Self::U16 | Self::I16 => 16,
            Self::U32 | Self::I32 | Self::F32 => 32,
            Self::F64 => 64,
        }
    }

    pub const fn is_signed(self) -> bool {
        !matches!(self, Self::U8 | Self::U16 | Self::U32)
    }

    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Smallest and largest representable value, or `None` for floating kinds.
    pub const fn integer_range(self) -> Option<(f64, f64)> {
        match self {
            Self::U8 => Some((u8::MIN as f64, u8::MAX as f64)),
            Self::I8 => Some((i8::MIN as f64, i8::MAX as f64)),
            Self::U16 => Some((u16::MIN as f64, u16::MAX as f64)),
            Self::I16 => Some((i16::MIN as f64, i16::MAX as f64)),
            Self::U32 => Some((u32::MIN as f64, u32::MAX as f64)),
            Self::I32 => Some((i32::MIN as f64, i32::MAX as f64)),
            Self::F32 | Self::F64 => None,
        }
    }

    /// The value a sample of this kind would hold after storing `value`.
    pub fn narrow(self, value: f64) -> f64 {
        match self {
            Self::F64 => value,
            Self::F32 => value.clamp(-f32::MAX as f64, f32::MAX as f64) as f32 as f64,
            _ => match self.integer_range() {
                Some((lo, hi)) => round_clamp(value, lo, hi),
                None => value,
            },
        }
    }
}

fn round_clamp(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.round().clamp(lo, hi)
}

/// Dense sample storage tagged with its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleBuffer {
    U8(Vec<u8>),
    I8(Vec<i8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl SampleBuffer {
    /// Zero-filled storage of `len` samples.
    pub fn zeros(kind: SampleKind, len: usize) -> Self {
        match kind {
            SampleKind::U8 => Self::U8(vec![0; len]),
            SampleKind::I8 => Self::I8(vec![0; len]),
            SampleKind::U16 => Self::U16(vec![0; len]),
            SampleKind::I16 => Self::I16(vec![0; len]),
            SampleKind::U32 => Self::U32(vec![0; len]),
            SampleKind::I32 => Self::I32(vec![0; len]),
            SampleKind::F32 => Self::F32(vec![0.0; len]),
            SampleKind::F64 => Self::F64(vec![0.0; len]),
        }
    }

    pub fn kind(&self) -> SampleKind {
        match self {
            Self::U8(_) => SampleKind::U8,
            Self::I8(_) => SampleKind::I8,
            Self::U16(_) => SampleKind::U16,
            Self::I16(_) => SampleKind::I16,
            Self::U32(_) => SampleKind::U32,
            Self::I32(_) => SampleKind::I32,
            Self::F32(_) => SampleKind::F32,
            Self::F64(_) => SampleKind::F64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::I8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the sample at linear `index`, widened to `f64`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn get(&self, index: usize) -> f64 {
        match self {
            Self::U8(v) => v[index] as f64,
            Self::I8(v) => v[index] as f64,
            Self::U16(v) => v[index] as f64,
            Self::I16(v) => v[index] as f64,
            Self::U32(v) => v[index] as f64,
            Self::I32(v) => v[index] as f64,
            Self::F32(v) => v[index] as f64,
            Self::F64(v) => v[index],
        }
    }

    /// Store `value` at linear `index`, narrowed to the buffer's kind.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn set(&mut self, index: usize, value: f64) {
        let narrowed = self.kind().narrow(value);
        // `narrowed` is already rounded and inside the target range.
        match self {
            Self::U8(v) => v[index] = narrowed as u8,
            Self::I8(v) => v[index] = narrowed as i8,
            Self::U16(v) => v[index] = narrowed as u16,
            Self::I16(v) => v[index] = narrowed as i16,
            Self::U32(v) => v[index] = narrowed as u32,
            Self::I32(v) => v[index] = narrowed as i32,
            Self::F32(v) => v[index] = narrowed as f32,
            Self::F64(v) => v[index] = narrowed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_matches_bits_and_flags() {
        for kind in [
            SampleKind::U8,
            SampleKind::I8,
            SampleKind::U16,
            SampleKind::I16,
            SampleKind::U32,
            SampleKind::I32,
            SampleKind::F32,
            SampleKind::F64,
        ] {
            let resolved = SampleKind::from_parts(kind.bits(), kind.is_signed(), kind.is_float());
            assert_eq!(resolved, Some(kind));
        }
        assert_eq!(SampleKind::from_parts(12, false, false), None);
        assert_eq!(SampleKind::from_parts(16, true, true), None);
    }

    #[test]
    fn test_narrow_clamps_and_rounds_integers() {
        assert_eq!(SampleKind::U8.narrow(300.0), 255.0);
        assert_eq!(SampleKind::U8.narrow(-4.0), 0.0);
        assert_eq!(SampleKind::U8.narrow(29.5), 30.0);
        assert_eq!(SampleKind::I8.narrow(-200.0), -128.0);
        assert_eq!(SampleKind::I16.narrow(-2.5), -3.0);
        assert_eq!(SampleKind::U16.narrow(f64::NAN), 0.0);
    }

    #[test]
    fn test_narrow_float_kinds() {
        assert_eq!(SampleKind::F64.narrow(0.1), 0.1);
        assert_eq!(SampleKind::F32.narrow(0.1), 0.1_f32 as f64);
        assert_eq!(SampleKind::F32.narrow(1e300), f32::MAX as f64);
        assert_eq!(SampleKind::F32.narrow(-1e300), -f32::MAX as f64);

        let mut buf = SampleBuffer::zeros(SampleKind::F32, 1);
        buf.set(0, 1e39);
        assert_eq!(buf.get(0), f32::MAX as f64);
    }

    #[test]
    fn test_buffer_set_then_get_uses_native_kind() {
        let mut buf = SampleBuffer::zeros(SampleKind::U8, 3);
        buf.set(0, 30.2);
        buf.set(1, 1000.0);
        buf.set(2, -1.0);
        assert_eq!(buf.get(0), 30.0);
        assert_eq!(buf.get(1), 255.0);
        assert_eq!(buf.get(2), 0.0);
        assert_eq!(buf.kind(), SampleKind::U8);
        assert_eq!(buf.len(), 3);
    }
}
