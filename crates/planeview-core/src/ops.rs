//! Pixel-wise binary operators.
//!
//! Every operator maps two `f64` samples to one `f64` sample and is total:
//! none of them fails or produces a fault for any input.
//!
//! ```text
//! Add              a + b
//! Subtract         a − b
//! Multiply         a × b
//! Divide           a / b, or 0 when b == 0
//! AND / OR / XOR   bitwise on round(a), round(b) as i64
//! Min / Max        min(a, b) / max(a, b)
//! Average          (a + b) / 2
//! Difference       |a − b|
//! Copy             b
//! Transparent-zero b, or a when b == 0
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PlaneviewError, Result};

/// Signature shared by all operators.
pub type BinaryFn = fn(f64, f64) -> f64;

/// The closed set of image calculator operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
    #[serde(rename = "XOR")]
    Xor,
    Min,
    Max,
    Average,
    Difference,
    Copy,
    #[serde(rename = "Transparent-zero")]
    TransparentZero,
}

impl BinaryOp {
    /// All operations, in menu order.
    pub const ALL: [BinaryOp; 13] = [
        BinaryOp::Add,
        BinaryOp::Subtract,
        BinaryOp::Multiply,
        BinaryOp::Divide,
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Xor,
        BinaryOp::Min,
        BinaryOp::Max,
        BinaryOp::Average,
        BinaryOp::Difference,
        BinaryOp::Copy,
        BinaryOp::TransparentZero,
    ];

    /// Stable display name, as offered to users.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Subtract => "Subtract",
            Self::Multiply => "Multiply",
            Self::Divide => "Divide",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
            Self::Min => "Min",
            Self::Max => "Max",
            Self::Average => "Average",
            Self::Difference => "Difference",
            Self::Copy => "Copy",
            Self::TransparentZero => "Transparent-zero",
        }
    }

    /// Resolve an operation by its display name.
    pub fn lookup(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == name)
            .ok_or_else(|| PlaneviewError::UnknownOperator(name.to_string()))
    }

    /// The function implementing this operation.
    pub fn function(self) -> BinaryFn {
        match self {
            Self::Add => add,
            Self::Subtract => subtract,
            Self::Multiply => multiply,
            Self::Divide => divide,
            Self::And => and,
            Self::Or => or,
            Self::Xor => xor,
            Self::Min => f64::min,
            Self::Max => f64::max,
            Self::Average => average,
            Self::Difference => difference,
            Self::Copy => copy_right,
            Self::TransparentZero => copy_zero_transparent,
        }
    }

    #[inline]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        (self.function())(a, b)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BinaryOp {
    type Err = PlaneviewError;

    fn from_str(s: &str) -> Result<Self> {
        Self::lookup(s)
    }
}

fn add(a: f64, b: f64) -> f64 {
    a + b
}

fn subtract(a: f64, b: f64) -> f64 {
    a - b
}

fn multiply(a: f64, b: f64) -> f64 {
    a * b
}

fn divide(a: f64, b: f64) -> f64 {
    if b == 0.0 { 0.0 } else { a / b }
}

/// Integer view used by the bitwise operators. Saturates; NaN becomes 0.
fn to_bits(v: f64) -> i64 {
    v.round() as i64
}

fn and(a: f64, b: f64) -> f64 {
    (to_bits(a) & to_bits(b)) as f64
}

fn or(a: f64, b: f64) -> f64 {
    (to_bits(a) | to_bits(b)) as f64
}

fn xor(a: f64, b: f64) -> f64 {
    (to_bits(a) ^ to_bits(b)) as f64
}

fn average(a: f64, b: f64) -> f64 {
    (a + b) / 2.0
}

fn difference(a: f64, b: f64) -> f64 {
    (a - b).abs()
}

fn copy_right(_a: f64, b: f64) -> f64 {
    b
}

fn copy_zero_transparent(a: f64, b: f64) -> f64 {
    if b == 0.0 { a } else { b }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    const SAMPLES: [f64; 7] = [0.0, 1.0, -1.0, 3.5, 255.0, -1e9, 1e-9];

    #[test]
    fn test_lookup_every_name() {
        for op in BinaryOp::ALL {
            assert_eq!(BinaryOp::lookup(op.name()).expect("known name"), op);
            assert_eq!(op.name().parse::<BinaryOp>().expect("known name"), op);
        }
    }

    #[test]
    fn test_lookup_unknown_name_fails() {
        for name in ["add", "Modulo", "", "Transparent-Zero", " Add"] {
            let err = BinaryOp::lookup(name).unwrap_err();
            assert!(matches!(err, PlaneviewError::UnknownOperator(ref n) if n == name));
        }
    }

    #[test]
    fn test_divide_by_zero_is_zero() {
        for a in SAMPLES {
            let v = BinaryOp::Divide.apply(a, 0.0);
            assert_eq!(v, 0.0, "Divide({a}, 0)");
            assert!(v.is_finite());
        }
        assert!((BinaryOp::Divide.apply(7.0, 2.0) - 3.5).abs() < EPSILON);
    }

    #[test]
    fn test_copy_returns_right_operand() {
        for a in SAMPLES {
            for b in SAMPLES {
                assert_eq!(BinaryOp::Copy.apply(a, b), b);
            }
        }
    }

    #[test]
    fn test_transparent_zero() {
        for a in SAMPLES {
            assert_eq!(BinaryOp::TransparentZero.apply(a, 0.0), a);
            for b in SAMPLES.into_iter().filter(|&b| b != 0.0) {
                assert_eq!(BinaryOp::TransparentZero.apply(a, b), b);
            }
        }
    }

    #[test]
    fn test_bitwise_ops_round_operands() {
        assert_eq!(BinaryOp::And.apply(12.0, 10.0), 8.0);
        assert_eq!(BinaryOp::Or.apply(12.0, 10.0), 14.0);
        assert_eq!(BinaryOp::Xor.apply(12.0, 10.0), 6.0);
        // 5.6 rounds to 6, 2.4 rounds to 2.
        assert_eq!(BinaryOp::And.apply(5.6, 2.4), 2.0);
        assert_eq!(BinaryOp::Xor.apply(-1.0, 0.0), -1.0);
    }

    #[test]
    fn test_arithmetic_ops() {
        assert_eq!(BinaryOp::Add.apply(2.0, 3.0), 5.0);
        assert_eq!(BinaryOp::Subtract.apply(2.0, 3.0), -1.0);
        assert_eq!(BinaryOp::Multiply.apply(10.0, 3.0), 30.0);
        assert_eq!(BinaryOp::Min.apply(2.0, 3.0), 2.0);
        assert_eq!(BinaryOp::Max.apply(2.0, 3.0), 3.0);
        assert_eq!(BinaryOp::Average.apply(2.0, 3.0), 2.5);
        assert_eq!(BinaryOp::Difference.apply(2.0, 3.0), 1.0);
        assert_eq!(BinaryOp::Difference.apply(3.0, 2.0), 1.0);
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&BinaryOp::TransparentZero).expect("serialize");
        assert_eq!(json, "\"Transparent-zero\"");
        let op: BinaryOp = serde_json::from_str("\"XOR\"").expect("deserialize");
        assert_eq!(op, BinaryOp::Xor);
    }
}
