//! Floating-point precision of numerical computations.

use std::fmt;

use duplicate::duplicate_item;
use ndarray::{LinalgScalar, ScalarOperand};
use num_traits::{Float, FloatConst};
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "precision_tests.rs"]
mod precision_tests;

// ================
// Enum definitions
// ================

/// An enumerated type for the floating-point precisions supported by this crate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Precision {
    /// Single precision (32-bit floats).
    Single,

    /// Double precision (64-bit floats). This is the default for every correctness-critical
    /// computation.
    #[default]
    Double,
}

impl Precision {
    /// Returns the precision associated with a floating-point type.
    #[must_use]
    pub fn of<T: So3Float>() -> Self {
        T::PRECISION
    }

    /// Returns a comparison threshold suited to the precision.
    #[must_use]
    pub fn default_threshold(&self) -> f64 {
        match self {
            Precision::Single => 1e-5,
            Precision::Double => 1e-12,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Single => write!(f, "single"),
            Precision::Double => write!(f, "double"),
        }
    }
}

// ================
// Trait definitions
// ================

/// Trait for floating-point element types in which representation matrices, spherical
/// harmonics and rotations can be computed.
///
/// Selecting the type parameter of an entry point selects the precision of all intermediate
/// arithmetic in that call.
pub trait So3Float:
    Float
    + FloatConst
    + LinalgScalar
    + ScalarOperand
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + 'static
{
    /// The precision of this type.
    const PRECISION: Precision;

    /// Converts a double-precision value into this type, rounding if necessary.
    fn from_f64_lossy(x: f64) -> Self;

    /// Converts this value into double precision.
    fn into_f64(self) -> f64;

    /// Converts a small integer into this type.
    fn from_i64_lossy(n: i64) -> Self {
        Self::from_f64_lossy(n as f64)
    }
}

#[duplicate_item(
    [
        dtype_ [ f32 ]
        precision_ [ Precision::Single ]
    ]
    [
        dtype_ [ f64 ]
        precision_ [ Precision::Double ]
    ]
)]
impl So3Float for dtype_ {
    const PRECISION: Precision = precision_;

    fn from_f64_lossy(x: f64) -> Self {
        x as dtype_
    }

    fn into_f64(self) -> f64 {
        f64::from(self)
    }
}
