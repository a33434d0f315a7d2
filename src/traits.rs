use num_traits::{Float, FloatConst, FromPrimitive};
use std::fmt::Debug;

/// Scalar type usable by the special-function implementations in
/// [`crate::math`].
///
/// Aggregates `num_traits::Float` (sqrt, exp, trig, ...), `FloatConst`
/// (PI, FRAC_2_PI) and `FromPrimitive` for lifting polynomial
/// coefficients. The engine itself evaluates `f64`; the bound keeps the
/// numeric kernels independent of that choice.
pub trait MathScalar: Float + FloatConst + FromPrimitive + Debug + 'static {}

impl<T> MathScalar for T where T: Float + FloatConst + FromPrimitive + Debug + 'static {}
