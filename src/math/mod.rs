//! Special-function kernels consumed by the interpreter.
//!
//! Everything here is generic over [`MathScalar`] and total unless noted;
//! domain checks that map to evaluation error codes (non-positive Bessel Y
//! arguments, gamma poles) live with the interpreter, which owns the error
//! channel. Gamma keeps its pole check locally because the reflection
//! formula needs it anyway.
//!
//! The Bessel and complementary-error-function kernels are rational
//! approximations in the Numerical Recipes family; accuracy is in the
//! 1e-7..1e-8 relative range, which is what plotting-oriented callers of
//! this engine need.

use crate::traits::MathScalar;

/// Lift an `f64` coefficient into the working scalar type.
#[inline]
fn lift<T: MathScalar>(v: f64) -> T {
    T::from_f64(v).unwrap_or_else(T::nan)
}

/// Evaluate `c[0] + y*(c[1] + y*(c[2] + ...))` by Horner's rule.
#[inline]
fn poly<T: MathScalar>(c: &[f64], y: T) -> T {
    let mut acc = T::zero();
    for &ci in c.iter().rev() {
        acc = acc * y + lift(ci);
    }
    acc
}

// =============================================================================
// Error function family
// =============================================================================

/// Chebyshev fit for `exp(x^2) * erfc(x)`, valid for `x >= 0`.
///
/// Keeping the `exp(x^2)` factor out of the fit means the scaled variant
/// never multiplies a huge exponential against a vanishing tail.
fn erfc_scaled_nonneg<T: MathScalar>(x: T) -> T {
    let t = T::one() / (T::one() + lift::<T>(0.5) * x);
    let fit = poly(
        &[
            -1.26551223,
            1.00002368,
            0.37409196,
            0.09678418,
            -0.18628806,
            0.27886807,
            -1.13520398,
            1.48851587,
            -0.82215223,
            0.17087277,
        ],
        t,
    );
    t * fit.exp()
}

/// Complementary error function `erfc(x) = 1 - erf(x)`.
pub fn erfc<T: MathScalar>(x: T) -> T {
    let ax = x.abs();
    let ans = erfc_scaled_nonneg(ax) * (-x * x).exp();
    if x >= T::zero() {
        ans
    } else {
        lift::<T>(2.0) - ans
    }
}

/// Error function.
pub fn erf<T: MathScalar>(x: T) -> T {
    T::one() - erfc(x)
}

/// Scaled complementary error function `exp(x^2) * erfc(x)`.
///
/// For large positive `x` this decays like `1/(x*sqrt(pi))` where the
/// unscaled `erfc` underflows; for very negative `x` it grows like
/// `2*exp(x^2)` and overflows to infinity, which is the correct limit.
pub fn erfc_scaled<T: MathScalar>(x: T) -> T {
    if x >= T::zero() {
        erfc_scaled_nonneg(x)
    } else {
        lift::<T>(2.0) * (x * x).exp() - erfc_scaled_nonneg(-x)
    }
}

// =============================================================================
// Gamma function
// =============================================================================

/// Gamma function via the Lanczos approximation (g = 7, 9 terms).
///
/// Returns `None` at the poles (non-positive integers). Arguments below
/// one half go through the reflection formula.
pub fn gamma<T: MathScalar>(x: T) -> Option<T> {
    if x <= T::zero() && x.fract() == T::zero() {
        return None;
    }

    const LANCZOS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];

    let half = lift::<T>(0.5);
    let pi = T::PI();

    if x < half {
        // Gamma(x) * Gamma(1-x) = pi / sin(pi x)
        return Some(pi / ((pi * x).sin() * gamma(T::one() - x)?));
    }

    let x = x - T::one();
    let mut acc = lift::<T>(LANCZOS[0]);
    for (i, &c) in LANCZOS.iter().enumerate().skip(1) {
        acc = acc + lift::<T>(c) / (x + lift(i as f64));
    }
    let t = x + lift::<T>(7.5);
    let sqrt_two_pi = (lift::<T>(2.0) * pi).sqrt();
    Some(sqrt_two_pi * t.powf(x + half) * (-t).exp() * acc)
}

// =============================================================================
// Bessel functions of the first and second kind, orders 0 and 1
// =============================================================================

const BESSEL_ASYMPTOTIC_CUTOFF: f64 = 8.0;

/// Bessel function of the first kind, order 0.
pub fn besj0<T: MathScalar>(x: T) -> T {
    let ax = x.abs();
    let cutoff = lift::<T>(BESSEL_ASYMPTOTIC_CUTOFF);

    if ax < cutoff {
        let y = x * x;
        let num = poly(
            &[
                57_568_490_574.0,
                -13_362_590_354.0,
                651_619_640.7,
                -11_214_424.18,
                77_392.330_17,
                -184.905_245_6,
            ],
            y,
        );
        let den = poly(
            &[
                57_568_490_411.0,
                1_029_532_985.0,
                9_494_680.718,
                59_272.648_53,
                267.853_271_2,
                1.0,
            ],
            y,
        );
        num / den
    } else {
        let z = cutoff / ax;
        let y = z * z;
        let xx = ax - lift::<T>(0.785_398_164);
        let p = poly(
            &[
                1.0,
                -0.109_862_862_7e-2,
                0.273_451_040_7e-4,
                -0.207_337_063_9e-5,
                0.209_388_721_1e-6,
            ],
            y,
        );
        let q = poly(
            &[
                -0.156_249_999_5e-1,
                0.143_048_876_5e-3,
                -0.691_114_765_1e-5,
                0.762_109_516_1e-6,
                -0.934_935_152e-7,
            ],
            y,
        );
        (T::FRAC_2_PI() / ax).sqrt() * (xx.cos() * p - z * xx.sin() * q)
    }
}

/// Bessel function of the first kind, order 1.
pub fn besj1<T: MathScalar>(x: T) -> T {
    let ax = x.abs();
    let cutoff = lift::<T>(BESSEL_ASYMPTOTIC_CUTOFF);

    if ax < cutoff {
        let y = x * x;
        let num = poly(
            &[
                72_362_614_232.0,
                -7_895_059_235.0,
                242_396_853.1,
                -2_972_611.439,
                15_704.482_6,
                -30.160_366_06,
            ],
            y,
        );
        let den = poly(
            &[
                144_725_228_442.0,
                2_300_535_178.0,
                18_583_304.74,
                99_447.433_94,
                376.999_139_7,
                1.0,
            ],
            y,
        );
        x * (num / den)
    } else {
        let z = cutoff / ax;
        let y = z * z;
        let xx = ax - lift::<T>(2.356_194_491);
        let p = poly(
            &[
                1.0,
                0.183_105e-2,
                -0.351_639_649_6e-4,
                0.245_752_017_4e-5,
                -0.240_337_019e-6,
            ],
            y,
        );
        let q = poly(
            &[
                0.046_874_999_95,
                -0.200_269_087_3e-3,
                0.844_919_909_6e-5,
                -0.882_289_87e-6,
                0.105_787_412e-6,
            ],
            y,
        );
        let ans = (T::FRAC_2_PI() / ax).sqrt() * (xx.cos() * p - z * xx.sin() * q);
        if x < T::zero() { -ans } else { ans }
    }
}

/// Bessel function of the second kind, order 0.
///
/// Defined for `x > 0`; the interpreter rejects non-positive arguments
/// before calling, so a negative argument here just propagates the NaN
/// from `ln`.
pub fn besy0<T: MathScalar>(x: T) -> T {
    let cutoff = lift::<T>(BESSEL_ASYMPTOTIC_CUTOFF);

    if x < cutoff {
        let y = x * x;
        let num = poly(
            &[
                -2_957_821_389.0,
                7_062_834_065.0,
                -512_359_803.6,
                10_879_881.29,
                -86_327.927_57,
                228.462_273_3,
            ],
            y,
        );
        let den = poly(
            &[
                40_076_544_269.0,
                745_249_964.8,
                7_189_466.438,
                47_447.264_7,
                226.103_024_4,
                1.0,
            ],
            y,
        );
        num / den + T::FRAC_2_PI() * besj0(x) * x.ln()
    } else {
        let z = cutoff / x;
        let y = z * z;
        let xx = x - lift::<T>(0.785_398_164);
        let p = poly(
            &[
                1.0,
                -0.109_862_862_7e-2,
                0.273_451_040_7e-4,
                -0.207_337_063_9e-5,
                0.209_388_721_1e-6,
            ],
            y,
        );
        let q = poly(
            &[
                -0.156_249_999_5e-1,
                0.143_048_876_5e-3,
                -0.691_114_765_1e-5,
                0.762_109_516_1e-6,
                -0.934_935_152e-7,
            ],
            y,
        );
        (T::FRAC_2_PI() / x).sqrt() * (xx.sin() * p + z * xx.cos() * q)
    }
}

/// Bessel function of the second kind, order 1.
///
/// Same domain contract as [`besy0`].
pub fn besy1<T: MathScalar>(x: T) -> T {
    let cutoff = lift::<T>(BESSEL_ASYMPTOTIC_CUTOFF);

    if x < cutoff {
        let y = x * x;
        let num = poly(
            &[
                -0.490_060_494_3e13,
                0.127_527_439e13,
                -0.515_343_813_9e11,
                0.734_926_455_1e9,
                -0.423_792_272_6e7,
                0.851_193_793_5e4,
            ],
            y,
        );
        let den = poly(
            &[
                0.249_958_057e14,
                0.424_441_966_4e12,
                0.373_365_036_7e10,
                0.224_590_400_2e8,
                0.102_042_605e6,
                0.354_963_288_5e3,
                1.0,
            ],
            y,
        );
        x * (num / den) + T::FRAC_2_PI() * (besj1(x) * x.ln() - T::one() / x)
    } else {
        let z = cutoff / x;
        let y = z * z;
        let xx = x - lift::<T>(2.356_194_491);
        let p = poly(
            &[
                1.0,
                0.183_105e-2,
                -0.351_639_649_6e-4,
                0.245_752_017_4e-5,
                -0.240_337_019e-6,
            ],
            y,
        );
        let q = poly(
            &[
                0.046_874_999_95,
                -0.200_269_087_3e-3,
                0.844_919_909_6e-5,
                -0.882_289_87e-6,
                0.105_787_412e-6,
            ],
            y,
        );
        (T::FRAC_2_PI() / x).sqrt() * (xx.sin() * p + z * xx.cos() * q)
    }
}
