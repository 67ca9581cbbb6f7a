pub mod interpolate;

pub use interpolate::{LinearInterpolator, PolyInterpolator};

// ---------------------------------------------------------------------------
// Numeric helpers shared by the aerodynamic and simulation code
// ---------------------------------------------------------------------------

/// Tolerance below which lengths, areas and rates count as zero.
pub const EPSILON: f64 = 1e-8;

#[inline]
pub fn pow2(x: f64) -> f64 {
    x * x
}

#[inline]
pub fn pow3(x: f64) -> f64 {
    x * x * x
}

#[inline]
pub fn pow4(x: f64) -> f64 {
    pow2(pow2(x))
}

/// Square root that returns 0 for (slightly) negative arguments.
#[inline]
pub fn safe_sqrt(x: f64) -> f64 {
    if x <= 0.0 {
        0.0
    } else {
        x.sqrt()
    }
}

/// Sign of `x` with `sign(0) == 0`, unlike `f64::signum`.
#[inline]
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Linear map of `x` from `[a0, a1]` onto `[b0, b1]`.
#[inline]
pub fn map(x: f64, a0: f64, a1: f64, b0: f64, b1: f64) -> f64 {
    (x - a0) / (a1 - a0) * (b1 - b0) + b0
}

/// Replace NaN and infinities by `fallback`.
#[inline]
pub fn finite_or(x: f64, fallback: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        fallback
    }
}
