use std::f64::consts::PI;

use crate::util::{pow2, safe_sqrt};

// ---------------------------------------------------------------------------
// Nose cone / transition profile shapes
// ---------------------------------------------------------------------------

/// Profile of a nose cone or transition. Each shape is parametrised by a
/// shape parameter whose meaning depends on the shape (ignored where unused).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionShape {
    Conical,
    /// Parameter 1.0 is a tangent ogive, 0.0 degenerates to a cone.
    Ogive,
    Ellipsoid,
    /// `r = R (x/L)^k` with k the parameter.
    Power,
    /// Parameter 0 is a cone, 1 is a full parabola.
    Parabolic,
    /// Parameter 0 is LD-Haack (Von Kármán), 1/3 is LV-Haack.
    Haack,
}

impl TransitionShape {
    /// Radius of a nose of base `radius` and `length` at distance `x` from
    /// the tip.
    pub fn radius(self, x: f64, radius: f64, length: f64, param: f64) -> f64 {
        if length <= 0.0 {
            return radius;
        }
        let x = x.clamp(0.0, length);
        match self {
            TransitionShape::Conical => radius * x / length,
            TransitionShape::Ogive => {
                if param < 0.001 {
                    return TransitionShape::Conical.radius(x, radius, length, param);
                }
                // radius of the generating circle
                let big_r = safe_sqrt(
                    (pow2(length) + pow2(radius))
                        * (pow2((2.0 - param) * length) + pow2(param * radius))
                        / (4.0 * pow2(param * radius)),
                );
                let l = length / param;
                let y0 = safe_sqrt(big_r * big_r - l * l);
                safe_sqrt(big_r * big_r - pow2(l - x)) - y0
            }
            TransitionShape::Ellipsoid => {
                let x = x * radius / length;
                safe_sqrt(2.0 * radius * x - x * x)
            }
            TransitionShape::Power => {
                if param <= 0.00001 {
                    if x <= 0.00001 {
                        0.0
                    } else {
                        radius
                    }
                } else {
                    radius * (x / length).powf(param)
                }
            }
            TransitionShape::Parabolic => {
                let xl = x / length;
                radius * (2.0 * xl - param * xl * xl) / (2.0 - param)
            }
            TransitionShape::Haack => {
                let theta = (1.0 - 2.0 * x / length).clamp(-1.0, 1.0).acos();
                let base = theta - (2.0 * theta).sin() / 2.0;
                if param == 0.0 {
                    radius * safe_sqrt(base / PI)
                } else {
                    radius * safe_sqrt((base + param * theta.sin().powi(3)) / PI)
                }
            }
        }
    }
}
