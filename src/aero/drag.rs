use std::f64::consts::PI;

use crate::error::SimulationError;
use crate::util::{pow2, pow4, PolyInterpolator};
use crate::vehicle::Finish;

// ---------------------------------------------------------------------------
// Closed-form drag terms
// ---------------------------------------------------------------------------

/// Stagnation-pressure drag coefficient of a blunt forward-facing surface.
pub fn stagnation_cd(mach: f64) -> f64 {
    let pressure = if mach <= 1.0 {
        1.0 + pow2(mach) / 4.0 + pow4(mach) / 40.0
    } else {
        1.84 - 0.76 / pow2(mach) + 0.166 / pow4(mach) + 0.035 / pow2(mach * mach * mach)
    };
    0.85 * pressure
}

/// Base drag coefficient of an aft-facing surface.
pub fn base_cd(mach: f64) -> f64 {
    if mach <= 1.0 {
        0.12 + 0.13 * mach * mach
    } else {
        0.25 / mach
    }
}

// ---------------------------------------------------------------------------
// Skin friction
// ---------------------------------------------------------------------------

/// Turbulent flat-plate skin friction coefficient with compressibility
/// correction. Roughness limiting is applied separately per finish.
pub fn skin_friction_cf(mach: f64, reynolds: f64) -> f64 {
    let cf = if reynolds < 1e4 {
        1.48e-2
    } else {
        1.0 / pow2(1.50 * reynolds.ln() - 5.6)
    };

    let c1 = if mach < 1.1 { 1.0 - 0.1 * pow2(mach) } else { 1.0 };
    let c2 = if mach > 0.9 { 1.0 / (1.0 + 0.15 * pow2(mach)).powf(0.58) } else { 1.0 };

    if mach < 0.9 {
        cf * c1
    } else if mach < 1.1 {
        cf * (c2 * (mach - 0.9) / 0.2 + c1 * (1.1 - mach) / 0.2)
    } else {
        cf * c2
    }
}

/// Compressibility correction of the roughness-limited friction coefficient.
pub fn roughness_correction(mach: f64) -> f64 {
    if mach < 0.9 {
        1.0 - 0.1 * pow2(mach)
    } else if mach > 1.1 {
        1.0 / (1.0 + 0.18 * pow2(mach))
    } else {
        let c1 = 1.0 - 0.1 * pow2(0.9);
        let c2 = 1.0 / (1.0 + 0.18 * pow2(1.1));
        c2 * (mach - 0.9) / 0.2 + c1 * (1.1 - mach) / 0.2
    }
}

/// Lower bound on the friction coefficient set by surface roughness.
pub fn roughness_limited_cf(finish: Finish, aero_length: f64, correction: f64) -> f64 {
    if aero_length <= 0.0 {
        return 0.0;
    }
    0.032 * (finish.roughness() / aero_length).powf(0.2) * correction
}

// ---------------------------------------------------------------------------
// Total → axial drag
// ---------------------------------------------------------------------------

const AXIAL_KNEE: f64 = 17.0 * PI / 180.0;

/// Converts total drag to drag along the rocket axis. The multiplier rises
/// from 1 at zero AOA to 1.3 at 17° and falls to 0 at 90° with zero slope
/// and curvature there; beyond 90° it changes sign.
#[derive(Debug, Clone)]
pub struct AxialDrag {
    low: Vec<f64>,
    high: Vec<f64>,
}

impl AxialDrag {
    pub fn new() -> Result<Self, SimulationError> {
        let singular =
            || SimulationError::InternalConsistency("axial drag polynomial is singular".into());
        let low = PolyInterpolator::new(&[&[0.0, AXIAL_KNEE], &[0.0, AXIAL_KNEE]])
            .ok_or_else(singular)?
            .interpolator(&[1.0, 1.3, 0.0, 0.0]);
        let high = PolyInterpolator::new(&[
            &[AXIAL_KNEE, PI / 2.0],
            &[AXIAL_KNEE, PI / 2.0],
            &[PI / 2.0],
        ])
        .ok_or_else(singular)?
        .interpolator(&[1.3, 0.0, 0.0, 0.0, 0.0]);
        Ok(Self { low, high })
    }

    pub fn multiplier(&self, aoa: f64) -> f64 {
        let aoa = aoa.clamp(0.0, PI);
        let folded = if aoa > PI / 2.0 { PI - aoa } else { aoa };
        let mul = if folded < AXIAL_KNEE {
            PolyInterpolator::eval(folded, &self.low)
        } else {
            PolyInterpolator::eval(folded, &self.high)
        };
        if aoa < PI / 2.0 {
            mul
        } else {
            -mul
        }
    }

    pub fn axial_cd(&self, aoa: f64, cd: f64) -> f64 {
        self.multiplier(aoa) * cd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn stagnation_is_continuous_at_mach_one() {
        assert_relative_eq!(stagnation_cd(0.0), 0.85);
        let below = stagnation_cd(1.0);
        let above = stagnation_cd(1.0 + 1e-9);
        assert_relative_eq!(below, above, epsilon = 1e-6);
    }

    #[test]
    fn base_drag_values() {
        assert_relative_eq!(base_cd(0.0), 0.12);
        assert_relative_eq!(base_cd(1.0), 0.25);
        assert_relative_eq!(base_cd(2.0), 0.125);
    }

    #[test]
    fn friction_decreases_with_reynolds() {
        let low = skin_friction_cf(0.3, 1e5);
        let high = skin_friction_cf(0.3, 1e7);
        assert!(high < low);
        assert_relative_eq!(skin_friction_cf(0.0, 100.0), 1.48e-2);
    }

    #[test]
    fn friction_blend_is_continuous() {
        let re = 1e6;
        assert_relative_eq!(skin_friction_cf(0.9 - 1e-9, re), skin_friction_cf(0.9, re), epsilon = 1e-9);
        assert_relative_eq!(skin_friction_cf(1.1 - 1e-9, re), skin_friction_cf(1.1, re), epsilon = 1e-9);
    }

    #[test]
    fn mirror_finish_has_no_roughness_floor() {
        assert_eq!(roughness_limited_cf(Finish::Mirror, 1.0, 1.0), 0.0);
        assert!(roughness_limited_cf(Finish::Rough, 1.0, 1.0) > roughness_limited_cf(Finish::Smooth, 1.0, 1.0));
    }

    #[test]
    fn axial_multiplier_shape() {
        let axial = AxialDrag::new().unwrap();
        assert_relative_eq!(axial.multiplier(0.0), 1.0, epsilon = 1e-9);
        assert_relative_eq!(axial.multiplier(AXIAL_KNEE), 1.3, epsilon = 1e-9);
        assert_relative_eq!(axial.multiplier(PI / 2.0 - 1e-12), 0.0, epsilon = 1e-6);
        assert!(axial.multiplier(PI - 0.1) < 0.0);
        assert_relative_eq!(axial.multiplier(PI - 0.1), -axial.multiplier(0.1), epsilon = 1e-12);
    }
}
