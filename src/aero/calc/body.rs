use std::f64::consts::PI;
use std::sync::LazyLock;

use crate::aero::conditions::FlightConditions;
use crate::aero::drag::stagnation_cd;
use crate::aero::forces::{AerodynamicForces, WeightedPoint};
use crate::aero::geometry::BodyGeometry;
use crate::aero::warning::{Warning, WarningSet};
use crate::error::SimulationError;
use crate::physics::atmosphere::GAMMA;
use crate::util::{pow2, safe_sqrt, LinearInterpolator, PolyInterpolator, EPSILON};
use crate::vehicle::TransitionShape;

use super::AerodynamicCalc;

/// Galejs body-lift constant.
pub const BODY_LIFT_K: f64 = 1.1;

/// Below this Mach number, at AOA above `LIFT_DAMP_AOA`, body lift is faded
/// out quadratically to keep the CP from oscillating while turning over at
/// apogee.
pub const LIFT_DAMP_MACH: f64 = 0.05;
pub const LIFT_DAMP_AOA: f64 = PI / 4.0;

// ---------------------------------------------------------------------------
// Nose pressure drag tables (fineness ratio 3, NASA TR-R-100)
// ---------------------------------------------------------------------------

struct NoseTables {
    ellipsoid: LinearInterpolator,
    x14: LinearInterpolator,
    x12: LinearInterpolator,
    x34: LinearInterpolator,
    von_karman: LinearInterpolator,
    lv_haack: LinearInterpolator,
    parabolic: LinearInterpolator,
    parabolic12: LinearInterpolator,
    parabolic34: LinearInterpolator,
    blunt: LinearInterpolator,
}

static NOSE_TABLES: LazyLock<NoseTables> = LazyLock::new(|| {
    let table = LinearInterpolator::from_points;
    let mut blunt = LinearInterpolator::new();
    for i in 0..60 {
        let m = i as f64 * 0.05;
        blunt.add_point(m, stagnation_cd(m));
    }
    NoseTables {
        ellipsoid: table(
            &[1.2, 1.25, 1.3, 1.4, 1.6, 2.0, 2.4],
            &[0.110, 0.128, 0.140, 0.148, 0.152, 0.159, 0.162],
        ),
        x14: table(
            &[1.2, 1.3, 1.4, 1.6, 1.8, 2.2, 2.6, 3.0, 3.6],
            &[0.140, 0.156, 0.169, 0.192, 0.206, 0.227, 0.241, 0.249, 0.252],
        ),
        x12: table(
            &[0.925, 0.95, 1.0, 1.05, 1.1, 1.2, 1.3, 1.7, 2.0],
            &[0.0, 0.014, 0.050, 0.060, 0.059, 0.081, 0.084, 0.085, 0.078],
        ),
        x34: table(
            &[0.8, 0.9, 1.0, 1.06, 1.2, 1.4, 1.6, 2.0, 2.8, 3.4],
            &[0.0, 0.015, 0.078, 0.121, 0.110, 0.098, 0.090, 0.084, 0.078, 0.074],
        ),
        von_karman: table(
            &[0.9, 0.95, 1.0, 1.05, 1.1, 1.2, 1.4, 1.6, 2.0, 3.0],
            &[0.0, 0.010, 0.027, 0.055, 0.070, 0.081, 0.095, 0.097, 0.091, 0.083],
        ),
        lv_haack: table(
            &[0.9, 0.95, 1.0, 1.05, 1.1, 1.2, 1.4, 1.6, 2.0],
            &[0.0, 0.010, 0.024, 0.066, 0.084, 0.100, 0.114, 0.117, 0.113],
        ),
        parabolic: table(
            &[0.95, 0.975, 1.0, 1.05, 1.1, 1.2, 1.4, 1.7],
            &[0.0, 0.016, 0.041, 0.092, 0.109, 0.119, 0.113, 0.108],
        ),
        parabolic12: table(
            &[0.8, 0.9, 0.95, 1.0, 1.05, 1.1, 1.3, 1.5, 1.8],
            &[0.0, 0.016, 0.042, 0.100, 0.126, 0.125, 0.100, 0.090, 0.088],
        ),
        parabolic34: table(
            &[0.9, 0.95, 1.0, 1.05, 1.1, 1.2, 1.4, 1.7],
            &[0.0, 0.023, 0.073, 0.098, 0.107, 0.106, 0.089, 0.082],
        ),
        blunt,
    }
});

/// Transonic/supersonic pressure drag of a conical or ogive nose: a cubic
/// between Mach 1 and 1.3, the slender-cone formula above.
fn ogive_drag(param: f64, sin_phi: f64) -> Result<LinearInterpolator, SimulationError> {
    let cubic = PolyInterpolator::new(&[&[1.0, 1.3], &[1.0, 1.3]]).ok_or_else(|| {
        SimulationError::InternalConsistency("ogive drag polynomial is singular".into())
    })?;
    let cd_mach1 = 2.1 * pow2(sin_phi) + 0.6019 * sin_phi;
    let poly = cubic.interpolator(&[
        sin_phi,
        cd_mach1,
        4.0 / (GAMMA + 1.0) * (1.0 - 0.5 * cd_mach1),
        -1.1341 * sin_phi,
    ]);
    let mul = 0.72 * pow2(param - 0.5) + 0.82;

    let mut interp = LinearInterpolator::new();
    for i in 0..=15 {
        let m = 1.0 + i as f64 * 0.02;
        interp.add_point(m, mul * PolyInterpolator::eval(m, &poly));
    }
    let mut m: f64 = 1.32;
    while m < 4.0 {
        interp.add_point(m, mul * (2.1 * pow2(sin_phi) + 0.5 * sin_phi / safe_sqrt(m * m - 1.0)));
        m += 0.02;
    }
    Ok(interp)
}

/// Pressure drag of a nose cone or shoulder versus Mach number, referenced
/// to its own frontal area.
fn nose_drag(
    shape: TransitionShape,
    param: f64,
    fineness: f64,
    sin_phi: f64,
) -> Result<LinearInterpolator, SimulationError> {
    let tables = &*NOSE_TABLES;
    let cone_sin_phi = 1.0 / safe_sqrt(1.0 + 4.0 * pow2(fineness));

    // fineness-3 table for the shape, blended between bounding tables
    let (int1, int2, p) = match shape {
        TransitionShape::Conical => return finish_nose(ogive_drag(0.0, sin_phi)?, sin_phi),
        TransitionShape::Ogive => return finish_nose(ogive_drag(param, sin_phi)?, sin_phi),
        TransitionShape::Ellipsoid => (tables.ellipsoid.clone(), None, 0.0),
        TransitionShape::Power => {
            if param <= 0.25 {
                (tables.blunt.clone(), Some(tables.x14.clone()), param * 4.0)
            } else if param <= 0.5 {
                (tables.x14.clone(), Some(tables.x12.clone()), (param - 0.25) * 4.0)
            } else if param <= 0.75 {
                (tables.x12.clone(), Some(tables.x34.clone()), (param - 0.5) * 4.0)
            } else {
                (tables.x34.clone(), Some(ogive_drag(0.0, cone_sin_phi)?), (param - 0.75) * 4.0)
            }
        }
        TransitionShape::Parabolic => {
            if param <= 0.5 {
                (ogive_drag(0.0, cone_sin_phi)?, Some(tables.parabolic12.clone()), param * 2.0)
            } else if param <= 0.75 {
                (tables.parabolic12.clone(), Some(tables.parabolic34.clone()), (param - 0.5) * 4.0)
            } else {
                (tables.parabolic34.clone(), Some(tables.parabolic.clone()), (param - 0.75) * 4.0)
            }
        }
        TransitionShape::Haack => {
            (tables.von_karman.clone(), Some(tables.lv_haack.clone()), param * 3.0)
        }
    };

    if !(0.0..=1.00001).contains(&p) {
        return Err(SimulationError::UnsupportedConfiguration(format!(
            "{:?} shape parameter {} is outside the tabulated range",
            shape, param
        )));
    }

    let base = match int2 {
        Some(int2) => {
            let mut blend = LinearInterpolator::new();
            for m in int1.x_points().chain(int2.x_points()) {
                blend.add_point(m, p * int2.value(m) + (1.0 - p) * int1.value(m));
            }
            blend
        }
        None => int1,
    };

    // power-law extrapolation from fineness 3 toward the blunt body
    let log4 = (fineness + 1.0).ln() / 4.0_f64.ln();
    let mut interp = LinearInterpolator::new();
    for m in base.x_points() {
        let stag = tables.blunt.value(m);
        interp.add_point(m, stag * (base.value(m) / stag).powf(log4));
    }
    finish_nose(interp, sin_phi)
}

/// Fill the subsonic range with `Cd = a·M^b + Cd(M=0)` when the transonic
/// data starts above zero.
fn finish_nose(
    mut interp: LinearInterpolator,
    sin_phi: f64,
) -> Result<LinearInterpolator, SimulationError> {
    let Some(min) = interp.first_x() else {
        return Err(SimulationError::InternalConsistency("empty nose drag table".into()));
    };
    let min_value = interp.value(min);
    if min_value < 0.001 {
        return Ok(interp);
    }

    let cd_mach0 = 0.8 * pow2(sin_phi);
    let min_deriv = (interp.value(min + 0.01) - min_value) / 0.01;
    if cd_mach0 >= min_value - 0.01 || min_deriv <= 0.01 {
        return Ok(interp);
    }

    let a = min_value - cd_mach0;
    let b = min_deriv / a;
    let mut m = 0.0;
    while m < min {
        interp.add_point(m, a * m.powf(b) + cd_mach0);
        m += 0.05;
    }
    Ok(interp)
}

// ---------------------------------------------------------------------------
// Symmetric body calculator
// ---------------------------------------------------------------------------

/// Barrowman/Galejs calculator of a nose cone, transition or body tube.
#[derive(Debug, Clone)]
pub struct BodyCalc {
    geom: BodyGeometry,
    /// Barrowman CNa (before sinc and reference area) and its CP; zero for tubes.
    cna0: f64,
    cp0: f64,
    nose_drag: Option<LinearInterpolator>,
}

impl BodyCalc {
    pub fn new(geom: BodyGeometry) -> Result<Self, SimulationError> {
        let (cna0, cp0) = if geom.is_tube() {
            (0.0, 0.0)
        } else {
            let a0 = PI * pow2(geom.fore_radius);
            let a1 = PI * pow2(geom.aft_radius);
            (2.0 * (a1 - a0), (geom.length * a1 - geom.full_volume) / (a1 - a0))
        };

        let nose_drag = match geom.shape {
            Some((shape, param)) if geom.aft_radius > geom.fore_radius && geom.length >= 0.001 => {
                Some(nose_drag(shape, param, geom.fineness, geom.sin_phi)?)
            }
            _ => None,
        };

        Ok(Self { geom, cna0, cp0, nose_drag })
    }

    pub fn geometry(&self) -> &BodyGeometry {
        &self.geom
    }

    /// Body lift CP weighted by its normal force slope.
    fn lift_cp(&self, conditions: &FlightConditions) -> WeightedPoint {
        let mul = if conditions.mach() < LIFT_DAMP_MACH && conditions.aoa() > LIFT_DAMP_AOA {
            pow2(conditions.mach() / LIFT_DAMP_MACH)
        } else {
            1.0
        };
        WeightedPoint::new(
            self.geom.planform_center,
            mul * BODY_LIFT_K * self.geom.planform_area / conditions.ref_area()
                * conditions.sin_aoa()
                * conditions.sinc_aoa(),
        )
    }
}

impl AerodynamicCalc for BodyCalc {
    fn nonaxial_forces(
        &self,
        conditions: &FlightConditions,
        warnings: &mut WarningSet,
    ) -> AerodynamicForces {
        let cp = if self.geom.is_tube() {
            self.lift_cp(conditions)
        } else {
            WeightedPoint::new(self.cp0, self.cna0 * conditions.sinc_aoa() / conditions.ref_area())
                .average(&self.lift_cp(conditions))
        };

        if conditions.mach() > 1.1 {
            warnings.add(Warning::Supersonic);
        }

        let cna = cp.weight;
        let cn = cna * conditions.aoa();
        AerodynamicForces {
            cp,
            cna,
            cn,
            cm: cn * cp.x() / conditions.ref_length(),
            ..AerodynamicForces::zero()
        }
    }

    fn pressure_cd(
        &self,
        conditions: &FlightConditions,
        stagnation_cd: f64,
        base_cd: f64,
        _warnings: &mut WarningSet,
    ) -> f64 {
        let g = &self.geom;
        if g.is_tube() {
            return 0.0;
        }
        let frontal = g.frontal_area / conditions.ref_area();

        if g.length < 0.001 {
            return if g.fore_radius < g.aft_radius {
                stagnation_cd * frontal
            } else {
                base_cd * frontal
            };
        }

        if g.aft_radius < g.fore_radius {
            if g.fineness >= 3.0 {
                return 0.0;
            }
            let cd = base_cd * frontal;
            if g.fineness <= 1.0 {
                return cd;
            }
            return cd * (3.0 - g.fineness) / 2.0;
        }

        match &self.nose_drag {
            Some(interp) => interp.value(conditions.mach()) * frontal,
            None => 0.0,
        }
    }

    fn friction_cd(&self, conditions: &FlightConditions, cf: f64) -> f64 {
        if self.geom.wet_area < EPSILON {
            return 0.0;
        }
        cf * self.geom.wet_area / conditions.ref_area()
    }
}
