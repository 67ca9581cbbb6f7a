use std::f64::consts::PI;
use std::sync::LazyLock;

use crate::aero::conditions::FlightConditions;
use crate::aero::forces::{AerodynamicForces, WeightedPoint};
use crate::aero::geometry::{FinGeometry, DIVISIONS};
use crate::aero::warning::{Warning, WarningSet};
use crate::error::SimulationError;
use crate::physics::atmosphere::GAMMA;
use crate::util::{
    finite_or, map, pow2, safe_sqrt, sign, LinearInterpolator, PolyInterpolator, EPSILON,
};
use crate::vehicle::CrossSection;

use super::AerodynamicCalc;

pub const STALL_ANGLE: f64 = 20.0 * PI / 180.0;

const CNA_SUBSONIC: f64 = 0.9;
const CNA_SUPERSONIC: f64 = 1.5;
/// Tip angle of attack above which roll damping is summed per chord strip.
const ROLL_TIP_LIMIT: f64 = 15.0 * PI / 180.0;

// ---------------------------------------------------------------------------
// Supersonic lift coefficients K1..K3 (Mach 1.5 to 5)
// ---------------------------------------------------------------------------

struct KTables {
    k1: LinearInterpolator,
    k2: LinearInterpolator,
    k3: LinearInterpolator,
}

static K_TABLES: LazyLock<KTables> = LazyLock::new(|| {
    let n = ((5.0 - CNA_SUPERSONIC) * 10.0) as usize;
    let mut k1 = LinearInterpolator::new();
    let mut k2 = LinearInterpolator::new();
    let mut k3 = LinearInterpolator::new();
    for i in 0..n {
        let m = CNA_SUPERSONIC + i as f64 * 0.1;
        let beta = safe_sqrt(m * m - 1.0);
        k1.add_point(m, 2.0 / beta);
        k2.add_point(m, ((GAMMA + 1.0) * m.powi(4) - 4.0 * pow2(beta)) / (4.0 * beta.powi(4)));
        k3.add_point(
            m,
            ((GAMMA + 1.0) * m.powi(8)
                + (2.0 * pow2(GAMMA) - 7.0 * GAMMA - 5.0) * m.powi(6)
                + 10.0 * (GAMMA + 1.0) * m.powi(4)
                + 8.0)
                / (6.0 * beta.powi(7)),
        );
    }
    KTables { k1, k2, k3 }
});

/// Fin-fin interference efficiency for the number of fins at one station.
fn interference_efficiency(count: u32) -> Option<f64> {
    match count {
        0..=4 => Some(1.0),
        5 => Some(0.948),
        6 => Some(0.913),
        7 => Some(0.854),
        8 => Some(0.81),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Fin set calculator
// ---------------------------------------------------------------------------

/// Extended-Barrowman calculator of a fin set.
#[derive(Debug, Clone)]
pub struct FinCalc {
    geom: FinGeometry,
    interference_count: u32,
    cna_poly: PolyInterpolator,
    /// CP position along the MAC between Mach 0.5 and 2; `None` when the
    /// aspect ratio makes the boundary conditions singular.
    cp_poly: Option<Vec<f64>>,
}

impl FinCalc {
    pub fn new(geom: FinGeometry, interference_count: u32) -> Result<Self, SimulationError> {
        let cna_poly = PolyInterpolator::new(&[
            &[CNA_SUBSONIC, CNA_SUPERSONIC],
            &[CNA_SUBSONIC, CNA_SUPERSONIC],
            &[CNA_SUBSONIC],
        ])
        .ok_or_else(|| SimulationError::InternalConsistency("transonic CNa polynomial is singular".into()))?;
        let cp_poly = cp_polynomial(geom.aspect_ratio);
        Ok(Self { geom, interference_count, cna_poly, cp_poly })
    }

    pub fn geometry(&self) -> &FinGeometry {
        &self.geom
    }

    pub fn interference_count(&self) -> u32 {
        self.interference_count
    }

    /// Normal force slope of a single fin without interference effects.
    pub fn cna1(&self, conditions: &FlightConditions) -> f64 {
        let g = &self.geom;
        let mach = conditions.mach();
        let ref_area = conditions.ref_area();
        let aoa = conditions.aoa();
        let alpha = aoa.min(PI - aoa).min(STALL_ANGLE);
        let k = pow2(g.span) / (g.fin_area * g.cos_gamma);

        if mach <= CNA_SUBSONIC {
            return 2.0 * PI * pow2(g.span)
                / (1.0 + safe_sqrt(1.0 + (1.0 - pow2(mach)) * pow2(k)))
                / ref_area;
        }

        let tables = &*K_TABLES;
        let supersonic = |m: f64| {
            g.fin_area
                * (tables.k1.value(m) + tables.k2.value(m) * alpha + tables.k3.value(m) * pow2(alpha))
                / ref_area
        };
        if mach >= CNA_SUPERSONIC {
            return supersonic(mach);
        }

        // transonic: match value and slope at both ends, zero curvature at 0.9
        let sq = safe_sqrt(1.0 + (1.0 - pow2(CNA_SUBSONIC)) * pow2(k));
        let sub_v = 2.0 * PI * pow2(g.span) / ref_area / (1.0 + sq);
        let sub_d = 2.0 * CNA_SUBSONIC * PI * g.span.powi(6)
            / (pow2(g.fin_area * g.cos_gamma) * ref_area * sq * pow2(1.0 + sq));
        let super_v = supersonic(CNA_SUPERSONIC);
        let super_d = -g.fin_area / ref_area * 2.0 * CNA_SUPERSONIC
            / (pow2(CNA_SUPERSONIC) - 1.0).powf(1.5);

        self.cna_poly.interpolate(mach, &[sub_v, super_v, sub_d, super_d, 0.0])
    }

    /// Relative CP position along the mean aerodynamic chord.
    pub fn cp_position(&self, conditions: &FlightConditions) -> f64 {
        let m = conditions.mach();
        if m <= 0.5 {
            return 0.25;
        }
        if m >= 2.0 {
            let ab = self.geom.aspect_ratio * conditions.beta();
            return finite_or((ab - 0.67) / (2.0 * ab - 1.0), 0.25);
        }
        match &self.cp_poly {
            Some(poly) => finite_or(PolyInterpolator::eval(m, poly), 0.25),
            None => 0.25,
        }
    }

    /// Roll damping coefficient (positive opposes the roll rate).
    pub fn roll_damping(&self, conditions: &FlightConditions) -> f64 {
        let g = &self.geom;
        let rate = conditions.roll_rate();
        if rate.abs() < 0.1 {
            return 0.0;
        }

        let mach = conditions.mach();
        let vel = conditions.velocity();
        let r = g.body_radius;
        let n = g.fin_count as f64;
        let ref_moment = conditions.ref_area() * conditions.ref_length();

        // fin tips far above stall near apogee: sum strips with limited AOA
        if rate.abs() * (r + g.span) / vel > ROLL_TIP_LIMIT {
            let mut sum = 0.0;
            for i in 0..DIVISIONS {
                let dist = r + g.span * i as f64 / DIVISIONS as f64;
                let aoa = (rate.abs() * dist / vel).min(ROLL_TIP_LIMIT);
                sum += g.chord_length[i] * dist * aoa;
            }
            sum *= (g.span / DIVISIONS as f64) * 2.0 * PI / conditions.beta() / ref_moment;
            return sign(rate) * n * sum;
        }

        if mach <= CNA_SUBSONIC {
            return n * 2.0 * PI * rate * g.roll_sum / (ref_moment * vel * conditions.beta());
        }

        if mach >= CNA_SUPERSONIC {
            let tables = &*K_TABLES;
            let (k1, k2, k3) = (tables.k1.value(mach), tables.k2.value(mach), tables.k3.value(mach));
            let dy = g.span / (DIVISIONS - 1) as f64;
            let sum: f64 = (0..DIVISIONS)
                .map(|i| {
                    let y = i as f64 * dy;
                    let a = rate * (r + y) / vel;
                    (k1 * a + k2 * a * a + k3 * a * a * a) * g.chord_length[i] * (r + y)
                })
                .sum();
            return n * sum * dy / ref_moment;
        }

        let mut cond = conditions.clone();
        cond.set_mach(CNA_SUBSONIC - 0.01);
        let subsonic = self.roll_damping(&cond);
        cond.set_mach(CNA_SUPERSONIC + 0.01);
        let supersonic = self.roll_damping(&cond);
        map(mach, CNA_SUBSONIC, CNA_SUPERSONIC, subsonic, supersonic)
    }
}

impl AerodynamicCalc for FinCalc {
    fn nonaxial_forces(
        &self,
        conditions: &FlightConditions,
        warnings: &mut WarningSet,
    ) -> AerodynamicForces {
        let g = &self.geom;
        if g.span < 0.001 || g.fin_area < EPSILON {
            return AerodynamicForces::zero();
        }

        let cna1 = self.cna1(conditions);
        let n = g.fin_count;

        let mut cna = if n == 1 || n == 2 {
            let theta = conditions.theta();
            let mut angle = g.base_rotation;
            let mut mul = 0.0;
            for _ in 0..n {
                mul += pow2((theta - angle).sin());
                angle += 2.0 * PI / n as f64;
            }
            cna1 * mul
        } else {
            cna1 * n as f64 / 2.0
        };

        match interference_efficiency(self.interference_count) {
            Some(eff) => cna *= eff,
            None => {
                cna *= 0.75;
                warnings.add(Warning::ParallelFins);
            }
        }

        let r = g.body_radius;
        let tau = finite_or(r / (g.span + r), 0.0);
        cna *= 1.0 + tau;

        let x = g.mac_lead + self.cp_position(conditions) * g.mac_length;

        let aoa = conditions.aoa();
        let mut croll_force =
            n as f64 * (g.mac_span + r) * cna1 * (1.0 + tau) * g.cant_angle / conditions.ref_length();
        if aoa > STALL_ANGLE {
            croll_force *= (1.0 - (aoa - STALL_ANGLE) / (STALL_ANGLE / 2.0)).clamp(0.0, 1.0);
        }
        let croll_damp = self.roll_damping(conditions);

        let cn = cna * aoa.min(STALL_ANGLE);
        AerodynamicForces {
            cp: WeightedPoint::new(x, cna),
            cna,
            cn,
            cm: cn * x / conditions.ref_length(),
            // side force and yaw are not modelled for fins
            cside: 0.0,
            cyaw: 0.0,
            croll: croll_force - croll_damp,
            croll_force,
            croll_damp,
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
        if g.fin_area < EPSILON {
            return 0.0;
        }
        let mach = conditions.mach();

        let mut cd = match g.cross_section {
            CrossSection::Rounded | CrossSection::Airfoil => {
                if mach < 0.9 {
                    (1.0 - pow2(mach)).powf(-0.417) - 1.0
                } else if mach < 1.0 {
                    1.0 - 1.785 * (mach - 0.9)
                } else {
                    1.214 - 0.502 / pow2(mach) + 0.1095 / pow2(pow2(mach))
                }
            }
            CrossSection::Square => stagnation_cd,
        };

        cd *= pow2(g.cos_gamma_lead);

        cd += match g.cross_section {
            CrossSection::Square => base_cd,
            CrossSection::Rounded => base_cd / 2.0,
            CrossSection::Airfoil => 0.0,
        };

        cd * g.fin_count as f64 * g.span * g.thickness / conditions.ref_area()
    }

    fn friction_cd(&self, conditions: &FlightConditions, cf: f64) -> f64 {
        let g = &self.geom;
        if g.fin_area < EPSILON || g.mac_length < EPSILON {
            return 0.0;
        }
        cf * (1.0 + 2.0 * g.thickness / g.mac_length) * 2.0 * g.fin_area * g.fin_count as f64
            / conditions.ref_area()
    }
}

/// Coefficients of the degree-5 polynomial giving the CP position along the
/// MAC between Mach 0.5 and 2: quarter chord with zero slope at 0.5, the
/// supersonic formula's value and slope at 2, zero higher derivatives there.
fn cp_polynomial(aspect_ratio: f64) -> Option<Vec<f64>> {
    let beta2 = 3.0_f64.sqrt();
    let denom = 2.0 * aspect_ratio * beta2 - 1.0;
    let value = (aspect_ratio * beta2 - 0.67) / denom;
    let slope = 0.34 * aspect_ratio * (2.0 / beta2) / pow2(denom);
    if !value.is_finite() || !slope.is_finite() {
        return None;
    }
    let interp = PolyInterpolator::new(&[&[0.5, 2.0], &[0.5, 2.0], &[2.0], &[2.0]])?;
    Some(interp.interpolator(&[0.25, value, 0.0, slope, 0.0, 0.0]))
}
