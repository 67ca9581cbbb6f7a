use crate::aero::conditions::FlightConditions;
use crate::aero::forces::AerodynamicForces;
use crate::aero::geometry::{RailButtonGeometry, TubeGeometry};
use crate::aero::warning::WarningSet;
use crate::util::{pow2, EPSILON};

use super::AerodynamicCalc;

/// Pressure loss coefficient at the tube exit.
const EXIT_LOSS: f64 = 1.0;

// ---------------------------------------------------------------------------
// Open tube (launch lug)
// ---------------------------------------------------------------------------

/// Drag of a tube open to the airflow: internal pipe-flow losses plus
/// stagnation and base drag on the wall.
#[derive(Debug, Clone)]
pub struct TubeCalc {
    geom: TubeGeometry,
    roughness: f64, // m
}

impl TubeCalc {
    pub fn new(geom: TubeGeometry, roughness: f64) -> Self {
        Self { geom, roughness }
    }

    /// Darcy friction factor of the internal flow.
    fn friction_factor(&self, reynolds: f64) -> f64 {
        if reynolds < 2300.0 {
            return 64.0 / reynolds;
        }
        let d = self.geom.inner_diameter();
        0.25 / pow2((self.roughness / (3.7 * d) + 5.74 / reynolds.powf(0.9)).log10())
    }
}

impl AerodynamicCalc for TubeCalc {
    fn nonaxial_forces(
        &self,
        _conditions: &FlightConditions,
        _warnings: &mut WarningSet,
    ) -> AerodynamicForces {
        AerodynamicForces::zero()
    }

    fn pressure_cd(
        &self,
        conditions: &FlightConditions,
        stagnation_cd: f64,
        base_cd: f64,
        _warnings: &mut WarningSet,
    ) -> f64 {
        let g = &self.geom;
        let wall = (stagnation_cd + base_cd) * g.frontal_area;
        if g.inner_area < EPSILON {
            return wall / conditions.ref_area();
        }
        let reynolds = conditions.reynolds(g.inner_diameter()).max(1.0);
        let internal = self.friction_factor(reynolds) * g.length / g.inner_diameter() + EXIT_LOSS;
        (internal * g.inner_area + wall) / conditions.ref_area()
    }

    fn friction_cd(&self, conditions: &FlightConditions, cf: f64) -> f64 {
        cf * self.geom.wet_area / conditions.ref_area()
    }
}

// ---------------------------------------------------------------------------
// Rail button
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RailButtonCalc {
    geom: RailButtonGeometry,
}

impl RailButtonCalc {
    pub fn new(geom: RailButtonGeometry) -> Self {
        Self { geom }
    }
}

impl AerodynamicCalc for RailButtonCalc {
    fn nonaxial_forces(
        &self,
        _conditions: &FlightConditions,
        _warnings: &mut WarningSet,
    ) -> AerodynamicForces {
        AerodynamicForces::zero()
    }

    fn pressure_cd(
        &self,
        conditions: &FlightConditions,
        stagnation_cd: f64,
        _base_cd: f64,
        _warnings: &mut WarningSet,
    ) -> f64 {
        stagnation_cd * self.geom.reference_area / conditions.ref_area()
    }

    fn friction_cd(&self, _conditions: &FlightConditions, _cf: f64) -> f64 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::{LaunchLug, RailButton};
    use approx::assert_relative_eq;

    fn conditions() -> FlightConditions {
        let mut fc = FlightConditions::new(0.05);
        fc.set_mach(0.3);
        fc
    }

    #[test]
    fn solid_lug_has_only_wall_drag() {
        let calc = TubeCalc::new(TubeGeometry::new(0.03, 0.003, 0.0), 60e-6);
        let fc = conditions();
        let mut w = WarningSet::new();
        let cd = calc.pressure_cd(&fc, 0.9, 0.12, &mut w);
        let expected = 1.02 * std::f64::consts::PI * 0.003 * 0.003 / fc.ref_area();
        assert_relative_eq!(cd, expected, max_relative = 1e-12);
    }

    #[test]
    fn open_lug_adds_internal_loss() {
        let lug = LaunchLug::new(0.03, 0.003, 0.0005);
        let geom = TubeGeometry::launch_lug(&lug);
        let wall = 1.02 * geom.frontal_area;
        let bore = geom.inner_area;
        let calc = TubeCalc::new(geom, 60e-6);
        let fc = conditions();
        let mut w = WarningSet::new();
        let open = calc.pressure_cd(&fc, 0.9, 0.12, &mut w) * fc.ref_area();
        assert!(open.is_finite());
        // at least the exit loss over the bore
        assert!(open > wall + bore);
    }

    #[test]
    fn laminar_friction_factor() {
        let calc = TubeCalc::new(TubeGeometry::new(0.03, 0.003, 0.0025), 0.0);
        assert_relative_eq!(calc.friction_factor(1000.0), 0.064);
    }

    #[test]
    fn rail_button_is_stagnation_drag() {
        let b = RailButton::new(0.010, 0.006, 0.008);
        let calc = RailButtonCalc::new(RailButtonGeometry::new(&b));
        let fc = conditions();
        let mut w = WarningSet::new();
        let cd = calc.pressure_cd(&fc, 0.9, 0.12, &mut w);
        assert_relative_eq!(cd, 0.9 * (0.008 * 0.010 - 0.004 * 0.004) / fc.ref_area());
        assert_eq!(calc.friction_cd(&fc, 0.01), 0.0);
    }
}
