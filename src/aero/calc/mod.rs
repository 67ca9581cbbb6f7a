//! Per-component coefficient calculators.
//!
//! Each calculator owns the reduced geometry of one component and maps the
//! current flight conditions to that component's contribution. Positions
//! in the returned forces are relative to the component's fore end; the
//! aggregating calculator shifts them to the nose tip.

pub mod body;
pub mod fin;
pub mod tube;

pub use body::BodyCalc;
pub use fin::FinCalc;
pub use tube::{RailButtonCalc, TubeCalc};

use super::conditions::FlightConditions;
use super::forces::AerodynamicForces;
use super::warning::WarningSet;

/// Shared calculation contract of all component calculators.
pub trait AerodynamicCalc {
    /// Normal force, pitching moment about the component fore end, CP and
    /// roll terms.
    fn nonaxial_forces(
        &self,
        conditions: &FlightConditions,
        warnings: &mut WarningSet,
    ) -> AerodynamicForces;

    /// Pressure drag referenced to the rocket reference area.
    fn pressure_cd(
        &self,
        conditions: &FlightConditions,
        stagnation_cd: f64,
        base_cd: f64,
        warnings: &mut WarningSet,
    ) -> f64;

    /// Skin friction drag for a given friction coefficient.
    fn friction_cd(&self, conditions: &FlightConditions, cf: f64) -> f64;
}

/// Calculator of one aerodynamic component, dispatched by kind.
#[derive(Debug, Clone)]
pub enum ComponentCalc {
    Fins(FinCalc),
    Body(BodyCalc),
    Tube(TubeCalc),
    RailButton(RailButtonCalc),
}

impl ComponentCalc {
    fn inner(&self) -> &dyn AerodynamicCalc {
        match self {
            ComponentCalc::Fins(c) => c,
            ComponentCalc::Body(c) => c,
            ComponentCalc::Tube(c) => c,
            ComponentCalc::RailButton(c) => c,
        }
    }

    /// Symmetric airframe components take part in the fineness correction.
    pub fn is_body(&self) -> bool {
        matches!(self, ComponentCalc::Body(_))
    }
}

impl AerodynamicCalc for ComponentCalc {
    fn nonaxial_forces(
        &self,
        conditions: &FlightConditions,
        warnings: &mut WarningSet,
    ) -> AerodynamicForces {
        self.inner().nonaxial_forces(conditions, warnings)
    }

    fn pressure_cd(
        &self,
        conditions: &FlightConditions,
        stagnation_cd: f64,
        base_cd: f64,
        warnings: &mut WarningSet,
    ) -> f64 {
        self.inner().pressure_cd(conditions, stagnation_cd, base_cd, warnings)
    }

    fn friction_cd(&self, conditions: &FlightConditions, cf: f64) -> f64 {
        self.inner().friction_cd(conditions, cf)
    }
}
