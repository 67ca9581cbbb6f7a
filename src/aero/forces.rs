use nalgebra::Vector3;

use crate::util::{pow2, EPSILON};

// ---------------------------------------------------------------------------
// Weighted center of pressure
// ---------------------------------------------------------------------------

/// A point carrying a weight. For the CP the weight is the CNa slope of the
/// contribution, so averaging two CPs yields the combined CP.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedPoint {
    pub pos: Vector3<f64>, // m, x aft of nose tip
    pub weight: f64,
}

impl WeightedPoint {
    pub fn new(x: f64, weight: f64) -> Self {
        Self { pos: Vector3::new(x, 0.0, 0.0), weight }
    }

    pub fn x(&self) -> f64 {
        self.pos.x
    }

    /// Weighted average. With zero total weight the plain midpoint is
    /// returned with weight 0.
    pub fn average(&self, other: &WeightedPoint) -> WeightedPoint {
        let w = self.weight + other.weight;
        if w.abs() < pow2(EPSILON) {
            WeightedPoint { pos: (self.pos + other.pos) / 2.0, weight: 0.0 }
        } else {
            WeightedPoint {
                pos: (self.pos * self.weight + other.pos * other.weight) / w,
                weight: w,
            }
        }
    }
}

impl Default for WeightedPoint {
    fn default() -> Self {
        Self { pos: Vector3::zeros(), weight: 0.0 }
    }
}

// ---------------------------------------------------------------------------
// Aerodynamic coefficients
// ---------------------------------------------------------------------------

/// Force and moment coefficients of one component or of the whole rocket.
/// Moments are about the nose tip unless noted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AerodynamicForces {
    pub cp: WeightedPoint,
    pub cna: f64,
    pub cn: f64,
    pub cm: f64,
    pub cside: f64,
    pub cyaw: f64,
    pub croll: f64,
    pub croll_force: f64,
    pub croll_damp: f64,

    pub cd: f64,
    pub pressure_cd: f64,
    pub base_cd: f64,
    pub friction_cd: f64,
    /// Drag coefficient along the rocket axis.
    pub caxial: f64,

    pub pitch_damping_moment: f64,
    pub yaw_damping_moment: f64,
}

impl AerodynamicForces {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Accumulate the non-axial contribution of another component.
    pub fn merge(&mut self, other: &AerodynamicForces) {
        self.cp = self.cp.average(&other.cp);
        self.cna += other.cna;
        self.cn += other.cn;
        self.cm += other.cm;
        self.cside += other.cside;
        self.cyaw += other.cyaw;
        self.croll += other.croll;
        self.croll_force += other.croll_force;
        self.croll_damp += other.croll_damp;
    }

    pub fn is_finite(&self) -> bool {
        [
            self.cp.pos.x,
            self.cna,
            self.cn,
            self.cm,
            self.cside,
            self.cyaw,
            self.croll,
            self.cd,
            self.caxial,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}
