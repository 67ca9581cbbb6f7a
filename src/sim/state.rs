use std::fmt;

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

// ---------------------------------------------------------------------------
// Flight phase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightPhase {
    OnPad,
    OnRod,
    Powered,
    Coast,
    Tumbling,
    RecoveryDeployed,
    Landed,
}

impl FlightPhase {
    /// Phases integrated with the 3DOF descent stepper.
    pub fn is_descent(self) -> bool {
        matches!(self, FlightPhase::Tumbling | FlightPhase::RecoveryDeployed)
    }
}

impl fmt::Display for FlightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlightPhase::OnPad => "on pad",
            FlightPhase::OnRod => "on rod",
            FlightPhase::Powered => "powered",
            FlightPhase::Coast => "coast",
            FlightPhase::Tumbling => "tumbling",
            FlightPhase::RecoveryDeployed => "recovery",
            FlightPhase::Landed => "landed",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Rigid-body state: position, velocity, attitude, angular rate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub time: f64,
    pub pos: Vector3<f64>,                 // m, launch-site frame (x east, y north, z up)
    pub vel: Vector3<f64>,                 // m/s
    pub orientation: UnitQuaternion<f64>,  // body→world; body z is the rocket axis, nose forward
    pub omega: Vector3<f64>,               // rad/s, world frame
}

impl SimulationState {
    /// At rest on the pad, pointing along `orientation`.
    pub fn at_rest(orientation: UnitQuaternion<f64>) -> Self {
        Self {
            time: 0.0,
            pos: Vector3::zeros(),
            vel: Vector3::zeros(),
            orientation,
            omega: Vector3::zeros(),
        }
    }

    pub fn apply(&self, d: &StateDerivative, dt: f64) -> SimulationState {
        let q_raw = self.orientation.quaternion() + d.dquat * dt;
        SimulationState {
            time: self.time + dt,
            pos: self.pos + d.dpos * dt,
            vel: self.vel + d.dvel * dt,
            orientation: UnitQuaternion::new_normalize(q_raw),
            omega: self.omega + d.domega * dt,
        }
    }

    /// Classical RK4 combination of four stage derivatives.
    pub fn combine(&self, k: [&StateDerivative; 4], dt: f64) -> SimulationState {
        let [k1, k2, k3, k4] = k;
        let q_raw = self.orientation.quaternion()
            + (k1.dquat + k2.dquat * 2.0 + k3.dquat * 2.0 + k4.dquat) * (dt / 6.0);
        SimulationState {
            time: self.time + dt,
            pos: self.pos + (k1.dpos + 2.0 * k2.dpos + 2.0 * k3.dpos + k4.dpos) * (dt / 6.0),
            vel: self.vel + (k1.dvel + 2.0 * k2.dvel + 2.0 * k3.dvel + k4.dvel) * (dt / 6.0),
            orientation: UnitQuaternion::new_normalize(q_raw),
            omega: self.omega
                + (k1.domega + 2.0 * k2.domega + 2.0 * k3.domega + k4.domega) * (dt / 6.0),
        }
    }

    /// Rocket axis in the world frame.
    pub fn axis(&self) -> Vector3<f64> {
        self.orientation * Vector3::z()
    }

    /// Angle of the rocket axis from vertical (rad).
    pub fn zenith(&self) -> f64 {
        self.axis().z.clamp(-1.0, 1.0).acos()
    }

    /// Compass heading of the rocket axis, clockwise from north (rad).
    pub fn azimuth(&self) -> f64 {
        let a = self.axis();
        a.x.atan2(a.y)
    }

    /// Lateral distance from the launch point (m).
    pub fn lateral_distance(&self) -> f64 {
        self.pos.x.hypot(self.pos.y)
    }

    /// True if any component is NaN or has grown beyond a physically
    /// meaningful magnitude.
    pub fn has_diverged(&self) -> bool {
        const LIMIT: f64 = 1e18;
        let bad = |v: &Vector3<f64>| !(v.norm_squared() <= LIMIT);
        bad(&self.pos)
            || bad(&self.vel)
            || bad(&self.omega)
            || !self.time.is_finite()
            || self.orientation.quaternion().coords.iter().any(|c| c.is_nan())
    }
}

// ---------------------------------------------------------------------------
// State derivative
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StateDerivative {
    pub dpos: Vector3<f64>,
    pub dvel: Vector3<f64>,
    pub dquat: Quaternion<f64>, // not unit
    pub domega: Vector3<f64>,   // angular acceleration, world frame
}

impl StateDerivative {
    pub fn new(
        state: &SimulationState,
        acceleration: Vector3<f64>,
        angular_acceleration: Vector3<f64>,
    ) -> Self {
        // q' = 1/2 (0, w) q for a world-frame rate
        let w = Quaternion::from_parts(0.0, state.omega);
        Self {
            dpos: state.vel,
            dvel: acceleration,
            dquat: w * *state.orientation.quaternion() * 0.5,
            domega: angular_acceleration,
        }
    }
}
