use super::component::{Component, ComponentId};

// ---------------------------------------------------------------------------
// Thrust-curve motor
// ---------------------------------------------------------------------------

/// Rocket motor described by a piecewise-linear thrust curve.
///
/// Propellant is assumed to burn proportionally to delivered impulse, so
/// `mass_flow(t)` is proportional to `thrust(t)`.
#[derive(Debug, Clone)]
pub struct Motor {
    pub designation: String,
    times: Vec<f64>,          // s, strictly increasing, starts at 0
    thrusts: Vec<f64>,        // N
    cumulative: Vec<f64>,     // N·s delivered up to times[i]
    pub launch_mass: f64,     // kg, total at ignition
    pub propellant_mass: f64, // kg
    pub length: f64,          // m
    pub diameter: f64,        // m
}

impl Motor {
    /// Build from `(time, thrust)` samples. Samples are sorted by time and a
    /// zero-time sample is prepended if missing.
    pub fn new(
        designation: impl Into<String>,
        curve: &[(f64, f64)],
        launch_mass: f64,
        propellant_mass: f64,
    ) -> Self {
        let mut points: Vec<(f64, f64)> = curve.to_vec();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        points.dedup_by(|a, b| a.0 == b.0);
        if points.first().map_or(true, |p| p.0 > 0.0) {
            points.insert(0, (0.0, 0.0));
        }
        let times: Vec<f64> = points.iter().map(|p| p.0).collect();
        let thrusts: Vec<f64> = points.iter().map(|p| p.1.max(0.0)).collect();
        let mut cumulative = Vec::with_capacity(times.len());
        let mut total = 0.0;
        for i in 0..times.len() {
            if i > 0 {
                total += (times[i] - times[i - 1]) * (thrusts[i] + thrusts[i - 1]) / 2.0;
            }
            cumulative.push(total);
        }
        Self {
            designation: designation.into(),
            times,
            thrusts,
            cumulative,
            launch_mass,
            propellant_mass: propellant_mass.min(launch_mass).max(0.0),
            length: 0.07,
            diameter: 0.018,
        }
    }

    /// Constant thrust for `burn_time` seconds.
    pub fn constant(
        designation: impl Into<String>,
        thrust: f64,
        burn_time: f64,
        launch_mass: f64,
        propellant_mass: f64,
    ) -> Self {
        Self::new(
            designation,
            &[(0.0, thrust), (burn_time, thrust)],
            launch_mass,
            propellant_mass,
        )
    }

    pub fn dimensions(mut self, length: f64, diameter: f64) -> Self {
        self.length = length;
        self.diameter = diameter;
        self
    }

    /// Time of the last thrust sample.
    pub fn burn_time(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }

    pub fn total_impulse(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    pub fn average_thrust(&self) -> f64 {
        let bt = self.burn_time();
        if bt > 0.0 {
            self.total_impulse() / bt
        } else {
            0.0
        }
    }

    /// Thrust `t` seconds after ignition (N). Zero before ignition and after
    /// the end of the curve.
    pub fn thrust(&self, t: f64) -> f64 {
        match self.segment(t) {
            Some((i, frac)) => self.thrusts[i] + frac * (self.thrusts[i + 1] - self.thrusts[i]),
            None if t == self.burn_time() => self.thrusts.last().copied().unwrap_or(0.0),
            None => 0.0,
        }
    }

    /// Impulse delivered up to `t` seconds after ignition (N·s).
    pub fn impulse(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        match self.segment(t) {
            Some((i, _)) => {
                let f = self.thrust(t);
                self.cumulative[i] + (t - self.times[i]) * (self.thrusts[i] + f) / 2.0
            }
            None => self.total_impulse(),
        }
    }

    /// Propellant remaining `t` seconds after ignition (kg).
    pub fn propellant_remaining(&self, t: f64) -> f64 {
        let total = self.total_impulse();
        if total <= 0.0 {
            return self.propellant_mass;
        }
        self.propellant_mass * (1.0 - self.impulse(t) / total).clamp(0.0, 1.0)
    }

    /// Motor mass `t` seconds after ignition (kg).
    pub fn mass(&self, t: f64) -> f64 {
        self.launch_mass - self.propellant_mass + self.propellant_remaining(t)
    }

    /// Propellant mass flow `t` seconds after ignition (kg/s, positive).
    pub fn mass_flow(&self, t: f64) -> f64 {
        let total = self.total_impulse();
        if total <= 0.0 {
            return 0.0;
        }
        self.propellant_mass * self.thrust(t) / total
    }

    /// Index of the curve segment containing `t` and the fraction along it.
    fn segment(&self, t: f64) -> Option<(usize, f64)> {
        if self.times.len() < 2 || t < 0.0 || t >= self.burn_time() {
            return None;
        }
        let i = self.times.partition_point(|&x| x <= t).saturating_sub(1);
        let span = self.times[i + 1] - self.times[i];
        Some((i, (t - self.times[i]) / span))
    }
}

// ---------------------------------------------------------------------------
// Motor mount configuration
// ---------------------------------------------------------------------------

/// What ignites a motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IgnitionTrigger {
    /// Bottom-stage motors light at launch, upper-stage motors when the
    /// stage below burns out.
    #[default]
    Automatic,
    Launch,
    PreviousStageBurnout,
    Never,
}

/// A motor loaded into a body tube.
#[derive(Debug, Clone)]
pub struct MotorMount {
    pub motor: Motor,
    pub ignition: IgnitionTrigger,
    pub ignition_delay: f64,          // s
    pub ejection_delay: Option<f64>,  // s after burnout, None = plugged
    pub overhang: f64,                // m the motor protrudes past the tube aft end
}

impl MotorMount {
    pub fn new(motor: Motor) -> Self {
        Self {
            motor,
            ignition: IgnitionTrigger::Automatic,
            ignition_delay: 0.0,
            ejection_delay: None,
            overhang: 0.0,
        }
    }

    pub fn ignition(mut self, trigger: IgnitionTrigger, delay: f64) -> Self {
        self.ignition = trigger;
        self.ignition_delay = delay;
        self
    }

    pub fn ejection_delay(mut self, delay: f64) -> Self {
        self.ejection_delay = Some(delay);
        self
    }
}

// ---------------------------------------------------------------------------
// Runtime motor state
// ---------------------------------------------------------------------------

/// One mounted motor as tracked during a simulation run.
#[derive(Debug, Clone)]
pub struct MotorInstance {
    pub mount: ComponentId,
    pub stage: usize,
    pub position: f64, // m, absolute x of the motor fore end
    pub config: MotorMount,
    pub ignition_time: Option<f64>,
    pub burnt_out: bool,
}

impl MotorInstance {
    /// Unignited motor loaded into `tube`, aft end flush with the tube's
    /// aft end plus the overhang.
    pub fn mounted(tube: &Component, mount: &MotorMount) -> Self {
        let aft = tube.position + tube.length() + mount.overhang;
        Self {
            mount: tube.id,
            stage: tube.stage,
            position: aft - mount.motor.length,
            config: mount.clone(),
            ignition_time: None,
            burnt_out: false,
        }
    }

    pub fn is_ignited(&self) -> bool {
        self.ignition_time.is_some()
    }

    pub fn is_burning(&self) -> bool {
        self.ignition_time.is_some() && !self.burnt_out
    }

    pub fn thrust(&self, time: f64) -> f64 {
        match self.ignition_time {
            Some(t0) if !self.burnt_out => self.config.motor.thrust(time - t0),
            _ => 0.0,
        }
    }

    pub fn mass(&self, time: f64) -> f64 {
        match self.ignition_time {
            Some(t0) => self.config.motor.mass(time - t0),
            None => self.config.motor.launch_mass,
        }
    }

    pub fn propellant_mass(&self, time: f64) -> f64 {
        match self.ignition_time {
            Some(t0) => self.config.motor.propellant_remaining(time - t0),
            None => self.config.motor.propellant_mass,
        }
    }

    pub fn cg(&self) -> f64 {
        self.position + self.config.motor.length / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c6() -> Motor {
        Motor::new(
            "C6",
            &[(0.0, 0.0), (0.2, 14.0), (0.4, 6.0), (1.8, 4.5), (1.9, 0.0)],
            0.024,
            0.012,
        )
    }

    #[test]
    fn constant_motor_values() {
        let m = Motor::constant("T20", 20.0, 1.5, 0.06, 0.03);
        assert_relative_eq!(m.thrust(0.0), 20.0);
        assert_relative_eq!(m.thrust(0.75), 20.0);
        assert_relative_eq!(m.thrust(1.5), 20.0);
        assert_relative_eq!(m.thrust(1.6), 0.0);
        assert_relative_eq!(m.total_impulse(), 30.0);
        assert_relative_eq!(m.burn_time(), 1.5);
    }

    #[test]
    fn propellant_burns_with_impulse() {
        let m = Motor::constant("T20", 20.0, 1.5, 0.06, 0.03);
        assert_relative_eq!(m.propellant_remaining(0.0), 0.03);
        assert_relative_eq!(m.propellant_remaining(0.75), 0.015, epsilon = 1e-12);
        assert_relative_eq!(m.mass(2.0), 0.03, epsilon = 1e-12);
        assert_relative_eq!(m.mass_flow(0.5), 0.02, epsilon = 1e-12);
    }

    #[test]
    fn curve_impulse_is_trapezoidal() {
        let m = c6();
        let expected = 0.2 * 7.0 + 0.2 * 10.0 + 1.4 * 5.25 + 0.1 * 2.25;
        assert_relative_eq!(m.total_impulse(), expected, epsilon = 1e-12);
        assert_relative_eq!(m.impulse(0.2), 1.4, epsilon = 1e-12);
        assert_relative_eq!(m.thrust(0.1), 7.0, epsilon = 1e-12);
        assert_relative_eq!(m.average_thrust(), expected / 1.9, epsilon = 1e-12);
    }

    #[test]
    fn unignited_instance_has_full_mass_and_no_thrust() {
        let inst = MotorInstance {
            mount: ComponentId(0),
            stage: 0,
            position: 0.3,
            config: MotorMount::new(c6()),
            ignition_time: None,
            burnt_out: false,
        };
        assert_eq!(inst.thrust(0.5), 0.0);
        assert_relative_eq!(inst.mass(10.0), 0.024);
    }
}
