use std::f64::consts::PI;

use crate::physics::AtmosphericConditions;
use crate::util::{pow2, EPSILON};

/// Smallest Prandtl-Glauert factor used, to keep transonic values finite.
pub const MIN_BETA: f64 = 0.25;

// ---------------------------------------------------------------------------
// Instantaneous flight conditions
// ---------------------------------------------------------------------------

/// Flight conditions for one coefficient evaluation. Setters keep the
/// derived quantities (sin/sinc of AOA, beta, velocity) consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightConditions {
    ref_length: f64,  // m
    ref_area: f64,    // m^2
    aoa: f64,         // rad, [0, pi]
    sin_aoa: f64,
    sinc_aoa: f64,
    theta: f64,       // rad, lateral direction of the airflow in the body frame
    mach: f64,
    beta: f64,
    roll_rate: f64,   // rad/s
    pitch_rate: f64,  // rad/s
    yaw_rate: f64,    // rad/s
    pitch_center: f64, // m aft of nose tip, damping moment reference (CG)
    atmosphere: AtmosphericConditions,
}

impl FlightConditions {
    pub fn new(ref_length: f64) -> Self {
        let mut fc = Self {
            ref_length: 0.0,
            ref_area: 0.0,
            aoa: 0.0,
            sin_aoa: 0.0,
            sinc_aoa: 1.0,
            theta: 0.0,
            mach: 0.0,
            beta: 1.0,
            roll_rate: 0.0,
            pitch_rate: 0.0,
            yaw_rate: 0.0,
            pitch_center: 0.0,
            atmosphere: AtmosphericConditions::default(),
        };
        fc.set_reference_length(ref_length);
        fc.set_mach(0.3);
        fc
    }

    pub fn set_reference_length(&mut self, length: f64) {
        self.ref_length = length;
        self.ref_area = PI * pow2(length / 2.0);
    }

    /// Angle of attack, clamped to [0, pi].
    pub fn set_aoa(&mut self, aoa: f64) {
        let aoa = aoa.clamp(0.0, PI);
        self.aoa = aoa;
        self.sin_aoa = aoa.sin();
        self.sinc_aoa = if aoa < 0.001 { 1.0 } else { self.sin_aoa / aoa };
    }

    pub fn set_theta(&mut self, theta: f64) {
        self.theta = theta;
    }

    pub fn set_mach(&mut self, mach: f64) {
        let mach = mach.max(0.0);
        self.mach = mach;
        self.beta = (1.0 - pow2(mach)).abs().sqrt().max(MIN_BETA);
    }

    /// Airspeed (m/s); converted to Mach with the current atmosphere.
    pub fn set_velocity(&mut self, velocity: f64) {
        let c = self.atmosphere.sound_speed;
        self.set_mach(if c > EPSILON { velocity / c } else { 0.0 });
    }

    /// Replace the atmosphere, keeping the Mach number.
    pub fn set_atmosphere(&mut self, atmosphere: AtmosphericConditions) {
        self.atmosphere = atmosphere;
    }

    pub fn set_roll_rate(&mut self, rate: f64) {
        self.roll_rate = rate;
    }

    pub fn set_pitch_rate(&mut self, rate: f64) {
        self.pitch_rate = rate;
    }

    pub fn set_yaw_rate(&mut self, rate: f64) {
        self.yaw_rate = rate;
    }

    pub fn set_pitch_center(&mut self, x: f64) {
        self.pitch_center = x;
    }

    pub fn ref_length(&self) -> f64 { self.ref_length }
    pub fn ref_area(&self) -> f64 { self.ref_area }
    pub fn aoa(&self) -> f64 { self.aoa }
    pub fn sin_aoa(&self) -> f64 { self.sin_aoa }
    pub fn sinc_aoa(&self) -> f64 { self.sinc_aoa }
    pub fn theta(&self) -> f64 { self.theta }
    pub fn mach(&self) -> f64 { self.mach }
    pub fn beta(&self) -> f64 { self.beta }
    pub fn roll_rate(&self) -> f64 { self.roll_rate }
    pub fn pitch_rate(&self) -> f64 { self.pitch_rate }
    pub fn yaw_rate(&self) -> f64 { self.yaw_rate }
    pub fn pitch_center(&self) -> f64 { self.pitch_center }
    pub fn atmosphere(&self) -> &AtmosphericConditions { &self.atmosphere }

    /// Airspeed (m/s).
    pub fn velocity(&self) -> f64 {
        self.mach * self.atmosphere.sound_speed
    }

    /// Dynamic pressure (Pa).
    pub fn dynamic_pressure(&self) -> f64 {
        0.5 * self.atmosphere.density * pow2(self.velocity())
    }

    /// Reynolds number for a characteristic length (m).
    pub fn reynolds(&self, length: f64) -> f64 {
        self.velocity() * length / self.atmosphere.kinematic_viscosity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn reference_area_from_length() {
        let fc = FlightConditions::new(0.05);
        assert_relative_eq!(fc.ref_area(), PI * 0.025 * 0.025);
    }

    #[test]
    fn aoa_is_clamped_and_sinc_defined_at_zero() {
        let mut fc = FlightConditions::new(0.05);
        fc.set_aoa(-0.2);
        assert_eq!(fc.aoa(), 0.0);
        assert_eq!(fc.sinc_aoa(), 1.0);
        fc.set_aoa(4.0);
        assert_eq!(fc.aoa(), PI);
        fc.set_aoa(0.5);
        assert_relative_eq!(fc.sinc_aoa(), 0.5_f64.sin() / 0.5);
    }

    #[test]
    fn beta_never_below_minimum() {
        let mut fc = FlightConditions::new(0.05);
        fc.set_mach(1.0);
        assert_eq!(fc.beta(), MIN_BETA);
        fc.set_mach(2.0);
        assert_relative_eq!(fc.beta(), 3.0_f64.sqrt());
        fc.set_mach(0.6);
        assert_relative_eq!(fc.beta(), 0.8);
    }

    #[test]
    fn velocity_round_trips_through_mach() {
        let mut fc = FlightConditions::new(0.05);
        fc.set_velocity(100.0);
        assert_relative_eq!(fc.velocity(), 100.0, epsilon = 1e-9);
        assert_relative_eq!(fc.dynamic_pressure(), 0.5 * 1.225 * 1e4, max_relative = 1e-3);
    }
}
