use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Simulation options
// ---------------------------------------------------------------------------

/// Launch site and integrator settings of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOptions {
    pub launch_rod_length: f64,    // m
    pub launch_rod_angle: f64,     // rad from vertical
    pub launch_rod_direction: f64, // rad, compass heading, clockwise from north
    pub launch_altitude: f64,      // m above sea level
    pub wind_speed: f64,           // m/s
    pub wind_direction: f64,       // rad, heading the air moves toward
    pub time_step: f64,            // s
    pub max_angle_step: f64,       // rad of rotation per step
    pub max_time: f64,             // s
    /// Motor configuration label; reported only.
    pub motor_configuration: Option<String>,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            launch_rod_length: 1.0,
            launch_rod_angle: 0.0,
            launch_rod_direction: 0.0,
            launch_altitude: 0.0,
            wind_speed: 0.0,
            wind_direction: 0.0,
            time_step: 0.01,
            max_angle_step: 3f64.to_radians(),
            max_time: 1200.0,
            motor_configuration: None,
        }
    }
}

impl SimulationOptions {
    pub fn rod_length(mut self, v: f64) -> Self { self.launch_rod_length = v; self }
    pub fn rod_angle(mut self, v: f64) -> Self { self.launch_rod_angle = v; self }
    pub fn rod_direction(mut self, v: f64) -> Self { self.launch_rod_direction = v; self }
    pub fn wind(mut self, speed: f64, direction: f64) -> Self {
        self.wind_speed = speed;
        self.wind_direction = direction;
        self
    }
    pub fn time_step(mut self, v: f64) -> Self { self.time_step = v; self }
    pub fn max_time(mut self, v: f64) -> Self { self.max_time = v; self }
}
