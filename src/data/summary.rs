use crate::sim::FlightEventKind;

use super::branch::FlightDataBranch;
use super::types::FlightDataType;

/// Summary statistics computed from a flight data branch.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightSummary {
    pub max_altitude: f64,        // m
    pub time_to_apogee: f64,      // s
    pub max_velocity: f64,        // m/s
    pub max_acceleration: f64,    // m/s^2
    pub max_mach: f64,
    pub flight_time: f64,         // s
    pub ground_hit_velocity: f64, // m/s
    /// Velocity at launch rod clearance; NaN if the rod was never cleared.
    pub launch_rod_velocity: f64,
    /// Velocity at the first recovery deployment; NaN if none deployed.
    pub deployment_velocity: f64,
}

impl FlightSummary {
    /// Compute summary from branch data.
    pub fn from_branch(branch: &FlightDataBranch) -> Self {
        let max = |t| branch.maximum(t).unwrap_or(f64::NAN);

        let time_to_apogee = match branch.first_event(FlightEventKind::Apogee) {
            Some(e) => e.time,
            None => time_of_max(branch, FlightDataType::Altitude).unwrap_or(f64::NAN),
        };

        let flight_time = match branch.last_event(FlightEventKind::GroundHit) {
            Some(e) => e.time,
            None => branch.last(FlightDataType::Time).unwrap_or(f64::NAN),
        };

        let velocity_at = |kind| {
            branch
                .first_event(kind)
                .map(|e| value_at(branch, FlightDataType::TotalVelocity, e.time))
                .unwrap_or(f64::NAN)
        };

        let ground_hit_velocity = if branch.first_event(FlightEventKind::GroundHit).is_some() {
            branch.last(FlightDataType::TotalVelocity).unwrap_or(f64::NAN)
        } else {
            f64::NAN
        };

        FlightSummary {
            max_altitude: max(FlightDataType::Altitude),
            time_to_apogee,
            max_velocity: max(FlightDataType::TotalVelocity),
            max_acceleration: max(FlightDataType::TotalAcceleration),
            max_mach: max(FlightDataType::Mach),
            flight_time,
            ground_hit_velocity,
            launch_rod_velocity: velocity_at(FlightEventKind::LaunchRod),
            deployment_velocity: velocity_at(FlightEventKind::RecoveryDeviceDeployment),
        }
    }
}

/// Time of the largest value of a series.
fn time_of_max(branch: &FlightDataBranch, kind: FlightDataType) -> Option<f64> {
    let values = branch.get(kind)?;
    let times = branch.get(FlightDataType::Time)?;
    values
        .iter()
        .zip(times)
        .filter(|(v, _)| !v.is_nan())
        .max_by(|a, b| a.0.total_cmp(b.0))
        .map(|(_, t)| *t)
}

/// Value of a series at the first recorded point at or after `time`.
fn value_at(branch: &FlightDataBranch, kind: FlightDataType, time: f64) -> f64 {
    let (Some(values), Some(times)) = (branch.get(kind), branch.get(FlightDataType::Time)) else {
        return f64::NAN;
    };
    let i = times.partition_point(|&t| t < time - 1e-9);
    values.get(i).or(values.last()).copied().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::FlightEvent;

    fn simple_branch() -> FlightDataBranch {
        let mut b = FlightDataBranch::new("test");
        for (t, alt, v) in [(0.0, 0.0, 0.0), (1.0, 40.0, 60.0), (10.0, 5000.0, 0.5), (20.0, 0.0, 50.0)] {
            b.add_point();
            b.set_value(FlightDataType::Time, t);
            b.set_value(FlightDataType::Altitude, alt);
            b.set_value(FlightDataType::TotalVelocity, v);
        }
        b.add_event(FlightEvent::new(1.0, FlightEventKind::LaunchRod));
        b.add_event(FlightEvent::new(20.0, FlightEventKind::GroundHit));
        b
    }

    #[test]
    fn summary_computes_apogee() {
        let s = FlightSummary::from_branch(&simple_branch());
        assert!((s.max_altitude - 5000.0).abs() < 0.1);
        assert!((s.time_to_apogee - 10.0).abs() < 0.1);
        assert_eq!(s.flight_time, 20.0);
        assert_eq!(s.ground_hit_velocity, 50.0);
        assert_eq!(s.launch_rod_velocity, 60.0);
        assert!(s.deployment_velocity.is_nan());
        assert!(s.max_mach.is_nan());
    }
}
