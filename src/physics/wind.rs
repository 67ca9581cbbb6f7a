use nalgebra::Vector3;

/// Wind velocity source (launch-site frame: x east, y north, z up).
pub trait WindModel {
    fn velocity(&self, time: f64, altitude: f64) -> Vector3<f64>;
}

/// Steady horizontal wind.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantWind {
    pub speed: f64,     // m/s
    pub direction: f64, // rad, heading the air moves toward, clockwise from north
}

impl ConstantWind {
    pub fn new(speed: f64, direction: f64) -> Self {
        Self { speed, direction }
    }
}

impl WindModel for ConstantWind {
    fn velocity(&self, _time: f64, _altitude: f64) -> Vector3<f64> {
        Vector3::new(
            self.speed * self.direction.sin(),
            self.speed * self.direction.cos(),
            0.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn east_wind_blows_along_x() {
        let w = ConstantWind::new(5.0, FRAC_PI_2).velocity(0.0, 100.0);
        assert!((w.x - 5.0).abs() < 1e-12);
        assert!(w.y.abs() < 1e-12);
    }

    #[test]
    fn calm_is_zero() {
        assert_eq!(ConstantWind::default().velocity(3.0, 0.0), Vector3::zeros());
    }
}
