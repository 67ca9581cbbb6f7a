use std::f64::consts::PI;

use crate::util::pow2;
use crate::vehicle::{LaunchLug, RailButton};

// ---------------------------------------------------------------------------
// Open tube (launch lug) and rail button reduction
// ---------------------------------------------------------------------------

/// Cached properties of an open tube exposed to the airflow.
#[derive(Debug, Clone)]
pub struct TubeGeometry {
    pub length: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub inner_area: f64,
    /// Frontal area of the wall.
    pub frontal_area: f64,
    pub wet_area: f64,
}

impl TubeGeometry {
    pub fn new(length: f64, outer_radius: f64, inner_radius: f64) -> Self {
        let inner_radius = inner_radius.clamp(0.0, outer_radius);
        Self {
            length,
            inner_radius,
            outer_radius,
            inner_area: PI * pow2(inner_radius),
            frontal_area: PI * (pow2(outer_radius) - pow2(inner_radius)),
            wet_area: 2.0 * PI * (outer_radius + inner_radius) * length,
        }
    }

    pub fn launch_lug(lug: &LaunchLug) -> Self {
        Self::new(lug.length, lug.outer_radius, lug.inner_radius())
    }

    pub fn inner_diameter(&self) -> f64 {
        2.0 * self.inner_radius
    }
}

/// Cached properties of a rail button.
#[derive(Debug, Clone)]
pub struct RailButtonGeometry {
    /// Side-on silhouette: outer height × flange diameter minus the notch.
    pub reference_area: f64,
}

impl RailButtonGeometry {
    pub fn new(button: &RailButton) -> Self {
        let outer_area = button.total_height * button.outer_diameter;
        let notch_area = (button.outer_diameter - button.inner_diameter) * button.inner_height();
        Self { reference_area: (outer_area - notch_area).max(0.0) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lug_areas() {
        let g = TubeGeometry::launch_lug(&LaunchLug::new(0.03, 0.003, 0.0005));
        assert_relative_eq!(g.inner_area, PI * 0.0025 * 0.0025);
        assert_relative_eq!(g.frontal_area, PI * (0.003 * 0.003 - 0.0025 * 0.0025));
    }

    #[test]
    fn solid_lug_has_no_inner_area() {
        let g = TubeGeometry::new(0.03, 0.003, 0.0);
        assert_eq!(g.inner_area, 0.0);
    }

    #[test]
    fn rail_button_notch_is_removed() {
        let b = RailButton::new(0.010, 0.006, 0.008);
        let g = RailButtonGeometry::new(&b);
        assert_relative_eq!(g.reference_area, 0.008 * 0.010 - 0.004 * 0.004);
    }
}
