use std::f64::consts::PI;

use crate::util::{pow2, EPSILON};
use crate::vehicle::{Transition, TransitionShape};

/// Axial integration steps for volume and planform.
const SAMPLES: usize = 128;

// ---------------------------------------------------------------------------
// Symmetric body reduction (nose cone, transition, body tube)
// ---------------------------------------------------------------------------

/// Cached properties of an axially symmetric airframe component. Positions
/// are relative to the component's fore end.
#[derive(Debug, Clone)]
pub struct BodyGeometry {
    pub length: f64,
    pub fore_radius: f64,
    pub aft_radius: f64,
    /// Profile shape, `None` for a cylindrical tube.
    pub shape: Option<(TransitionShape, f64)>,
    /// length / (2 |aft - fore|); infinite for a tube.
    pub fineness: f64,
    pub frontal_area: f64,
    pub full_volume: f64,
    pub planform_area: f64,
    pub planform_center: f64,
    pub wet_area: f64,
    /// Sine of the local cone half-angle at 99% of the length.
    pub sin_phi: f64,
}

impl BodyGeometry {
    pub fn tube(length: f64, radius: f64) -> Self {
        Self {
            length,
            fore_radius: radius,
            aft_radius: radius,
            shape: None,
            fineness: f64::INFINITY,
            frontal_area: 0.0,
            full_volume: PI * pow2(radius) * length,
            planform_area: 2.0 * radius * length,
            planform_center: length / 2.0,
            wet_area: 2.0 * PI * radius * length,
            sin_phi: 0.0,
        }
    }

    pub fn transition(t: &Transition) -> Self {
        let length = t.length;
        let (fore, aft) = (t.fore_radius, t.aft_radius);

        let mut full_volume = 0.0;
        let mut planform_area = 0.0;
        let mut planform_moment = 0.0;
        let mut wet_area = 0.0;
        let dx = length / SAMPLES as f64;
        let mut r0 = t.radius_at(0.0);
        for i in 1..=SAMPLES {
            let x0 = (i - 1) as f64 * dx;
            let x1 = i as f64 * dx;
            let r1 = t.radius_at(x1);
            full_volume += PI * dx * (r0 * r0 + r0 * r1 + r1 * r1) / 3.0;
            let strip = (r0 + r1) * dx;
            planform_area += strip;
            planform_moment += strip * (x0 + x1) / 2.0;
            wet_area += PI * (r0 + r1) * dx.hypot(r1 - r0);
            r0 = r1;
        }
        let planform_center = if planform_area > EPSILON {
            planform_moment / planform_area
        } else {
            length / 2.0
        };

        let r = t.radius_at(0.99 * length);
        let sin_phi = {
            let h = (aft - r).hypot(0.01 * length);
            if h > 0.0 { (aft - r) / h } else { 0.0 }
        };

        Self {
            length,
            fore_radius: fore,
            aft_radius: aft,
            shape: Some((t.shape, t.shape_param)),
            fineness: length / (2.0 * (aft - fore).abs()),
            frontal_area: (PI * (pow2(fore) - pow2(aft))).abs(),
            full_volume,
            planform_area,
            planform_center,
            wet_area,
            sin_phi,
        }
    }

    pub fn is_tube(&self) -> bool {
        (self.fore_radius - self.aft_radius).abs() < EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cone_volume_and_planform() {
        let t = Transition::nose(TransitionShape::Conical, 0.3, 0.05);
        let g = BodyGeometry::transition(&t);
        assert_relative_eq!(g.full_volume, PI * 0.0025 * 0.3 / 3.0, max_relative = 1e-9);
        assert_relative_eq!(g.planform_area, 0.05 * 0.3, max_relative = 1e-9);
        // triangle centroid at 2/3 from the tip
        assert_relative_eq!(g.planform_center, 0.2, max_relative = 1e-4);
        assert_relative_eq!(g.fineness, 3.0);
        assert_relative_eq!(g.frontal_area, PI * 0.0025);
        let half_angle = (0.05_f64).atan2(0.3);
        assert_relative_eq!(g.sin_phi, half_angle.sin(), max_relative = 1e-9);
    }

    #[test]
    fn tube_has_no_frontal_area() {
        let g = BodyGeometry::tube(0.5, 0.025);
        assert!(g.is_tube());
        assert_eq!(g.frontal_area, 0.0);
        assert_eq!(g.sin_phi, 0.0);
        assert!(g.fineness.is_infinite());
    }

    #[test]
    fn transition_with_equal_radii_is_a_tube() {
        let t = Transition::new(TransitionShape::Conical, 0.1, 0.025, 0.025 + 1e-12);
        assert!(BodyGeometry::transition(&t).is_tube());
        let t = Transition::new(TransitionShape::Conical, 0.1, 0.025, 0.02);
        assert!(!BodyGeometry::transition(&t).is_tube());
    }

    #[test]
    fn ogive_is_fuller_than_cone() {
        let cone = BodyGeometry::transition(&Transition::nose(TransitionShape::Conical, 0.2, 0.03));
        let ogive = BodyGeometry::transition(&Transition::nose(TransitionShape::Ogive, 0.2, 0.03));
        assert!(ogive.full_volume > cone.full_volume);
        // tangent ogive meets the body with zero slope
        assert!(ogive.sin_phi.abs() < cone.sin_phi);
    }
}
