use crate::aero::warning::{Warning, WarningSet};
use crate::error::SimulationError;
use crate::util::{pow2, EPSILON};
use crate::vehicle::{CrossSection, FinSet};

/// Number of spanwise bins the fin planform is reduced to.
pub const DIVISIONS: usize = 48;

// ---------------------------------------------------------------------------
// Fin planform reduction
// ---------------------------------------------------------------------------

/// Cached planform properties of one fin of a fin set. All lengths are
/// relative to the root chord leading edge.
#[derive(Debug, Clone)]
pub struct FinGeometry {
    pub fin_count: u32,
    pub span: f64,
    pub fin_area: f64,       // m^2, one fin
    pub aspect_ratio: f64,
    pub mac_length: f64,
    pub mac_lead: f64,       // x of the MAC leading edge
    pub mac_span: f64,       // spanwise position of the MAC
    pub cos_gamma: f64,      // mid-chord sweep
    pub cos_gamma_lead: f64, // leading-edge sweep
    pub roll_sum: f64,       // ∫ c(y) (r + y)^2 dy
    pub chord_lead: [f64; DIVISIONS],
    pub chord_trail: [f64; DIVISIONS],
    pub chord_length: [f64; DIVISIONS],
    pub thickness: f64,
    pub body_radius: f64,
    pub cant_angle: f64,
    pub base_rotation: f64,
    pub cross_section: CrossSection,
    pub warnings: WarningSet,
}

impl FinGeometry {
    pub fn new(fins: &FinSet, body_radius: f64) -> Self {
        let span = fins.span();
        let fin_area = polygon_area(&fins.points_with_root());
        let mut warnings = WarningSet::new();

        let aspect_ratio = if fin_area > EPSILON {
            2.0 * pow2(span) / fin_area
        } else {
            warnings.add(Warning::ZeroAreaFin);
            0.0
        };

        if is_jagged(&fins.points) {
            warnings.add(Warning::JaggedFin);
        }
        if body_radius > 0.0 && fins.thickness > body_radius / 2.0 {
            warnings.add(Warning::ThickFin);
        }

        let (chord_lead, chord_trail, chord_length) = chord_distribution(&fins.points_with_root(), span);

        let mut geom = FinGeometry {
            fin_count: fins.fin_count,
            span,
            fin_area,
            aspect_ratio,
            mac_length: 0.0,
            mac_lead: 0.0,
            mac_span: 0.0,
            cos_gamma: 0.0,
            cos_gamma_lead: 0.0,
            roll_sum: 0.0,
            chord_lead,
            chord_trail,
            chord_length,
            thickness: fins.thickness,
            body_radius,
            cant_angle: fins.cant_angle,
            base_rotation: fins.base_rotation,
            cross_section: fins.cross_section,
            warnings,
        };
        geom.integrate();
        geom
    }

    /// Axial position of the MAC mid-chord.
    pub fn midchord_pos(&self) -> f64 {
        self.mac_lead + 0.5 * self.mac_length
    }

    fn integrate(&mut self) {
        let dy = self.span / (DIVISIONS - 1) as f64;
        let r = self.body_radius;
        let (mut mac_length, mut mac_span, mut mac_lead, mut area) = (0.0, 0.0, 0.0, 0.0);
        let (mut roll_sum, mut cos_gamma, mut cos_gamma_lead) = (0.0, 0.0, 0.0);

        for i in 0..DIVISIONS {
            let y = i as f64 * dy;
            // leading to trailing edge, including any gaps of a jagged outline
            let len = self.chord_trail[i] - self.chord_lead[i];
            mac_length += len * len;
            mac_span += y * len;
            mac_lead += self.chord_lead[i] * len;
            area += len;
            roll_sum += self.chord_length[i] * pow2(r + y);

            if i > 0 && dy > 0.0 {
                let mid = (self.chord_trail[i] + self.chord_lead[i]) / 2.0;
                let prev_mid = (self.chord_trail[i - 1] + self.chord_lead[i - 1]) / 2.0;
                cos_gamma += dy / (mid - prev_mid).hypot(dy);
                let dx_lead = self.chord_lead[i] - self.chord_lead[i - 1];
                cos_gamma_lead += dy / dx_lead.hypot(dy);
            }
        }

        mac_length *= dy;
        mac_span *= dy;
        mac_lead *= dy;
        area *= dy;
        roll_sum *= dy;

        if area > EPSILON {
            mac_length /= area;
            mac_span /= area;
            mac_lead /= area;
        } else {
            mac_length = 0.0;
            mac_span = 0.0;
            mac_lead = 0.0;
        }

        self.mac_length = mac_length;
        self.mac_span = mac_span;
        self.mac_lead = mac_lead;
        self.roll_sum = roll_sum;
        self.cos_gamma = cos_gamma / (DIVISIONS - 1) as f64;
        self.cos_gamma_lead = cos_gamma_lead / (DIVISIONS - 1) as f64;
    }
}

/// Leading edge, trailing edge and chord length in each spanwise bin.
#[allow(clippy::type_complexity)]
fn chord_distribution(
    points: &[(f64, f64)],
    span: f64,
) -> ([f64; DIVISIONS], [f64; DIVISIONS], [f64; DIVISIONS]) {
    let mut lead = [f64::INFINITY; DIVISIONS];
    let mut trail = [f64::NEG_INFINITY; DIVISIONS];
    let mut length = [0.0; DIVISIONS];
    let last = (DIVISIONS - 1) as isize;

    for edge in points.windows(2) {
        let (x1, y1) = edge[0];
        let (x2, y2) = edge[1];
        if (y1 - y2).abs() < 0.001 {
            continue;
        }

        let bin = |y: f64| ((y * 1.0001 / span * last as f64) as isize).clamp(0, last) as usize;
        let (mut i1, mut i2) = (bin(y1), bin(y2));
        if i1 > i2 {
            std::mem::swap(&mut i1, &mut i2);
        }

        for i in i1..=i2 {
            let y = i as f64 * span / last as f64;
            let x = ((y - y2) / (y1 - y2) * x1 + (y1 - y) / (y1 - y2) * x2)
                .clamp(x1.min(x2), x1.max(x2));
            lead[i] = lead[i].min(x);
            trail[i] = trail[i].max(x);
            if y1 < y2 {
                length[i] -= x;
            } else {
                length[i] += x;
            }
        }
    }

    for i in 0..DIVISIONS {
        if !lead[i].is_finite() {
            lead[i] = 0.0;
        }
        if !trail[i].is_finite() {
            trail[i] = 0.0;
        }
        if length[i].is_nan() || length[i] < 0.0 {
            length[i] = 0.0;
        }
        if length[i] > trail[i] - lead[i] {
            length[i] = trail[i] - lead[i];
        }
    }

    (lead, trail, length)
}

/// Area of a closed polygon (shoelace formula).
fn polygon_area(points: &[(f64, f64)]) -> f64 {
    let twice: f64 = points
        .windows(2)
        .map(|w| w[0].0 * w[1].1 - w[1].0 * w[0].1)
        .sum();
    (twice / 2.0).abs()
}

/// An outline is jagged if it moves outward again after having moved inward.
fn is_jagged(points: &[(f64, f64)]) -> bool {
    let mut down = false;
    for w in points.windows(2) {
        if w[1].1 > w[0].1 + 0.001 && down {
            return true;
        }
        if w[1].1 < w[0].1 - 0.001 {
            down = true;
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Fin-fin interference
// ---------------------------------------------------------------------------

/// Axial extent of a fin set root chord (m, absolute).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxialExtent {
    pub lead: f64,
    pub trail: f64,
}

/// Number of fins interfering with a fin set: the fins of every set on the
/// same body whose root overlaps this one's. `sets` must include the set
/// itself.
pub fn interference_fin_count<I>(
    own: AxialExtent,
    own_count: u32,
    sets: I,
) -> Result<u32, SimulationError>
where
    I: IntoIterator<Item = (AxialExtent, u32)>,
{
    if own.trail - own.lead < 0.007 {
        return Ok(own_count);
    }
    let count: u32 = sets
        .into_iter()
        .filter(|(e, _)| e.lead < own.trail - 0.005 && e.trail > own.lead + 0.005)
        .map(|(_, n)| n)
        .sum();
    if count < own_count {
        return Err(SimulationError::InternalConsistency(format!(
            "interference fin count {} is below the set's own fin count {}",
            count, own_count
        )));
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rectangular(chord: f64, span: f64) -> FinSet {
        FinSet::trapezoid(4, chord, chord, 0.0, span, 0.002)
    }

    #[test]
    fn rectangular_fin_geometry() {
        let g = FinGeometry::new(&rectangular(0.1, 0.05), 0.02);
        assert_relative_eq!(g.fin_area, 0.005, epsilon = 1e-12);
        assert_relative_eq!(g.aspect_ratio, 2.0 * 0.0025 / 0.005, epsilon = 1e-12);
        assert_relative_eq!(g.mac_length, 0.1, epsilon = 1e-9);
        assert_relative_eq!(g.mac_lead, 0.0, epsilon = 1e-9);
        assert_relative_eq!(g.mac_span, 0.025, epsilon = 1e-3);
        assert_relative_eq!(g.cos_gamma, 1.0, epsilon = 1e-12);
        assert!(g.warnings.is_empty());
    }

    #[test]
    fn trapezoid_mac_matches_closed_form() {
        // root 0.1, tip 0.05, sweep 0.05, span 0.08
        let g = FinGeometry::new(&FinSet::trapezoid(3, 0.1, 0.05, 0.05, 0.08, 0.002), 0.025);
        let (cr, ct) = (0.1_f64, 0.05_f64);
        let mac = 2.0 / 3.0 * (cr + ct - cr * ct / (cr + ct));
        assert_relative_eq!(g.fin_area, 0.006, epsilon = 1e-12);
        assert_relative_eq!(g.mac_length, mac, max_relative = 0.01);
        let lead_sweep = (0.05_f64).atan2(0.08).cos();
        assert_relative_eq!(g.cos_gamma_lead, lead_sweep, max_relative = 1e-6);
    }

    #[test]
    fn chord_lengths_never_negative() {
        let g = FinGeometry::new(&FinSet::trapezoid(3, 0.07, 0.02, 0.06, 0.05, 0.002), 0.02);
        for i in 0..DIVISIONS {
            assert!(g.chord_length[i] >= 0.0);
            assert!(g.chord_length[i] <= g.chord_trail[i] - g.chord_lead[i] + 1e-12);
        }
    }

    #[test]
    fn thick_fin_warning() {
        let fins = FinSet::trapezoid(3, 0.05, 0.03, 0.02, 0.05, 0.015);
        let g = FinGeometry::new(&fins, 0.025);
        assert!(g.warnings.contains(&Warning::ThickFin));
    }

    #[test]
    fn jagged_fin_warning() {
        let fins = FinSet::new(
            3,
            vec![(0.0, 0.0), (0.02, 0.05), (0.04, 0.02), (0.06, 0.05), (0.08, 0.0)],
            0.002,
        );
        let g = FinGeometry::new(&fins, 0.02);
        assert!(g.warnings.contains(&Warning::JaggedFin));
        assert!(!FinGeometry::new(&rectangular(0.05, 0.05), 0.02)
            .warnings
            .contains(&Warning::JaggedFin));
    }

    #[test]
    fn jagged_fin_mac_spans_the_gap() {
        let fins = FinSet::new(
            3,
            vec![(0.0, 0.0), (0.02, 0.05), (0.04, 0.02), (0.06, 0.05), (0.08, 0.0)],
            0.002,
        );
        let g = FinGeometry::new(&fins, 0.02);
        let width: Vec<f64> = (0..DIVISIONS).map(|i| g.chord_trail[i] - g.chord_lead[i]).collect();
        let expected = width.iter().map(|w| w * w).sum::<f64>() / width.iter().sum::<f64>();
        assert_relative_eq!(g.mac_length, expected, max_relative = 1e-9);

        // the notch makes the filled chord shorter than the edge-to-edge width
        let filled = g.chord_length.iter().map(|c| c * c).sum::<f64>()
            / g.chord_length.iter().sum::<f64>();
        assert!(g.mac_length > filled + 1e-4, "mac {} filled {}", g.mac_length, filled);
    }

    #[test]
    fn zero_span_is_degenerate_not_nan() {
        let fins = FinSet::new(3, vec![(0.0, 0.0), (0.05, 0.0)], 0.002);
        let g = FinGeometry::new(&fins, 0.02);
        assert_eq!(g.aspect_ratio, 0.0);
        assert_eq!(g.mac_length, 0.0);
        assert!(g.cos_gamma.is_finite());
        assert!(g.warnings.contains(&Warning::ZeroAreaFin));
    }

    #[test]
    fn interference_without_overlapping_siblings() {
        let own = AxialExtent { lead: 0.5, trail: 0.6 };
        let other = AxialExtent { lead: 0.1, trail: 0.2 };
        let n = interference_fin_count(own, 3, [(own, 3), (other, 4)]).unwrap();
        assert_eq!(n, 3);
    }

    #[test]
    fn interference_with_overlapping_sibling() {
        let own = AxialExtent { lead: 0.5, trail: 0.6 };
        let other = AxialExtent { lead: 0.52, trail: 0.62 };
        assert_eq!(interference_fin_count(own, 3, [(own, 3), (other, 3)]).unwrap(), 6);
    }

    #[test]
    fn interference_short_root_uses_own_count() {
        let own = AxialExtent { lead: 0.5, trail: 0.505 };
        assert_eq!(interference_fin_count(own, 4, []).unwrap(), 4);
    }

    #[test]
    fn interference_below_own_count_is_fatal() {
        let own = AxialExtent { lead: 0.5, trail: 0.6 };
        let err = interference_fin_count(own, 3, []).unwrap_err();
        assert!(matches!(err, SimulationError::InternalConsistency(_)));
    }
}
