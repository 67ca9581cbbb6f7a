use super::motor::MotorMount;
use super::shape::TransitionShape;

// ---------------------------------------------------------------------------
// Component identity and surface finish
// ---------------------------------------------------------------------------

/// Index of a component in its rocket's component arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub usize);

/// Surface finish, determining the roughness-limited skin friction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Finish {
    Rough,
    Unfinished,
    #[default]
    Normal,
    Smooth,
    Polished,
    Mirror,
}

impl Finish {
    /// Average roughness height (m).
    pub fn roughness(self) -> f64 {
        match self {
            Finish::Rough => 500e-6,
            Finish::Unfinished => 150e-6,
            Finish::Normal => 60e-6,
            Finish::Smooth => 20e-6,
            Finish::Polished => 2e-6,
            Finish::Mirror => 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Component shape descriptions
// ---------------------------------------------------------------------------

/// Nose cone or transition between two radii.
#[derive(Debug, Clone)]
pub struct Transition {
    pub shape: TransitionShape,
    pub shape_param: f64,
    pub length: f64,       // m
    pub fore_radius: f64,  // m
    pub aft_radius: f64,   // m
    pub thickness: f64,    // m, wall
}

impl Transition {
    pub fn new(shape: TransitionShape, length: f64, fore_radius: f64, aft_radius: f64) -> Self {
        Self {
            shape,
            shape_param: 1.0,
            length,
            fore_radius,
            aft_radius,
            thickness: 0.002,
        }
    }

    /// Nose cone of given base radius.
    pub fn nose(shape: TransitionShape, length: f64, radius: f64) -> Self {
        Self::new(shape, length, 0.0, radius)
    }

    pub fn param(mut self, v: f64) -> Self { self.shape_param = v; self }
    pub fn thickness(mut self, v: f64) -> Self { self.thickness = v; self }

    /// Outer radius at distance `x` aft of the fore end.
    pub fn radius_at(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, self.length);
        let (r0, r1) = (self.fore_radius, self.aft_radius);
        if r0 == r1 {
            r0
        } else if r0 < r1 {
            r0 + self.shape.radius(x, r1 - r0, self.length, self.shape_param)
        } else {
            r1 + self.shape.radius(self.length - x, r0 - r1, self.length, self.shape_param)
        }
    }
}

/// Cylindrical body tube, optionally carrying a motor.
#[derive(Debug, Clone)]
pub struct BodyTube {
    pub length: f64,       // m
    pub outer_radius: f64, // m
    pub thickness: f64,    // m
    pub motor: Option<MotorMount>,
}

impl BodyTube {
    pub fn new(length: f64, outer_radius: f64) -> Self {
        Self { length, outer_radius, thickness: 0.001, motor: None }
    }

    pub fn thickness(mut self, v: f64) -> Self { self.thickness = v; self }
}

/// Fin cross-section profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossSection {
    #[default]
    Square,
    Rounded,
    Airfoil,
}

/// Set of identical fins distributed evenly around a body tube.
///
/// The outline runs from the root leading edge `(0, 0)` out along the span
/// and back to the root trailing edge `(root_chord, 0)`; the root edge itself
/// is implied.
#[derive(Debug, Clone)]
pub struct FinSet {
    pub fin_count: u32,
    pub points: Vec<(f64, f64)>, // (x aft of root LE, y outward), m
    pub thickness: f64,          // m
    pub cross_section: CrossSection,
    pub cant_angle: f64,         // rad
    pub base_rotation: f64,      // rad, angular position of the first fin
}

impl FinSet {
    pub fn new(fin_count: u32, points: Vec<(f64, f64)>, thickness: f64) -> Self {
        Self {
            fin_count,
            points,
            thickness,
            cross_section: CrossSection::Square,
            cant_angle: 0.0,
            base_rotation: 0.0,
        }
    }

    /// Trapezoidal fins; `sweep` is the leading-edge offset of the tip chord.
    pub fn trapezoid(
        fin_count: u32,
        root_chord: f64,
        tip_chord: f64,
        sweep: f64,
        span: f64,
        thickness: f64,
    ) -> Self {
        let points = vec![
            (0.0, 0.0),
            (sweep, span),
            (sweep + tip_chord, span),
            (root_chord, 0.0),
        ];
        Self::new(fin_count, points, thickness)
    }

    pub fn cross_section(mut self, v: CrossSection) -> Self { self.cross_section = v; self }
    pub fn cant(mut self, v: f64) -> Self { self.cant_angle = v; self }
    pub fn base_rotation(mut self, v: f64) -> Self { self.base_rotation = v; self }

    pub fn root_chord(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.0)
    }

    pub fn span(&self) -> f64 {
        self.points.iter().map(|p| p.1).fold(0.0, f64::max)
    }

    /// Outline with the root edge closing the polygon.
    pub fn points_with_root(&self) -> Vec<(f64, f64)> {
        let mut pts = self.points.clone();
        if let (Some(&first), Some(&last)) = (self.points.first(), self.points.last()) {
            if first != last {
                pts.push(first);
            }
        }
        pts
    }
}

/// Launch lug: a short open tube mounted on the outside of the airframe.
#[derive(Debug, Clone)]
pub struct LaunchLug {
    pub length: f64,       // m
    pub outer_radius: f64, // m
    pub thickness: f64,    // m
}

impl LaunchLug {
    pub fn new(length: f64, outer_radius: f64, thickness: f64) -> Self {
        Self { length, outer_radius, thickness }
    }

    pub fn inner_radius(&self) -> f64 {
        (self.outer_radius - self.thickness).max(0.0)
    }
}

/// Rail button: two flanges joined by a narrower neck.
#[derive(Debug, Clone)]
pub struct RailButton {
    pub outer_diameter: f64, // m, flange
    pub inner_diameter: f64, // m, neck
    pub total_height: f64,   // m
    pub base_height: f64,    // m, lower flange
    pub flange_height: f64,  // m, upper flange
}

impl RailButton {
    pub fn new(outer_diameter: f64, inner_diameter: f64, total_height: f64) -> Self {
        Self {
            outer_diameter,
            inner_diameter,
            total_height,
            base_height: total_height * 0.25,
            flange_height: total_height * 0.25,
        }
    }

    /// Height of the neck between the flanges.
    pub fn inner_height(&self) -> f64 {
        (self.total_height - self.base_height - self.flange_height).max(0.0)
    }
}

/// What deploys a recovery device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeployTrigger {
    /// A fixed time after launch.
    Launch,
    /// Motor ejection charge of the same stage.
    Ejection,
    Apogee,
    /// Descending through the given height above the launch site (m).
    Altitude(f64),
    /// Separation of the stage carrying the device.
    StageSeparation,
    Never,
}

/// Parachute recovery device.
#[derive(Debug, Clone)]
pub struct Parachute {
    pub cd: f64,
    pub diameter: f64, // m
    pub trigger: DeployTrigger,
    pub delay: f64,    // s
}

impl Parachute {
    pub fn new(diameter: f64, cd: f64) -> Self {
        Self { cd, diameter, trigger: DeployTrigger::Ejection, delay: 0.0 }
    }

    pub fn deploy(mut self, trigger: DeployTrigger, delay: f64) -> Self {
        self.trigger = trigger;
        self.delay = delay;
        self
    }

    pub fn area(&self) -> f64 {
        std::f64::consts::PI * (self.diameter / 2.0).powi(2)
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum ComponentKind {
    NoseCone(Transition),
    Transition(Transition),
    BodyTube(BodyTube),
    FinSet(FinSet),
    LaunchLug(LaunchLug),
    RailButton(RailButton),
    Parachute(Parachute),
}

/// One node of the rocket component arena.
#[derive(Debug, Clone)]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    pub stage: usize,
    pub parent: Option<ComponentId>,
    pub position: f64, // m, absolute x of the fore end (aft of nose tip)
    pub mass: f64,     // kg
    pub finish: Finish,
    pub kind: ComponentKind,
    pub(crate) shape_version: u64,
}

impl Component {
    /// Counter bumped on every shape mutation.
    pub fn shape_version(&self) -> u64 {
        self.shape_version
    }

    /// Axial length (m).
    pub fn length(&self) -> f64 {
        match &self.kind {
            ComponentKind::NoseCone(t) | ComponentKind::Transition(t) => t.length,
            ComponentKind::BodyTube(b) => b.length,
            ComponentKind::FinSet(f) => f.root_chord(),
            ComponentKind::LaunchLug(l) => l.length,
            ComponentKind::RailButton(b) => b.outer_diameter,
            ComponentKind::Parachute(_) => 0.0,
        }
    }

    /// Nose cones, transitions and body tubes form the airframe.
    pub fn is_body(&self) -> bool {
        matches!(
            self.kind,
            ComponentKind::NoseCone(_) | ComponentKind::Transition(_) | ComponentKind::BodyTube(_)
        )
    }

    pub fn is_aerodynamic(&self) -> bool {
        !matches!(self.kind, ComponentKind::Parachute(_))
    }

    /// Fore and aft outer radius of airframe components.
    pub fn body_radii(&self) -> Option<(f64, f64)> {
        match &self.kind {
            ComponentKind::NoseCone(t) | ComponentKind::Transition(t) => {
                Some((t.fore_radius, t.aft_radius))
            }
            ComponentKind::BodyTube(b) => Some((b.outer_radius, b.outer_radius)),
            _ => None,
        }
    }

    /// Distance from the fore end to this component's own CG (m).
    pub fn local_cg(&self) -> f64 {
        match &self.kind {
            ComponentKind::NoseCone(t) => t.length * 2.0 / 3.0,
            ComponentKind::Transition(t) => {
                // frustum volume centroid weighted toward the larger end
                let (a, b) = (t.fore_radius, t.aft_radius);
                let denom = a * a + a * b + b * b;
                if denom > 0.0 {
                    t.length * (a * a + 2.0 * a * b + 3.0 * b * b) / (4.0 * denom)
                } else {
                    t.length / 2.0
                }
            }
            _ => self.length() / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trapezoid_outline() {
        let fins = FinSet::trapezoid(3, 0.04, 0.02, 0.01, 0.1, 0.002);
        assert_eq!(fins.root_chord(), 0.04);
        assert_eq!(fins.span(), 0.1);
        let closed = fins.points_with_root();
        assert_eq!(closed.len(), 5);
        assert_eq!(closed[0], closed[4]);
    }

    #[test]
    fn boattail_radius_decreases() {
        let t = Transition::new(TransitionShape::Conical, 0.1, 0.03, 0.02);
        assert!((t.radius_at(0.0) - 0.03).abs() < 1e-12);
        assert!((t.radius_at(0.05) - 0.025).abs() < 1e-12);
        assert!((t.radius_at(0.1) - 0.02).abs() < 1e-12);
    }

    #[test]
    fn shoulder_radius_increases() {
        let t = Transition::new(TransitionShape::Conical, 0.1, 0.02, 0.03);
        assert!((t.radius_at(0.05) - 0.025).abs() < 1e-12);
    }

    #[test]
    fn rail_button_neck_height() {
        let b = RailButton::new(0.01, 0.006, 0.008);
        assert!((b.inner_height() - 0.004).abs() < 1e-12);
    }

    #[test]
    fn frustum_cg_is_mid_length_for_cylinder() {
        let t = Transition::new(TransitionShape::Conical, 0.2, 0.03, 0.03);
        let c = Component {
            id: ComponentId(0),
            name: "t".into(),
            stage: 0,
            parent: None,
            position: 0.0,
            mass: 0.1,
            finish: Finish::Normal,
            kind: ComponentKind::Transition(t),
            shape_version: 0,
        };
        assert!((c.local_cg() - 0.1).abs() < 1e-12);
    }
}
