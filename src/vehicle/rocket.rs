use super::component::{
    BodyTube, Component, ComponentId, ComponentKind, Finish, FinSet, LaunchLug, Parachute,
    RailButton, Transition,
};
use super::motor::MotorMount;

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// What separates a stage from the stage above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeparationTrigger {
    /// Ignition of the next stage's motor.
    #[default]
    UpperStageIgnition,
    Burnout,
    Ejection,
    Launch,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StageSeparation {
    pub trigger: SeparationTrigger,
    pub delay: f64, // s
}

#[derive(Debug, Clone)]
pub struct Stage {
    pub name: String,
    pub separation: StageSeparation,
}

/// Active/inactive flag per stage. Stage 0 is the topmost (sustainer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSet {
    active: Vec<bool>,
}

impl StageSet {
    pub fn all(count: usize) -> Self {
        Self { active: vec![true; count] }
    }

    pub fn is_active(&self, stage: usize) -> bool {
        self.active.get(stage).copied().unwrap_or(false)
    }

    /// Deactivate `stage` and every stage below it.
    pub fn deactivate_from(&mut self, stage: usize) {
        for flag in self.active.iter_mut().skip(stage) {
            *flag = false;
        }
    }

    /// Deactivate every stage above `stage`.
    pub fn deactivate_above(&mut self, stage: usize) {
        for flag in self.active.iter_mut().take(stage) {
            *flag = false;
        }
    }

    pub fn any_active(&self) -> bool {
        self.active.iter().any(|&a| a)
    }

    /// Lowest (aft-most) active stage.
    pub fn bottom(&self) -> Option<usize> {
        self.active.iter().rposition(|&a| a)
    }

    /// Topmost active stage.
    pub fn top(&self) -> Option<usize> {
        self.active.iter().position(|&a| a)
    }
}

// ---------------------------------------------------------------------------
// Rocket: component arena
// ---------------------------------------------------------------------------

/// Rocket geometry snapshot. Components live in an arena indexed by
/// `ComponentId`; airframe components are stored fore to aft.
#[derive(Debug, Clone)]
pub struct Rocket {
    pub name: String,
    components: Vec<Component>,
    stages: Vec<Stage>,
}

impl Rocket {
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.0)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Mutate a component's shape. Bumps its shape version so cached
    /// aerodynamic geometry is rebuilt.
    pub fn modify<F>(&mut self, id: ComponentId, f: F) -> bool
    where
        F: FnOnce(&mut ComponentKind),
    {
        match self.components.get_mut(id.0) {
            Some(c) => {
                f(&mut c.kind);
                c.shape_version += 1;
                true
            }
            None => false,
        }
    }

    pub fn children(&self, parent: ComponentId) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(move |c| c.parent == Some(parent))
    }

    /// Components belonging to active stages.
    pub fn active_components<'a>(
        &'a self,
        stages: &'a StageSet,
    ) -> impl Iterator<Item = &'a Component> + 'a {
        self.components.iter().filter(move |c| stages.is_active(c.stage))
    }

    /// Active airframe components ordered fore to aft.
    pub fn airframe<'a>(&'a self, stages: &'a StageSet) -> Vec<&'a Component> {
        let mut body: Vec<&Component> =
            self.active_components(stages).filter(|c| c.is_body()).collect();
        body.sort_by(|a, b| a.position.total_cmp(&b.position));
        body
    }

    /// Largest airframe diameter of the active stages (m).
    pub fn reference_length(&self, stages: &StageSet) -> f64 {
        self.airframe(stages)
            .iter()
            .filter_map(|c| c.body_radii())
            .map(|(a, b)| 2.0 * a.max(b))
            .fold(0.0, f64::max)
    }

    /// Axial extent of the active airframe: (fore, aft).
    pub fn airframe_extent(&self, stages: &StageSet) -> Option<(f64, f64)> {
        let body = self.airframe(stages);
        let fore = body.first()?.position;
        let aft = body
            .iter()
            .map(|c| c.position + c.length())
            .fold(f64::NEG_INFINITY, f64::max);
        Some((fore, aft))
    }

    /// Outer radius of a body component at absolute position `x`.
    pub fn body_radius_at(&self, id: ComponentId, x: f64) -> f64 {
        let Some(c) = self.component(id) else {
            return 0.0;
        };
        match &c.kind {
            ComponentKind::BodyTube(b) => b.outer_radius,
            ComponentKind::NoseCone(t) | ComponentKind::Transition(t) => t.radius_at(x - c.position),
            _ => 0.0,
        }
    }

    /// Body tubes carrying a motor, with their mounts.
    pub fn motor_mounts(&self) -> impl Iterator<Item = (&Component, &MotorMount)> {
        self.components.iter().filter_map(|c| match &c.kind {
            ComponentKind::BodyTube(BodyTube { motor: Some(m), .. }) => Some((c, m)),
            _ => None,
        })
    }

    pub fn parachutes(&self) -> impl Iterator<Item = (&Component, &Parachute)> {
        self.components.iter().filter_map(|c| match &c.kind {
            ComponentKind::Parachute(p) => Some((c, p)),
            _ => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Rocket builder
// ---------------------------------------------------------------------------

/// Assembles a rocket fore to aft. Airframe components are appended behind
/// the previous one; fins, lugs, buttons, parachutes and motors attach to
/// the most recent body tube.
pub struct RocketBuilder {
    name: String,
    components: Vec<Component>,
    stages: Vec<Stage>,
    cursor: f64,
    finish: Finish,
    last_tube: Option<ComponentId>,
}

impl RocketBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: vec![],
            stages: vec![Stage { name: "Sustainer".into(), separation: StageSeparation::default() }],
            cursor: 0.0,
            finish: Finish::Normal,
            last_tube: None,
        }
    }

    /// Rename the current (initially the only) stage.
    pub fn stage_name(mut self, name: impl Into<String>) -> Self {
        if let Some(stage) = self.stages.last_mut() {
            stage.name = name.into();
        }
        self
    }

    /// Start a new stage below the current one.
    pub fn stage(mut self, name: impl Into<String>, separation: StageSeparation) -> Self {
        self.stages.push(Stage { name: name.into(), separation });
        self.last_tube = None;
        self
    }

    /// Surface finish applied to subsequently added components.
    pub fn finish(mut self, finish: Finish) -> Self {
        self.finish = finish;
        self
    }

    pub fn nose_cone(mut self, nose: Transition, mass: f64) -> Self {
        let length = nose.length;
        self.push_body("Nose cone", mass, length, ComponentKind::NoseCone(nose));
        self
    }

    pub fn transition(mut self, transition: Transition, mass: f64) -> Self {
        let length = transition.length;
        self.push_body("Transition", mass, length, ComponentKind::Transition(transition));
        self
    }

    pub fn body_tube(mut self, tube: BodyTube, mass: f64) -> Self {
        let length = tube.length;
        let id = self.push_body("Body tube", mass, length, ComponentKind::BodyTube(tube));
        self.last_tube = Some(id);
        self
    }

    /// Load a motor into the last body tube.
    pub fn motor(mut self, mount: MotorMount) -> Self {
        if let Some(id) = self.last_tube {
            if let ComponentKind::BodyTube(tube) = &mut self.components[id.0].kind {
                tube.motor = Some(mount);
            }
        }
        self
    }

    /// Fins flush with the aft end of the last body tube.
    pub fn fins(self, fins: FinSet, mass: f64) -> Self {
        let root = fins.root_chord();
        let offset = self.last_tube_length() - root;
        self.fins_at(fins, offset, mass)
    }

    /// Fins with the root leading edge `offset` aft of the last tube's fore end.
    pub fn fins_at(mut self, fins: FinSet, offset: f64, mass: f64) -> Self {
        self.push_child("Fins", offset, mass, ComponentKind::FinSet(fins));
        self
    }

    pub fn launch_lug(mut self, lug: LaunchLug, offset: f64, mass: f64) -> Self {
        self.push_child("Launch lug", offset, mass, ComponentKind::LaunchLug(lug));
        self
    }

    pub fn rail_button(mut self, button: RailButton, offset: f64, mass: f64) -> Self {
        self.push_child("Rail button", offset, mass, ComponentKind::RailButton(button));
        self
    }

    pub fn parachute(mut self, chute: Parachute, offset: f64, mass: f64) -> Self {
        self.push_child("Parachute", offset, mass, ComponentKind::Parachute(chute));
        self
    }

    pub fn build(self) -> Rocket {
        Rocket { name: self.name, components: self.components, stages: self.stages }
    }

    fn last_tube_length(&self) -> f64 {
        self.last_tube.map_or(0.0, |id| self.components[id.0].length())
    }

    fn push_body(&mut self, name: &str, mass: f64, length: f64, kind: ComponentKind) -> ComponentId {
        let position = self.cursor;
        self.cursor += length;
        self.push(name, None, position, mass, kind)
    }

    fn push_child(&mut self, name: &str, offset: f64, mass: f64, kind: ComponentKind) {
        let (parent, base) = match self.last_tube {
            Some(id) => (Some(id), self.components[id.0].position),
            None => (None, self.cursor),
        };
        self.push(name, parent, base + offset, mass, kind);
    }

    fn push(
        &mut self,
        name: &str,
        parent: Option<ComponentId>,
        position: f64,
        mass: f64,
        kind: ComponentKind,
    ) -> ComponentId {
        let id = ComponentId(self.components.len());
        self.components.push(Component {
            id,
            name: name.to_string(),
            stage: self.stages.len() - 1,
            parent,
            position,
            mass,
            finish: self.finish,
            kind,
            shape_version: 0,
        });
        id
    }
}

// ---------------------------------------------------------------------------
// Preset rockets
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;
    use crate::vehicle::component::{CrossSection, DeployTrigger};
    use crate::vehicle::motor::{IgnitionTrigger, Motor};
    use crate::vehicle::shape::TransitionShape;

    /// Single-stage 50 mm sport rocket on a constant 20 N motor.
    pub fn sport() -> Rocket {
        let motor = Motor::constant("T20-1.5", 20.0, 1.5, 0.060, 0.030).dimensions(0.07, 0.024);
        RocketBuilder::new("Sport")
            .nose_cone(Transition::nose(TransitionShape::Ogive, 0.12, 0.025), 0.030)
            .body_tube(BodyTube::new(0.45, 0.025), 0.080)
            .motor(MotorMount::new(motor).ejection_delay(3.0))
            .fins(FinSet::trapezoid(3, 0.04, 0.02, 0.02, 0.1, 0.003), 0.030)
            .launch_lug(LaunchLug::new(0.03, 0.003, 0.0005), 0.2, 0.002)
            .parachute(
                Parachute::new(0.5, 0.8).deploy(DeployTrigger::Apogee, 1.0),
                0.05,
                0.020,
            )
            .build()
    }

    /// Two-stage rocket on rail buttons: booster with a long burn, sustainer
    /// lit at booster burnout.
    pub fn two_stage() -> Rocket {
        let booster = Motor::constant("B40-1", 40.0, 1.0, 0.050, 0.025).dimensions(0.07, 0.024);
        let sustainer = Motor::constant("S15-2", 15.0, 2.0, 0.045, 0.022).dimensions(0.07, 0.024);
        RocketBuilder::new("Two-stage")
            .stage_name("Sustainer")
            .nose_cone(Transition::nose(TransitionShape::Haack, 0.15, 0.025).param(0.0), 0.035)
            .body_tube(BodyTube::new(0.40, 0.025), 0.070)
            .motor(
                MotorMount::new(sustainer)
                    .ignition(IgnitionTrigger::PreviousStageBurnout, 0.0)
                    .ejection_delay(4.0),
            )
            .fins(
                FinSet::trapezoid(3, 0.05, 0.025, 0.025, 0.06, 0.003)
                    .cross_section(CrossSection::Rounded),
                0.025,
            )
            .rail_button(RailButton::new(0.010, 0.006, 0.008), 0.08, 0.002)
            .rail_button(RailButton::new(0.010, 0.006, 0.008), 0.32, 0.002)
            .parachute(
                Parachute::new(0.6, 0.8).deploy(DeployTrigger::Apogee, 0.5),
                0.05,
                0.025,
            )
            .stage(
                "Booster",
                StageSeparation { trigger: SeparationTrigger::UpperStageIgnition, delay: 0.0 },
            )
            .body_tube(BodyTube::new(0.25, 0.025), 0.050)
            .motor(MotorMount::new(booster))
            .fins(FinSet::trapezoid(4, 0.07, 0.03, 0.04, 0.07, 0.003), 0.035)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::shape::TransitionShape;

    #[test]
    fn builder_places_components_in_sequence() {
        let r = presets::sport();
        let stages = StageSet::all(r.stage_count());
        let body = r.airframe(&stages);
        assert_eq!(body.len(), 2);
        assert_eq!(body[0].position, 0.0);
        assert!((body[1].position - 0.12).abs() < 1e-12);
        let fins = r
            .components()
            .iter()
            .find(|c| matches!(c.kind, ComponentKind::FinSet(_)))
            .unwrap();
        assert!((fins.position - (0.12 + 0.45 - 0.04)).abs() < 1e-12);
        assert_eq!(fins.parent, Some(body[1].id));
    }

    #[test]
    fn reference_length_is_max_diameter() {
        let r = RocketBuilder::new("r")
            .nose_cone(Transition::nose(TransitionShape::Conical, 0.1, 0.03), 0.01)
            .transition(Transition::new(TransitionShape::Conical, 0.05, 0.03, 0.02), 0.01)
            .body_tube(BodyTube::new(0.3, 0.02), 0.05)
            .build();
        let ref_len = r.reference_length(&StageSet::all(1));
        assert!((ref_len - 0.06).abs() < 1e-12);
        assert_eq!(r.airframe_extent(&StageSet::all(1)), Some((0.0, 0.45)));
    }

    #[test]
    fn modify_bumps_shape_version() {
        let mut r = presets::sport();
        let id = ComponentId(1);
        let before = r.component(id).unwrap().shape_version();
        assert!(r.modify(id, |k| {
            if let ComponentKind::BodyTube(t) = k {
                t.length = 0.5;
            }
        }));
        assert_eq!(r.component(id).unwrap().shape_version(), before + 1);
        assert!(!r.modify(ComponentId(999), |_| {}));
    }

    #[test]
    fn stage_set_separation() {
        let mut upper = StageSet::all(3);
        upper.deactivate_from(1);
        assert!(upper.is_active(0));
        assert!(!upper.is_active(1) && !upper.is_active(2));
        assert_eq!(upper.bottom(), Some(0));

        let mut booster = StageSet::all(3);
        booster.deactivate_above(1);
        assert_eq!(booster.top(), Some(1));
        assert!(booster.any_active());
    }

    #[test]
    fn two_stage_preset_has_two_motors() {
        let r = presets::two_stage();
        assert_eq!(r.stage_count(), 2);
        assert_eq!(r.motor_mounts().count(), 2);
        let buttons: Vec<&Component> = r
            .components()
            .iter()
            .filter(|c| matches!(c.kind, ComponentKind::RailButton(_)))
            .collect();
        assert_eq!(buttons.len(), 2);
        assert!(buttons.iter().all(|c| c.stage == 0));
    }
}
