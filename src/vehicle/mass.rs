use super::component::{Component, ComponentKind};
use super::motor::MotorInstance;
use super::rocket::{Rocket, StageSet};
use crate::util::pow2;

// ---------------------------------------------------------------------------
// Mass properties of the active configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MassData {
    pub mass: f64,                 // kg
    pub cg: f64,                   // m aft of nose tip
    pub longitudinal_inertia: f64, // kg·m^2, about a transverse axis through the CG
    pub rotational_inertia: f64,   // kg·m^2, about the rocket axis
    pub propellant_mass: f64,      // kg
}

/// One lumped mass element: (mass, cg x, own longitudinal inertia, own rotational inertia).
#[derive(Debug, Clone, Copy)]
struct Element {
    mass: f64,
    cg: f64,
    i_long: f64,
    i_rot: f64,
}

/// Computes mass, CG and inertia for the active stages from component
/// masses and the burn state of the mounted motors.
#[derive(Debug, Clone)]
pub struct MassCalculator {
    structure: Vec<(usize, Element)>, // (stage, element)
}

impl MassCalculator {
    pub fn new(rocket: &Rocket) -> Self {
        let structure = rocket
            .components()
            .iter()
            .map(|c| (c.stage, component_element(rocket, c)))
            .collect();
        Self { structure }
    }

    pub fn mass_data(&self, stages: &StageSet, motors: &[MotorInstance], time: f64) -> MassData {
        let mut elements: Vec<Element> = self
            .structure
            .iter()
            .filter(|(stage, _)| stages.is_active(*stage))
            .map(|(_, e)| *e)
            .collect();

        let mut propellant = 0.0;
        for m in motors.iter().filter(|m| stages.is_active(m.stage)) {
            let mass = m.mass(time);
            let r = m.config.motor.diameter / 2.0;
            let l = m.config.motor.length;
            propellant += m.propellant_mass(time);
            elements.push(Element {
                mass,
                cg: m.cg(),
                i_long: mass * (3.0 * r * r + l * l) / 12.0,
                i_rot: mass * r * r / 2.0,
            });
        }

        let mass: f64 = elements.iter().map(|e| e.mass).sum();
        if mass <= 0.0 {
            return MassData::default();
        }
        let cg = elements.iter().map(|e| e.mass * e.cg).sum::<f64>() / mass;
        let longitudinal_inertia = elements
            .iter()
            .map(|e| e.i_long + e.mass * pow2(e.cg - cg))
            .sum();
        let rotational_inertia = elements.iter().map(|e| e.i_rot).sum();

        MassData { mass, cg, longitudinal_inertia, rotational_inertia, propellant_mass: propellant }
    }
}

fn component_element(rocket: &Rocket, c: &Component) -> Element {
    let m = c.mass;
    let cg = c.position + c.local_cg();
    let parent_radius = c
        .parent
        .map_or(0.0, |p| rocket.body_radius_at(p, c.position));
    let (i_long, i_rot) = match &c.kind {
        ComponentKind::BodyTube(b) => {
            let r = b.outer_radius;
            (m * (r * r / 2.0 + b.length * b.length / 12.0), m * r * r)
        }
        ComponentKind::NoseCone(t) | ComponentKind::Transition(t) => {
            let r = t.fore_radius.max(t.aft_radius);
            (m * (r * r / 4.0 + t.length * t.length / 12.0), m * r * r / 2.0)
        }
        ComponentKind::FinSet(f) => {
            let arm = parent_radius + f.span() / 2.0;
            let root = f.root_chord();
            (m * (root * root / 12.0 + arm * arm / 2.0), m * arm * arm)
        }
        ComponentKind::LaunchLug(l) => {
            let arm = parent_radius + l.outer_radius;
            (m * (l.length * l.length / 12.0 + arm * arm / 2.0), m * arm * arm)
        }
        ComponentKind::RailButton(b) => {
            let arm = parent_radius + b.total_height / 2.0;
            (m * arm * arm / 2.0, m * arm * arm)
        }
        ComponentKind::Parachute(_) => (0.0, 0.0),
    };
    Element { mass: m, cg, i_long, i_rot }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::component::{BodyTube, ComponentId};
    use crate::vehicle::motor::{Motor, MotorMount};
    use crate::vehicle::rocket::RocketBuilder;
    use approx::assert_relative_eq;

    fn tube_rocket() -> Rocket {
        RocketBuilder::new("tube").body_tube(BodyTube::new(1.0, 0.05), 1.0).build()
    }

    #[test]
    fn single_tube_properties() {
        let r = tube_rocket();
        let md = MassCalculator::new(&r).mass_data(&StageSet::all(1), &[], 0.0);
        assert_relative_eq!(md.mass, 1.0);
        assert_relative_eq!(md.cg, 0.5);
        assert_relative_eq!(md.longitudinal_inertia, 0.05 * 0.05 / 2.0 + 1.0 / 12.0);
        assert_relative_eq!(md.rotational_inertia, 0.0025);
    }

    #[test]
    fn burning_motor_moves_cg_forward() {
        let r = tube_rocket();
        let motor = Motor::constant("M", 10.0, 2.0, 0.5, 0.4).dimensions(0.2, 0.04);
        let inst = MotorInstance {
            mount: ComponentId(0),
            stage: 0,
            position: 0.8,
            config: MotorMount::new(motor),
            ignition_time: Some(0.0),
            burnt_out: false,
        };
        let calc = MassCalculator::new(&r);
        let stages = StageSet::all(1);
        let before = calc.mass_data(&stages, std::slice::from_ref(&inst), 0.0);
        let after = calc.mass_data(&stages, std::slice::from_ref(&inst), 2.0);
        assert_relative_eq!(before.mass, 1.5);
        assert_relative_eq!(after.mass, 1.1, epsilon = 1e-12);
        assert_relative_eq!(before.propellant_mass, 0.4);
        assert!(after.cg < before.cg);
    }

    #[test]
    fn inactive_stage_has_no_mass() {
        let r = tube_rocket();
        let mut stages = StageSet::all(1);
        stages.deactivate_from(0);
        let md = MassCalculator::new(&r).mass_data(&stages, &[], 0.0);
        assert_eq!(md.mass, 0.0);
    }
}
