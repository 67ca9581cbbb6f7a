//! Whole-rocket coefficient aggregation.
//!
//! [`BarrowmanCalculator`] keeps one component calculator per aerodynamic
//! component, rebuilt whenever the component's shape version changes, and
//! sums their contributions into rocket coefficients referenced to the nose
//! tip.

use std::collections::HashMap;
use std::f64::consts::PI;

use tracing::debug;

use crate::error::SimulationError;
use crate::util::{pow2, pow3, pow4, sign, EPSILON};
use crate::vehicle::{Component, ComponentId, ComponentKind, Rocket, StageSet};

use super::calc::{AerodynamicCalc, BodyCalc, ComponentCalc, FinCalc, RailButtonCalc, TubeCalc};
use super::conditions::FlightConditions;
use super::drag::{
    base_cd, roughness_correction, roughness_limited_cf, skin_friction_cf, stagnation_cd, AxialDrag,
};
use super::forces::AerodynamicForces;
use super::geometry::{
    interference_fin_count, AxialExtent, BodyGeometry, FinGeometry, RailButtonGeometry,
    TubeGeometry,
};
use super::warning::{Warning, WarningSet};

/// Angle of attack above which the coefficients are flagged unreliable.
pub const LARGE_AOA: f64 = 17.5 * PI / 180.0;

/// Radius jump between adjacent airframe components reported as a
/// discontinuity (m).
const DIAMETER_TOLERANCE: f64 = 0.0001;

/// Tumbling drag efficiency of a fin set by fin count (index 7 covers more).
const FIN_TUMBLE_EFFICIENCY: [f64; 8] = [0.0, 0.5, 1.0, 1.41, 1.81, 1.73, 1.90, 1.85];
const TUMBLE_CD_FIN: f64 = 1.42;
const TUMBLE_CD_BODY: f64 = 0.56;

// ---------------------------------------------------------------------------
// Calculator cache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct CacheEntry {
    key: Vec<u64>,
    calc: ComponentCalc,
}

/// Extended-Barrowman calculator of a whole rocket.
#[derive(Debug, Clone)]
pub struct BarrowmanCalculator {
    cache: HashMap<ComponentId, CacheEntry>,
    axial: AxialDrag,
    geometry_warnings: WarningSet,
}

impl BarrowmanCalculator {
    pub fn new() -> Result<Self, SimulationError> {
        Ok(Self {
            cache: HashMap::new(),
            axial: AxialDrag::new()?,
            geometry_warnings: WarningSet::new(),
        })
    }

    /// Build or refresh the calculators of every aerodynamic component.
    /// Entries whose shape, supporting body and sibling fin layout are
    /// unchanged are kept.
    pub fn prepare(&mut self, rocket: &Rocket) -> Result<(), SimulationError> {
        let mut rebuilt = 0usize;
        for c in rocket.components().iter().filter(|c| c.is_aerodynamic()) {
            let key = cache_key(rocket, c);
            if self.cache.get(&c.id).is_some_and(|e| e.key == key) {
                continue;
            }
            let calc = build_calc(rocket, c)?;
            self.cache.insert(c.id, CacheEntry { key, calc });
            rebuilt += 1;
        }
        self.cache.retain(|id, _| rocket.component(*id).is_some());
        if rebuilt > 0 {
            debug!(rebuilt, "component calculators rebuilt");
        }
        Ok(())
    }

    /// Geometry warnings of the active components, collected once after
    /// the calculators are built.
    pub fn geometry_warnings(&mut self, rocket: &Rocket, stages: &StageSet) -> &WarningSet {
        self.geometry_warnings.clear();
        for c in rocket.active_components(stages) {
            if let Some(CacheEntry { calc: ComponentCalc::Fins(f), .. }) = self.cache.get(&c.id) {
                self.geometry_warnings.add_all(&f.geometry().warnings);
            }
        }
        &self.geometry_warnings
    }

    fn calc(&self, id: ComponentId) -> Result<&ComponentCalc, SimulationError> {
        self.cache.get(&id).map(|e| &e.calc).ok_or_else(|| {
            SimulationError::InternalConsistency(format!(
                "no aerodynamic calculator for component {}",
                id.0
            ))
        })
    }

    /// CP location and normal force slope of the active configuration.
    pub fn cp(
        &self,
        rocket: &Rocket,
        stages: &StageSet,
        conditions: &FlightConditions,
        warnings: &mut WarningSet,
    ) -> Result<AerodynamicForces, SimulationError> {
        let mut total = AerodynamicForces::zero();
        for c in rocket.active_components(stages).filter(|c| c.is_aerodynamic()) {
            let mut f = self.calc(c.id)?.nonaxial_forces(conditions, warnings);
            f.cp.pos.x += c.position;
            f.cm += f.cn * c.position / conditions.ref_length();
            total.merge(&f);
        }
        Ok(total)
    }

    /// Full set of coefficients of the active configuration.
    pub fn forces(
        &self,
        rocket: &Rocket,
        stages: &StageSet,
        conditions: &FlightConditions,
        warnings: &mut WarningSet,
    ) -> Result<AerodynamicForces, SimulationError> {
        if conditions.aoa() > LARGE_AOA {
            warnings.add(Warning::LargeAngleOfAttack { aoa: conditions.aoa() });
        }

        let mut total = self.cp(rocket, stages, conditions, warnings)?;

        total.friction_cd = self.friction_cd(rocket, stages, conditions)?;
        let (pressure, base) = self.pressure_and_base_cd(rocket, stages, conditions, warnings)?;
        total.pressure_cd = pressure;
        total.base_cd = base;
        total.cd = total.friction_cd + total.pressure_cd + total.base_cd;
        total.caxial = self.axial.axial_cd(conditions.aoa(), total.cd);

        self.damping_moments(rocket, stages, conditions, &mut total)?;
        total.cm -= total.pitch_damping_moment;
        total.cyaw -= total.yaw_damping_moment;

        Ok(total)
    }

    // -----------------------------------------------------------------------
    // Drag
    // -----------------------------------------------------------------------

    fn friction_cd(
        &self,
        rocket: &Rocket,
        stages: &StageSet,
        conditions: &FlightConditions,
    ) -> Result<f64, SimulationError> {
        let Some((fore, aft)) = rocket.airframe_extent(stages) else {
            return Ok(0.0);
        };
        let length = aft - fore;
        let mach = conditions.mach();
        let cf = skin_friction_cf(mach, conditions.reynolds(length));
        let correction = roughness_correction(mach);

        let (mut body, mut other) = (0.0, 0.0);
        for c in rocket.active_components(stages).filter(|c| c.is_aerodynamic()) {
            let calc = self.calc(c.id)?;
            let component_cf = cf.max(roughness_limited_cf(c.finish, length, correction));
            let cd = calc.friction_cd(conditions, component_cf);
            if calc.is_body() {
                body += cd;
            } else {
                other += cd;
            }
        }

        let max_r = rocket.reference_length(stages) / 2.0;
        let fineness = (length + 0.0001) / max_r;
        Ok(body * (1.0 + 1.0 / (2.0 * fineness)) + other)
    }

    /// Component pressure drag plus stagnation drag of forward-facing steps
    /// (pressure) and base drag of aft-facing steps and the tail (base).
    fn pressure_and_base_cd(
        &self,
        rocket: &Rocket,
        stages: &StageSet,
        conditions: &FlightConditions,
        warnings: &mut WarningSet,
    ) -> Result<(f64, f64), SimulationError> {
        let mach = conditions.mach();
        let (stag, base) = (stagnation_cd(mach), base_cd(mach));
        let ref_area = conditions.ref_area();

        let mut pressure = 0.0;
        for c in rocket.active_components(stages).filter(|c| c.is_aerodynamic() && !c.is_body()) {
            pressure += self.calc(c.id)?.pressure_cd(conditions, stag, base, warnings);
        }

        let mut base_total = 0.0;
        let mut prev_aft: Option<f64> = None;
        for c in rocket.airframe(stages) {
            pressure += self.calc(c.id)?.pressure_cd(conditions, stag, base, warnings);
            let Some((mut fore, aft)) = c.body_radii() else {
                continue;
            };
            if c.length() < EPSILON {
                fore = fore.max(aft);
            }
            let prev = prev_aft.unwrap_or(0.0);
            if prev_aft.is_some() && (fore - prev).abs() > DIAMETER_TOLERANCE {
                warnings.add(Warning::DiameterDiscontinuity);
            }
            if fore > prev {
                pressure += stag * PI * (pow2(fore) - pow2(prev)) / ref_area;
            } else if fore < prev {
                base_total += base * PI * (pow2(prev) - pow2(fore)) / ref_area;
            }
            prev_aft = Some(aft);
        }
        if let Some(aft) = prev_aft {
            base_total += base * PI * pow2(aft) / ref_area;
        }

        Ok((pressure, base_total))
    }

    // -----------------------------------------------------------------------
    // Pitch and yaw damping
    // -----------------------------------------------------------------------

    fn damping_moments(
        &self,
        rocket: &Rocket,
        stages: &StageSet,
        conditions: &FlightConditions,
        total: &mut AerodynamicForces,
    ) -> Result<(), SimulationError> {
        let mut mul = self.damping_multiplier(rocket, stages, conditions)?;
        mul *= 3.0;
        let vel = conditions.velocity().max(1.0);
        let pitch = conditions.pitch_rate();
        let yaw = conditions.yaw_rate();
        total.pitch_damping_moment = mul * sign(pitch) * pow2(pitch / vel);
        total.yaw_damping_moment = mul * sign(yaw) * pow2(yaw / vel);
        Ok(())
    }

    fn damping_multiplier(
        &self,
        rocket: &Rocket,
        stages: &StageSet,
        conditions: &FlightConditions,
    ) -> Result<f64, SimulationError> {
        let cgx = conditions.pitch_center();
        let fore = rocket.airframe_extent(stages).map_or(0.0, |(fore, _)| fore);
        let body_cg = cgx - fore;
        let ref_moment = conditions.ref_area() * conditions.ref_length();

        let (mut area, mut length) = (0.0, 0.0);
        for c in rocket.airframe(stages) {
            if let ComponentCalc::Body(b) = self.calc(c.id)? {
                area += b.geometry().planform_area;
                length += b.geometry().length;
            }
        }
        let diameter = if length > 0.0 { area / length } else { 0.0 };

        let mut mul = 0.275 * diameter / ref_moment * (pow4(body_cg) + pow4(length - body_cg));

        for c in rocket.active_components(stages).filter(|c| c.is_aerodynamic()) {
            if let ComponentCalc::Fins(f) = self.calc(c.id)? {
                let g = f.geometry();
                let mid = c.position + g.midchord_pos();
                mul += 0.6 * g.fin_count.min(4) as f64 * g.fin_area * pow3((mid - cgx).abs())
                    / ref_moment;
            }
        }
        Ok(mul)
    }

    // -----------------------------------------------------------------------
    // Tumbling
    // -----------------------------------------------------------------------

    /// Broadside drag coefficient of a tumbling airframe, referenced to
    /// `ref_area`.
    pub fn tumble_cd(
        &self,
        rocket: &Rocket,
        stages: &StageSet,
        ref_area: f64,
    ) -> Result<f64, SimulationError> {
        if ref_area <= 0.0 {
            return Ok(0.0);
        }
        let (mut fins, mut body) = (0.0, 0.0);
        for c in rocket.active_components(stages).filter(|c| c.is_aerodynamic()) {
            match self.calc(c.id)? {
                ComponentCalc::Fins(f) => {
                    let g = f.geometry();
                    let n = (g.fin_count as usize).min(FIN_TUMBLE_EFFICIENCY.len() - 1);
                    fins += g.fin_area * FIN_TUMBLE_EFFICIENCY[n];
                }
                ComponentCalc::Body(b) => body += b.geometry().planform_area,
                _ => {}
            }
        }
        Ok((TUMBLE_CD_FIN * fins + TUMBLE_CD_BODY * body) / ref_area)
    }
}

// ---------------------------------------------------------------------------
// Calculator construction
// ---------------------------------------------------------------------------

/// Shape versions a component's calculator was built from. Fin sets also
/// depend on the body they are attached to, through the body radius, and on
/// the fins sharing that body, through the interference count.
fn cache_key(rocket: &Rocket, c: &Component) -> Vec<u64> {
    let mut key = vec![c.shape_version()];
    if let (ComponentKind::FinSet(_), Some(parent)) = (&c.kind, c.parent) {
        key.push(rocket.component(parent).map_or(0, |p| p.shape_version()));
        key.extend(
            rocket
                .children(parent)
                .filter(|s| s.id != c.id && matches!(s.kind, ComponentKind::FinSet(_)))
                .map(|s| s.shape_version()),
        );
    }
    key
}

fn fin_extent(c: &Component) -> AxialExtent {
    AxialExtent { lead: c.position, trail: c.position + c.length() }
}

fn build_calc(rocket: &Rocket, c: &Component) -> Result<ComponentCalc, SimulationError> {
    let calc = match &c.kind {
        ComponentKind::NoseCone(t) | ComponentKind::Transition(t) => {
            ComponentCalc::Body(BodyCalc::new(BodyGeometry::transition(t))?)
        }
        ComponentKind::BodyTube(b) => {
            ComponentCalc::Body(BodyCalc::new(BodyGeometry::tube(b.length, b.outer_radius))?)
        }
        ComponentKind::FinSet(fins) => {
            let parent = c.parent.ok_or_else(|| {
                SimulationError::InternalConsistency(format!(
                    "fin set '{}' is not attached to a body component",
                    c.name
                ))
            })?;
            let body_radius = rocket.body_radius_at(parent, c.position);
            let geom = FinGeometry::new(fins, body_radius);
            let siblings = rocket.children(parent).filter_map(|s| match &s.kind {
                ComponentKind::FinSet(f) => Some((fin_extent(s), f.fin_count)),
                _ => None,
            });
            let count = interference_fin_count(fin_extent(c), fins.fin_count, siblings)?;
            ComponentCalc::Fins(FinCalc::new(geom, count)?)
        }
        ComponentKind::LaunchLug(lug) => {
            ComponentCalc::Tube(TubeCalc::new(TubeGeometry::launch_lug(lug), c.finish.roughness()))
        }
        ComponentKind::RailButton(button) => {
            ComponentCalc::RailButton(RailButtonCalc::new(RailButtonGeometry::new(button)))
        }
        ComponentKind::Parachute(_) => {
            return Err(SimulationError::InternalConsistency(format!(
                "component '{}' has no aerodynamic model",
                c.name
            )))
        }
    };
    Ok(calc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::{
        presets, BodyTube, FinSet, RailButton, RocketBuilder, Transition, TransitionShape,
    };
    use approx::assert_relative_eq;

    fn prepared(rocket: &Rocket) -> BarrowmanCalculator {
        let mut calc = BarrowmanCalculator::new().unwrap();
        calc.prepare(rocket).unwrap();
        calc
    }

    fn conditions(rocket: &Rocket, stages: &StageSet, mach: f64, aoa: f64) -> FlightConditions {
        let mut fc = FlightConditions::new(rocket.reference_length(stages));
        fc.set_mach(mach);
        fc.set_aoa(aoa);
        fc
    }

    #[test]
    fn cp_is_aft_of_cg_for_sport_rocket() {
        let r = presets::sport();
        let stages = StageSet::all(1);
        let calc = prepared(&r);
        let fc = conditions(&r, &stages, 0.3, 0.0);
        let f = calc.forces(&r, &stages, &fc, &mut WarningSet::new()).unwrap();
        // nose tip to fin trailing edge
        assert!(f.cp.x() > 0.3 && f.cp.x() < 0.57, "cp = {}", f.cp.x());
        assert!(f.cna > 2.0);
        assert!(f.cd > 0.2 && f.cd < 1.5, "cd = {}", f.cd);
        assert_relative_eq!(f.caxial, f.cd, epsilon = 1e-9);
        assert!(f.is_finite());
    }

    #[test]
    fn moment_is_consistent_with_cp() {
        let r = presets::sport();
        let stages = StageSet::all(1);
        let calc = prepared(&r);
        let fc = conditions(&r, &stages, 0.3, 0.05);
        let f = calc.forces(&r, &stages, &fc, &mut WarningSet::new()).unwrap();
        assert_relative_eq!(f.cm, f.cn * f.cp.x() / fc.ref_length(), max_relative = 1e-9);
    }

    #[test]
    fn base_drag_covers_tail() {
        let r = RocketBuilder::new("tube").body_tube(BodyTube::new(0.5, 0.025), 0.1).build();
        let stages = StageSet::all(1);
        let calc = prepared(&r);
        let fc = conditions(&r, &stages, 0.0, 0.0);
        let f = calc.forces(&r, &stages, &fc, &mut WarningSet::new()).unwrap();
        // blunt front and flat tail each span the whole reference area
        assert_relative_eq!(f.base_cd, 0.12, epsilon = 1e-12);
        assert_relative_eq!(f.pressure_cd, 0.85, epsilon = 1e-12);
    }

    #[test]
    fn rail_buttons_add_stagnation_drag() {
        let button = RailButton::new(0.010, 0.006, 0.008);
        let plain = RocketBuilder::new("plain").body_tube(BodyTube::new(0.5, 0.025), 0.1).build();
        let railed = RocketBuilder::new("railed")
            .body_tube(BodyTube::new(0.5, 0.025), 0.1)
            .rail_button(button.clone(), 0.1, 0.001)
            .rail_button(button, 0.4, 0.001)
            .build();
        let stages = StageSet::all(1);
        let fc = conditions(&plain, &stages, 0.3, 0.0);
        let a = prepared(&plain).forces(&plain, &stages, &fc, &mut WarningSet::new()).unwrap();
        let b = prepared(&railed).forces(&railed, &stages, &fc, &mut WarningSet::new()).unwrap();

        // flange height x diameter minus the neck notch, per button
        let silhouette = 0.008 * 0.010 - (0.010 - 0.006) * 0.004;
        let expected = 2.0 * stagnation_cd(0.3) * silhouette / fc.ref_area();
        assert_relative_eq!(b.pressure_cd - a.pressure_cd, expected, max_relative = 1e-9);
        assert_relative_eq!(b.friction_cd, a.friction_cd, max_relative = 1e-12);
        assert_relative_eq!(b.cna, a.cna, max_relative = 1e-12);
    }

    #[test]
    fn diameter_step_warns_and_adds_drag() {
        let r = RocketBuilder::new("step")
            .nose_cone(Transition::nose(TransitionShape::Conical, 0.1, 0.02), 0.01)
            .body_tube(BodyTube::new(0.3, 0.025), 0.05)
            .build();
        let stages = StageSet::all(1);
        let calc = prepared(&r);
        let fc = conditions(&r, &stages, 0.3, 0.0);
        let mut w = WarningSet::new();
        calc.forces(&r, &stages, &fc, &mut w).unwrap();
        assert!(w.contains(&Warning::DiameterDiscontinuity));
    }

    #[test]
    fn large_aoa_is_flagged() {
        let r = presets::sport();
        let stages = StageSet::all(1);
        let calc = prepared(&r);
        let mut w = WarningSet::new();
        calc.forces(&r, &stages, &conditions(&r, &stages, 0.3, 0.1), &mut w).unwrap();
        assert!(w.is_empty());
        calc.forces(&r, &stages, &conditions(&r, &stages, 0.3, 0.4), &mut w).unwrap();
        assert_eq!(w.len(), 1);
        assert!(matches!(w.iter().next(), Some(Warning::LargeAngleOfAttack { .. })));
    }

    #[test]
    fn pitch_damping_opposes_rotation() {
        let r = presets::sport();
        let stages = StageSet::all(1);
        let calc = prepared(&r);
        let mut fc = conditions(&r, &stages, 0.1, 0.0);
        fc.set_pitch_center(0.35);
        fc.set_pitch_rate(2.0);
        let f = calc.forces(&r, &stages, &fc, &mut WarningSet::new()).unwrap();
        assert!(f.pitch_damping_moment > 0.0);
        assert_relative_eq!(f.cm, -f.pitch_damping_moment, epsilon = 1e-12);
        fc.set_pitch_rate(-2.0);
        let g = calc.forces(&r, &stages, &fc, &mut WarningSet::new()).unwrap();
        assert_relative_eq!(g.pitch_damping_moment, -f.pitch_damping_moment, epsilon = 1e-12);
    }

    #[test]
    fn cache_rebuilds_on_shape_change() {
        let mut r = presets::sport();
        let stages = StageSet::all(1);
        let mut calc = prepared(&r);
        let fc = conditions(&r, &stages, 0.3, 0.0);
        let before = calc.forces(&r, &stages, &fc, &mut WarningSet::new()).unwrap();

        let fins = r
            .components()
            .iter()
            .find(|c| matches!(c.kind, ComponentKind::FinSet(_)))
            .map(|c| c.id)
            .unwrap();
        r.modify(fins, |k| {
            if let ComponentKind::FinSet(f) = k {
                *f = FinSet::trapezoid(3, 0.04, 0.02, 0.02, 0.2, 0.003);
            }
        });
        calc.prepare(&r).unwrap();
        let after = calc.forces(&r, &stages, &fc, &mut WarningSet::new()).unwrap();
        assert!(after.cna > before.cna);
        assert!(after.cp.x() > before.cp.x());
    }

    #[test]
    fn fins_rebuild_when_their_body_changes() {
        let mut r = presets::sport();
        let mut calc = prepared(&r);
        let tube = r
            .components()
            .iter()
            .find(|c| matches!(c.kind, ComponentKind::BodyTube(_)))
            .map(|c| c.id)
            .unwrap();
        r.modify(tube, |k| {
            if let ComponentKind::BodyTube(t) = k {
                t.outer_radius = 0.06;
            }
        });
        calc.prepare(&r).unwrap();

        let stages = StageSet::all(1);
        let fc = conditions(&r, &stages, 0.3, 0.05);
        let reused = calc.forces(&r, &stages, &fc, &mut WarningSet::new()).unwrap();
        let fresh = prepared(&r).forces(&r, &stages, &fc, &mut WarningSet::new()).unwrap();
        assert_relative_eq!(reused.cna, fresh.cna, max_relative = 1e-12);
        assert_relative_eq!(reused.cp.x(), fresh.cp.x(), max_relative = 1e-12);
    }

    #[test]
    fn overlapping_fin_sets_interfere() {
        let fin_set = || FinSet::trapezoid(3, 0.04, 0.02, 0.02, 0.1, 0.003);
        let airframe = || {
            RocketBuilder::new("fins")
                .nose_cone(Transition::nose(TransitionShape::Ogive, 0.12, 0.025), 0.03)
                .body_tube(BodyTube::new(0.45, 0.025), 0.08)
        };
        let single = airframe().fins(fin_set(), 0.03).build();
        let double = airframe()
            .fins(fin_set(), 0.03)
            .fins(fin_set().base_rotation(PI / 3.0), 0.03)
            .build();

        let stages = StageSet::all(1);
        let fc = conditions(&single, &stages, 0.3, 0.05);
        let fin_sets = |r: &Rocket| -> Vec<(u32, f64)> {
            let calc = prepared(r);
            r.components()
                .iter()
                .filter_map(|c| match calc.calc(c.id).ok()? {
                    ComponentCalc::Fins(f) => Some((
                        f.interference_count(),
                        f.nonaxial_forces(&fc, &mut WarningSet::new()).cna,
                    )),
                    _ => None,
                })
                .collect()
        };

        let alone = fin_sets(&single);
        assert_eq!(alone.len(), 1);
        assert_eq!(alone[0].0, 3);
        let shared = fin_sets(&double);
        assert_eq!(shared.len(), 2);
        for (count, cna) in shared {
            assert_eq!(count, 6);
            assert_relative_eq!(cna, alone[0].1 * 0.913, max_relative = 1e-12);
        }

        let mut warnings = WarningSet::new();
        let f1 = prepared(&single).forces(&single, &stages, &fc, &mut warnings).unwrap();
        let f2 = prepared(&double).forces(&double, &stages, &fc, &mut warnings).unwrap();
        assert_relative_eq!(f2.cna - f1.cna, alone[0].1 * (2.0 * 0.913 - 1.0), max_relative = 1e-9);
        assert!(!warnings.contains(&Warning::ParallelFins));
    }

    #[test]
    fn thick_fin_is_a_geometry_warning() {
        let r = RocketBuilder::new("thick")
            .nose_cone(Transition::nose(TransitionShape::Ogive, 0.1, 0.02), 0.01)
            .body_tube(BodyTube::new(0.3, 0.02), 0.05)
            .fins(FinSet::trapezoid(3, 0.05, 0.03, 0.02, 0.05, 0.015), 0.02)
            .build();
        let stages = StageSet::all(1);
        let mut calc = prepared(&r);
        let w = calc.geometry_warnings(&r, &stages).clone();
        assert_eq!(w.len(), 1);
        assert!(w.contains(&Warning::ThickFin));
        // flight evaluation does not re-report it
        let mut flight = WarningSet::new();
        calc.forces(&r, &stages, &conditions(&r, &stages, 0.3, 0.0), &mut flight).unwrap();
        assert!(!flight.contains(&Warning::ThickFin));
    }

    #[test]
    fn orphan_fins_are_inconsistent() {
        let r = RocketBuilder::new("orphan")
            .fins(FinSet::trapezoid(3, 0.05, 0.03, 0.02, 0.05, 0.002), 0.01)
            .build();
        let mut calc = BarrowmanCalculator::new().unwrap();
        assert!(matches!(calc.prepare(&r), Err(SimulationError::InternalConsistency(_))));
    }

    #[test]
    fn tumble_drag_counts_fins_and_body() {
        let r = presets::sport();
        let stages = StageSet::all(1);
        let calc = prepared(&r);
        let ref_area = PI * pow2(0.025);
        let cd = calc.tumble_cd(&r, &stages, ref_area).unwrap();
        let body = 0.56 * (2.0 * 0.025 * 0.45) / ref_area;
        assert!(cd > body, "cd = {}", cd);
    }
}
