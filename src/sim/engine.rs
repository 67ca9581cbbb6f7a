//! Event-driven flight simulation.
//!
//! A run starts with one branch following the whole rocket. Each stage
//! separation splits off a new branch for the separated lower stages; the
//! branches are simulated one after another in order of creation.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::aero::{BarrowmanCalculator, Warning};
use crate::data::{FlightData, FlightDataBranch, FlightDataType};
use crate::error::SimulationError;
use crate::physics::{AtmosphereModel, ConstantWind, Isa1976, WindModel};
use crate::util::EPSILON;
use crate::vehicle::{
    ComponentId, DeployTrigger, IgnitionTrigger, MassCalculator, MotorInstance, Rocket,
    SeparationTrigger, StageSet,
};

use super::event::{AbortCause, AltitudeDetector, EventDetector, FlightEvent, FlightEventKind};
use super::options::SimulationOptions;
use super::state::SimulationState;
use super::status::SimulationStatus;
use super::stepper::{DescentStepper, RK4Stepper, StepContext, StepRecord, Stepper};

/// Angle of attack above which an unstable rocket starts tumbling.
const TUMBLE_AOA: f64 = 20.0 * std::f64::consts::PI / 180.0;

/// Speed above which a recovery deployment is reported (m/s).
const MAX_DEPLOYMENT_SPEED: f64 = 20.0;

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Why a run was refused before any step was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CannotRunReason {
    NoMotorsDefined,
    NoActiveStages,
    ZeroAerodynamicLength,
}

impl fmt::Display for CannotRunReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CannotRunReason::NoMotorsDefined => write!(f, "no motors defined"),
            CannotRunReason::NoActiveStages => write!(f, "no active stages"),
            CannotRunReason::ZeroAerodynamicLength => write!(f, "rocket has no airframe"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SimulationOutcome {
    Completed(FlightData),
    CannotRun(CannotRunReason),
}

impl SimulationOutcome {
    pub fn flight_data(&self) -> Option<&FlightData> {
        match self {
            SimulationOutcome::Completed(data) => Some(data),
            SimulationOutcome::CannotRun(_) => None,
        }
    }
}

/// A fatal error together with everything recorded up to it.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct SimulationAbort {
    #[source]
    pub error: SimulationError,
    pub partial: FlightData,
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

pub struct Simulation {
    rocket: Rocket,
    options: SimulationOptions,
    atmosphere: Box<dyn AtmosphereModel>,
    wind: Box<dyn WindModel>,
    cancel: Option<Arc<AtomicBool>>,
    steps: usize,
}

impl Simulation {
    /// Simulation in the standard atmosphere with the constant wind of
    /// `options`.
    pub fn new(rocket: Rocket, options: SimulationOptions) -> Self {
        let wind = ConstantWind::new(options.wind_speed, options.wind_direction);
        Self {
            rocket,
            options,
            atmosphere: Box::new(Isa1976),
            wind: Box::new(wind),
            cancel: None,
            steps: 0,
        }
    }

    pub fn with_atmosphere(mut self, atmosphere: impl AtmosphereModel + 'static) -> Self {
        self.atmosphere = Box::new(atmosphere);
        self
    }

    pub fn with_wind(mut self, wind: impl WindModel + 'static) -> Self {
        self.wind = Box::new(wind);
        self
    }

    /// Stop the run with [`SimulationError::Cancelled`] once `flag` is set.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn rocket(&self) -> &Rocket {
        &self.rocket
    }

    pub fn options(&self) -> &SimulationOptions {
        &self.options
    }

    /// Integration steps taken by the last run.
    pub fn steps_taken(&self) -> usize {
        self.steps
    }

    fn preflight_check(&self, stages: &StageSet) -> Option<CannotRunReason> {
        if !stages.any_active() {
            Some(CannotRunReason::NoActiveStages)
        } else if self.rocket.motor_mounts().next().is_none() {
            Some(CannotRunReason::NoMotorsDefined)
        } else if self.rocket.reference_length(stages) <= EPSILON
            || self
                .rocket
                .airframe_extent(stages)
                .map_or(true, |(fore, aft)| aft - fore <= EPSILON)
        {
            Some(CannotRunReason::ZeroAerodynamicLength)
        } else {
            None
        }
    }

    /// Run the simulation to completion of every branch.
    pub fn run(&mut self) -> Result<SimulationOutcome, SimulationAbort> {
        self.steps = 0;
        let stages = StageSet::all(self.rocket.stage_count());
        if let Some(reason) = self.preflight_check(&stages) {
            info!(rocket = %self.rocket.name, %reason, "simulation cannot run");
            return Ok(SimulationOutcome::CannotRun(reason));
        }
        info!(rocket = %self.rocket.name, "simulation started");

        let early_abort = |error| SimulationAbort { error, partial: FlightData::default() };
        let mut aero = BarrowmanCalculator::new().map_err(early_abort)?;
        aero.prepare(&self.rocket).map_err(early_abort)?;

        let mut warnings = aero.geometry_warnings(&self.rocket, &stages).clone();
        if self.rocket.parachutes().next().is_none() {
            warnings.add(Warning::NoRecoveryDevice);
        }

        let mass = MassCalculator::new(&self.rocket);
        let motors = self
            .rocket
            .motor_mounts()
            .map(|(tube, mount)| MotorInstance::mounted(tube, mount))
            .collect();
        let mut primary = SimulationStatus::new(
            &self.options,
            stages,
            motors,
            FlightDataBranch::new(self.rocket.name.clone()),
        );
        for (c, chute) in self.rocket.parachutes() {
            if let DeployTrigger::Altitude(alt) = chute.trigger {
                let det = AltitudeDetector::new(alt, false, FlightEventKind::RecoveryDeviceDeployment);
                primary.deploy_detectors.push((c.id, det));
            }
        }
        primary.queue.push(FlightEvent::new(0.0, FlightEventKind::Launch));

        let mut engine = Engine {
            ctx: StepContext {
                rocket: &self.rocket,
                aero: &aero,
                mass: &mass,
                atmosphere: self.atmosphere.as_ref(),
                wind: self.wind.as_ref(),
                options: &self.options,
            },
            cancel: self.cancel.as_deref(),
            steps: 0,
        };

        let mut pending = VecDeque::from([primary]);
        let mut finished = Vec::new();
        while let Some(mut status) = pending.pop_front() {
            let result = engine.run_branch(&mut status, &mut pending);
            warnings.add_all(&status.warnings);
            if let Err(error) = result {
                warn!(%error, branch = status.branch.name(), "simulation aborted");
                finished.push(status.branch);
                for other in pending {
                    warnings.add_all(&other.warnings);
                    finished.push(other.branch);
                }
                self.steps = engine.steps;
                return Err(SimulationAbort { error, partial: FlightData::new(finished, warnings) });
            }
            finished.push(status.branch);
        }

        self.steps = engine.steps;
        info!(steps = self.steps, branches = finished.len(), "simulation completed");
        Ok(SimulationOutcome::Completed(FlightData::new(finished, warnings)))
    }
}

// ---------------------------------------------------------------------------
// Branch loop
// ---------------------------------------------------------------------------

struct Engine<'a> {
    ctx: StepContext<'a>,
    cancel: Option<&'a AtomicBool>,
    steps: usize,
}

impl Engine<'_> {
    fn run_branch(
        &mut self,
        status: &mut SimulationStatus,
        pending: &mut VecDeque<SimulationStatus>,
    ) -> Result<(), SimulationError> {
        info!(branch = status.branch.name(), time = status.time(), "branch started");
        if status.branch.is_empty() {
            store_data(status, None);
        }

        loop {
            while let Some(event) = status.queue.pop_due(status.time()) {
                if !self.handle_event(status, event, pending) {
                    info!(branch = status.branch.name(), time = status.time(), "branch ended");
                    return Ok(());
                }
            }
            status.update_phase();

            if self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Err(SimulationError::Cancelled { time: status.time() });
            }
            if status.time() >= self.ctx.options.max_time {
                warn!(time = status.time(), "simulation time limit reached");
                status.warnings.add(Warning::TimeLimitReached { time: status.time() });
                status.queue.push(FlightEvent::new(status.time(), FlightEventKind::SimulationEnd));
                continue;
            }

            let prev = status.state.clone();
            let record = if status.phase.is_descent() {
                DescentStepper.step(&self.ctx, status)?
            } else {
                RK4Stepper.step(&self.ctx, status)?
            };
            self.steps += 1;

            if status.state.has_diverged() {
                return Err(SimulationError::calculation(
                    status.time(),
                    status.phase,
                    "integration diverged",
                ));
            }
            trace!(
                time = status.time(),
                altitude = status.state.pos.z,
                phase = %status.phase,
                dt = record.time_step,
                "step"
            );

            self.detect_events(status, &prev, &record);
            store_data(status, Some(&record));
        }
    }

    /// Queue the events found by the detectors after a step.
    fn detect_events(
        &self,
        status: &mut SimulationStatus,
        prev: &SimulationState,
        record: &StepRecord,
    ) {
        let now = status.time();
        let mut found = Vec::new();

        if let Some(kind) = status.liftoff_detector.check(prev, &status.state) {
            found.push(FlightEvent::new(now, kind));
        }
        if !status.rod_cleared {
            if let Some(kind) = status.rod_detector.check(prev, &status.state) {
                found.push(FlightEvent::new(now, kind));
            }
        }
        if status.liftoff {
            if let Some(kind) = status.apogee_detector.check(prev, &status.state) {
                found.push(FlightEvent::new(now, kind));
            }
        }
        if status.apogee_reached {
            for (id, det) in status.deploy_detectors.iter_mut() {
                if det.check(prev, &status.state).is_some() {
                    found.push(FlightEvent::with_source(now, det.kind, *id));
                }
            }
        }

        if status.liftoff && !status.landed && status.state.pos.z <= 0.0 {
            status.state.pos.z = 0.0;
            found.push(FlightEvent::new(now, FlightEventKind::GroundHit));
        }

        if self.wants_to_tumble(status, record) {
            found.push(FlightEvent::new(now, FlightEventKind::Tumble));
        }

        for event in found {
            status.queue.push(event);
        }
    }

    /// An unstable rocket at a large angle of attack after apogee (or any
    /// separated lower stage) starts tumbling.
    fn wants_to_tumble(&self, status: &SimulationStatus, record: &StepRecord) -> bool {
        if status.tumbling
            || !status.rod_cleared
            || !status.deployed.is_empty()
            || !(status.apogee_reached || !status.primary)
        {
            return false;
        }
        let Some(forces) = &record.forces else {
            return false;
        };
        forces.cna > EPSILON && record.mass.cg > forces.cp.x() && record.aoa > TUMBLE_AOA
    }

    // -----------------------------------------------------------------------
    // Event handling
    // -----------------------------------------------------------------------

    /// Apply one event. Returns false when the branch ends.
    fn handle_event(
        &self,
        status: &mut SimulationStatus,
        event: FlightEvent,
        pending: &mut VecDeque<SimulationStatus>,
    ) -> bool {
        use FlightEventKind::*;

        let terminal = matches!(event.kind, GroundHit | SimulationEnd | SimulationAbort(_));
        if status.landed && !terminal {
            status.warnings.add(Warning::EventAfterLanding { event: event.kind.to_string() });
            debug!(event = %event.kind, "ignoring event after landing");
            return true;
        }
        if let Some(stage) = event.source.and_then(|id| self.stage_of(id)) {
            if !status.stages.is_active(stage) {
                trace!(event = %event.kind, stage, "ignoring event of inactive stage");
                return true;
            }
        }

        debug!(
            time = event.time,
            event = %event.kind,
            branch = status.branch.name(),
            "flight event"
        );
        status.branch.add_event(event.clone());
        let now = event.time;

        match event.kind {
            Launch => self.on_launch(status, now),
            Ignition => self.on_ignition(status, &event),
            Liftoff => status.liftoff = true,
            LaunchRod => status.rod_cleared = true,
            Burnout => self.on_burnout(status, &event),
            EjectionCharge => self.on_ejection(status, &event),
            StageSeparation => self.on_separation(status, &event, pending),
            Apogee => {
                status.apogee_reached = true;
                self.deploy(status, now, None, |t| t == DeployTrigger::Apogee);
            }
            RecoveryDeviceDeployment => self.on_deployment(status, &event),
            Tumble => {
                if status.any_motor_burning() {
                    abort(status, now, AbortCause::TumbleUnderThrust);
                } else {
                    status.tumbling = true;
                }
            }
            GroundHit => {
                status.landed = true;
                status.queue.push(FlightEvent::new(now, SimulationEnd));
            }
            SimulationEnd => return false,
            SimulationAbort(cause) => {
                warn!(time = now, %cause, branch = status.branch.name(), "branch aborted");
                return false;
            }
        }
        status.update_phase();
        true
    }

    fn stage_of(&self, id: ComponentId) -> Option<usize> {
        self.ctx.rocket.component(id).map(|c| c.stage)
    }

    /// First component of a stage, used as the source of its separation.
    fn stage_component(&self, stage: usize) -> Option<ComponentId> {
        self.ctx.rocket.components().iter().find(|c| c.stage == stage).map(|c| c.id)
    }

    /// Queue the separation of `stage` from the stage above if its trigger
    /// matches.
    fn separate_on(
        &self,
        status: &mut SimulationStatus,
        now: f64,
        stage: usize,
        trigger: SeparationTrigger,
    ) {
        if stage == 0 || !status.stages.is_active(stage) {
            return;
        }
        let Some(sep) = self.ctx.rocket.stages().get(stage).map(|s| s.separation) else {
            return;
        };
        if sep.trigger != trigger {
            return;
        }
        if let Some(source) = self.stage_component(stage) {
            status.queue.push(FlightEvent::with_source(
                now + sep.delay,
                FlightEventKind::StageSeparation,
                source,
            ));
        }
    }

    /// Queue the deployment of every active, undeployed recovery device
    /// (optionally of one stage) whose trigger matches.
    fn deploy<F>(&self, status: &mut SimulationStatus, now: f64, stage: Option<usize>, matches: F)
    where
        F: Fn(DeployTrigger) -> bool,
    {
        for (c, chute) in self.ctx.rocket.parachutes() {
            if !status.stages.is_active(c.stage)
                || stage.is_some_and(|s| s != c.stage)
                || status.deployed.contains(&c.id)
                || !matches(chute.trigger)
            {
                continue;
            }
            status.queue.push(FlightEvent::with_source(
                now + chute.delay,
                FlightEventKind::RecoveryDeviceDeployment,
                c.id,
            ));
        }
    }

    fn ignite(&self, status: &mut SimulationStatus, now: f64, fire: impl Fn(&MotorInstance) -> bool) {
        let ignitions: Vec<FlightEvent> = status
            .active_motors()
            .filter(|m| !m.is_ignited() && fire(m))
            .map(|m| {
                FlightEvent::with_source(
                    now + m.config.ignition_delay,
                    FlightEventKind::Ignition,
                    m.mount,
                )
            })
            .collect();
        for event in ignitions {
            status.queue.push(event);
        }
    }

    fn on_launch(&self, status: &mut SimulationStatus, now: f64) {
        let bottom = status.stages.bottom();
        self.ignite(status, now, |m| match m.config.ignition {
            IgnitionTrigger::Launch => true,
            IgnitionTrigger::Automatic => Some(m.stage) == bottom,
            _ => false,
        });
        for stage in 0..self.ctx.rocket.stage_count() {
            self.separate_on(status, now, stage, SeparationTrigger::Launch);
        }
        self.deploy(status, now, None, |t| t == DeployTrigger::Launch);
    }

    fn on_ignition(&self, status: &mut SimulationStatus, event: &FlightEvent) {
        let now = event.time;
        let Some(motor) = event.source.and_then(|id| status.motor_mut(id)) else {
            return;
        };
        if motor.is_ignited() {
            return;
        }
        motor.ignition_time = Some(now);
        let burnout = now + motor.config.motor.burn_time();
        let (mount, stage) = (motor.mount, motor.stage);
        info!(time = now, designation = %motor.config.motor.designation, "motor ignition");

        status.queue.push(FlightEvent::with_source(burnout, FlightEventKind::Burnout, mount));
        self.separate_on(status, now, stage + 1, SeparationTrigger::UpperStageIgnition);
    }

    fn on_burnout(&self, status: &mut SimulationStatus, event: &FlightEvent) {
        let now = event.time;
        let Some(motor) = event.source.and_then(|id| status.motor_mut(id)) else {
            return;
        };
        motor.burnt_out = true;
        let (mount, stage, ejection) = (motor.mount, motor.stage, motor.config.ejection_delay);

        if !status.liftoff {
            abort(status, now, AbortCause::NoLiftoff);
            return;
        }
        if let Some(delay) = ejection {
            status.queue.push(FlightEvent::with_source(
                now + delay,
                FlightEventKind::EjectionCharge,
                mount,
            ));
        }
        if stage > 0 {
            let upper = stage - 1;
            self.ignite(status, now, |m| {
                m.stage == upper
                    && matches!(
                        m.config.ignition,
                        IgnitionTrigger::PreviousStageBurnout | IgnitionTrigger::Automatic
                    )
            });
        }
        self.separate_on(status, now, stage, SeparationTrigger::Burnout);
    }

    fn on_ejection(&self, status: &mut SimulationStatus, event: &FlightEvent) {
        let Some(stage) = event.source.and_then(|id| self.stage_of(id)) else {
            return;
        };
        self.deploy(status, event.time, Some(stage), |t| t == DeployTrigger::Ejection);
        self.separate_on(status, event.time, stage, SeparationTrigger::Ejection);
    }

    fn on_separation(
        &self,
        status: &mut SimulationStatus,
        event: &FlightEvent,
        pending: &mut VecDeque<SimulationStatus>,
    ) {
        let Some(stage) = event.source.and_then(|id| self.stage_of(id)) else {
            return;
        };
        if stage == 0 || !status.stages.is_active(stage) {
            return;
        }
        let name = self
            .ctx
            .rocket
            .stages()
            .get(stage)
            .map_or_else(|| format!("Stage {}", stage + 1), |s| s.name.clone());

        let mut lower = status.clone();
        lower.stages.deactivate_above(stage);
        lower.branch = FlightDataBranch::branch_from(name.clone(), &status.branch);
        lower.primary = false;
        lower.update_phase();
        self.deploy(&mut lower, event.time, None, |t| t == DeployTrigger::StageSeparation);

        status.stages.deactivate_from(stage);
        status.update_phase();
        info!(time = event.time, stage = %name, "stage separation");
        pending.push_back(lower);
    }

    fn on_deployment(&self, status: &mut SimulationStatus, event: &FlightEvent) {
        let Some(id) = event.source else {
            return;
        };
        if status.deployed.contains(&id) {
            return;
        }
        if status.any_motor_burning() {
            abort(status, event.time, AbortCause::DeploymentUnderThrust);
            return;
        }
        if !status.rod_cleared {
            status.warnings.add(Warning::RecoveryDeploymentOnRod);
        }
        let speed = status.state.vel.norm();
        if speed > MAX_DEPLOYMENT_SPEED {
            status.warnings.add(Warning::HighSpeedDeployment { speed });
        }
        status.deployed.push(id);
    }
}

fn abort(status: &mut SimulationStatus, now: f64, cause: AbortCause) {
    status.queue.push(FlightEvent::new(now, FlightEventKind::SimulationAbort(cause)));
}

// ---------------------------------------------------------------------------
// Data store
// ---------------------------------------------------------------------------

/// Append one data point for the current state. Quantities evaluated
/// during the step come from the start of the step.
fn store_data(status: &mut SimulationStatus, record: Option<&StepRecord>) {
    use FlightDataType::*;

    let s = &status.state;
    let b = &mut status.branch;
    b.add_point();
    b.set_value(Time, s.time);
    b.set_value(Altitude, s.pos.z);
    b.set_value(PositionX, s.pos.x);
    b.set_value(PositionY, s.pos.y);
    b.set_value(LateralDistance, s.lateral_distance());
    b.set_value(VerticalVelocity, s.vel.z);
    b.set_value(TotalVelocity, s.vel.norm());
    b.set_value(Zenith, s.zenith());
    b.set_value(Azimuth, s.azimuth());

    let Some(r) = record else {
        return;
    };
    b.set_value(TimeStep, r.time_step);
    b.set_value(VerticalAcceleration, r.acceleration.z);
    b.set_value(TotalAcceleration, r.acceleration.norm());
    b.set_value(Mach, r.mach);
    b.set_value(Reynolds, r.reynolds);
    b.set_value(AngleOfAttack, r.aoa);
    b.set_value(RollRate, r.rates.x);
    b.set_value(PitchRate, r.rates.y);
    b.set_value(YawRate, r.rates.z);
    b.set_value(CgLocation, r.mass.cg);
    b.set_value(Mass, r.mass.mass);
    b.set_value(PropellantMass, r.mass.propellant_mass);
    b.set_value(LongitudinalInertia, r.mass.longitudinal_inertia);
    b.set_value(RotationalInertia, r.mass.rotational_inertia);
    b.set_value(Thrust, r.thrust);
    b.set_value(Drag, r.drag);
    b.set_value(Gravity, r.gravity);
    b.set_value(DragCoeff, r.drag_coefficient);
    b.set_value(ReferenceLength, r.reference_length);
    b.set_value(ReferenceArea, std::f64::consts::PI * (r.reference_length / 2.0).powi(2));
    b.set_value(AirTemperature, r.atmosphere.temperature);
    b.set_value(AirPressure, r.atmosphere.pressure);
    b.set_value(AirDensity, r.atmosphere.density);
    b.set_value(SpeedOfSound, r.atmosphere.sound_speed);

    if let Some(f) = &r.forces {
        b.set_value(CpLocation, f.cp.x());
        if f.cna > EPSILON && r.reference_length > 0.0 {
            b.set_value(Stability, (f.cp.x() - r.mass.cg) / r.reference_length);
        }
        b.set_value(NormalForceCoeff, f.cn);
        b.set_value(PitchMomentCoeff, f.cm);
        b.set_value(YawMomentCoeff, f.cyaw);
        b.set_value(SideForceCoeff, f.cside);
        b.set_value(RollMomentCoeff, f.croll);
        b.set_value(RollForcingCoeff, f.croll_force);
        b.set_value(RollDampingCoeff, f.croll_damp);
        b.set_value(AxialDragCoeff, f.caxial);
        b.set_value(FrictionDragCoeff, f.friction_cd);
        b.set_value(PressureDragCoeff, f.pressure_cd);
        b.set_value(BaseDragCoeff, f.base_cd);
        b.set_value(PitchDampingCoeff, f.pitch_damping_moment);
        b.set_value(YawDampingCoeff, f.yaw_damping_moment);
    }
}
