use nalgebra::{UnitQuaternion, Vector3};

use crate::aero::WarningSet;
use crate::data::FlightDataBranch;
use crate::vehicle::{ComponentId, MotorInstance, StageSet};

use super::event::{
    AltitudeDetector, ApogeeDetector, EventQueue, LaunchRodDetector, LiftoffDetector,
};
use super::options::SimulationOptions;
use super::state::{FlightPhase, SimulationState};

// ---------------------------------------------------------------------------
// Launch rod
// ---------------------------------------------------------------------------

/// Unit vector along the launch rod for a tilt from vertical and a compass
/// heading (clockwise from north).
pub fn launch_rod_direction(angle: f64, direction: f64) -> Vector3<f64> {
    let heading = std::f64::consts::FRAC_PI_2 - direction;
    Vector3::new(
        angle.sin() * heading.cos(),
        angle.sin() * heading.sin(),
        angle.cos(),
    )
}

// ---------------------------------------------------------------------------
// Per-branch simulation status
// ---------------------------------------------------------------------------

/// Everything the engine tracks for one independently flying body.
/// Cloned at stage separation to start the separated stage's branch.
#[derive(Debug, Clone)]
pub struct SimulationStatus {
    pub state: SimulationState,
    pub phase: FlightPhase,
    pub stages: StageSet,
    pub motors: Vec<MotorInstance>,
    pub rod_direction: Vector3<f64>,

    pub liftoff: bool,
    pub rod_cleared: bool,
    pub apogee_reached: bool,
    pub tumbling: bool,
    pub landed: bool,
    /// Deployed recovery devices.
    pub deployed: Vec<ComponentId>,
    /// False for branches split off at stage separation.
    pub primary: bool,

    pub queue: EventQueue,
    pub branch: FlightDataBranch,
    /// Flight-condition warnings raised in this branch.
    pub warnings: WarningSet,
    pub prev_time_step: f64,

    pub(crate) liftoff_detector: LiftoffDetector,
    pub(crate) rod_detector: LaunchRodDetector,
    pub(crate) apogee_detector: ApogeeDetector,
    /// Altitude-triggered recovery devices.
    pub(crate) deploy_detectors: Vec<(ComponentId, AltitudeDetector)>,
}

impl SimulationStatus {
    pub fn new(
        options: &SimulationOptions,
        stages: StageSet,
        motors: Vec<MotorInstance>,
        branch: FlightDataBranch,
    ) -> Self {
        let rod_direction =
            launch_rod_direction(options.launch_rod_angle, options.launch_rod_direction);
        let orientation = UnitQuaternion::rotation_between(&Vector3::z(), &rod_direction)
            .unwrap_or_else(UnitQuaternion::identity);
        Self {
            state: SimulationState::at_rest(orientation),
            phase: FlightPhase::OnPad,
            stages,
            motors,
            rod_direction,
            liftoff: false,
            rod_cleared: false,
            apogee_reached: false,
            tumbling: false,
            landed: false,
            deployed: vec![],
            primary: true,
            queue: EventQueue::new(),
            branch,
            warnings: WarningSet::new(),
            prev_time_step: options.time_step,
            liftoff_detector: LiftoffDetector::default(),
            rod_detector: LaunchRodDetector::new(options.launch_rod_length),
            apogee_detector: ApogeeDetector::default(),
            deploy_detectors: vec![],
        }
    }

    pub fn time(&self) -> f64 {
        self.state.time
    }

    /// Total thrust of the burning motors of the active stages (N).
    pub fn thrust(&self, time: f64) -> f64 {
        self.active_motors().map(|m| m.thrust(time)).sum()
    }

    pub fn active_motors(&self) -> impl Iterator<Item = &MotorInstance> {
        self.motors.iter().filter(|m| self.stages.is_active(m.stage))
    }

    pub fn any_motor_burning(&self) -> bool {
        self.active_motors().any(|m| m.is_burning())
    }

    pub fn motor_mut(&mut self, mount: ComponentId) -> Option<&mut MotorInstance> {
        self.motors.iter_mut().find(|m| m.mount == mount)
    }

    /// Recompute the flight phase from the status flags and log changes to
    /// the data branch.
    pub fn update_phase(&mut self) {
        self.phase = if self.landed {
            FlightPhase::Landed
        } else if !self.deployed.is_empty() {
            FlightPhase::RecoveryDeployed
        } else if self.tumbling {
            FlightPhase::Tumbling
        } else if !self.rod_cleared {
            if self.active_motors().any(|m| m.is_ignited()) {
                FlightPhase::OnRod
            } else {
                FlightPhase::OnPad
            }
        } else if self.any_motor_burning() {
            FlightPhase::Powered
        } else {
            FlightPhase::Coast
        };
        self.branch.record_phase(self.state.time, self.phase);
    }
}
