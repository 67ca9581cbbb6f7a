use std::collections::VecDeque;
use std::fmt;

use crate::util::EPSILON;
use crate::vehicle::ComponentId;

use super::state::SimulationState;

// ---------------------------------------------------------------------------
// Flight events
// ---------------------------------------------------------------------------

/// Why a branch was ended early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortCause {
    /// The motors burnt out before the rocket left the pad.
    NoLiftoff,
    TumbleUnderThrust,
    DeploymentUnderThrust,
}

impl fmt::Display for AbortCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortCause::NoLiftoff => write!(f, "motor burnout without liftoff"),
            AbortCause::TumbleUnderThrust => write!(f, "tumbling under thrust"),
            AbortCause::DeploymentUnderThrust => write!(f, "recovery device deployed under thrust"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightEventKind {
    Launch,
    Ignition,
    Liftoff,
    /// The rocket cleared the launch rod.
    LaunchRod,
    Burnout,
    EjectionCharge,
    StageSeparation,
    Apogee,
    RecoveryDeviceDeployment,
    Tumble,
    GroundHit,
    SimulationEnd,
    SimulationAbort(AbortCause),
}

impl fmt::Display for FlightEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightEventKind::Launch => write!(f, "Launch"),
            FlightEventKind::Ignition => write!(f, "Motor ignition"),
            FlightEventKind::Liftoff => write!(f, "Lift-off"),
            FlightEventKind::LaunchRod => write!(f, "Launch rod clearance"),
            FlightEventKind::Burnout => write!(f, "Motor burnout"),
            FlightEventKind::EjectionCharge => write!(f, "Ejection charge"),
            FlightEventKind::StageSeparation => write!(f, "Stage separation"),
            FlightEventKind::Apogee => write!(f, "Apogee"),
            FlightEventKind::RecoveryDeviceDeployment => write!(f, "Recovery device deployment"),
            FlightEventKind::Tumble => write!(f, "Tumbling"),
            FlightEventKind::GroundHit => write!(f, "Ground hit"),
            FlightEventKind::SimulationEnd => write!(f, "Simulation end"),
            FlightEventKind::SimulationAbort(cause) => write!(f, "Simulation abort: {}", cause),
        }
    }
}

/// A discrete event of a flight. `source` names the motor mount, recovery
/// device or stage component the event belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightEvent {
    pub time: f64,
    pub kind: FlightEventKind,
    pub source: Option<ComponentId>,
}

impl FlightEvent {
    pub fn new(time: f64, kind: FlightEventKind) -> Self {
        Self { time, kind, source: None }
    }

    pub fn with_source(time: f64, kind: FlightEventKind, source: ComponentId) -> Self {
        Self { time, kind, source: Some(source) }
    }
}

// ---------------------------------------------------------------------------
// Pending event queue
// ---------------------------------------------------------------------------

/// Events waiting to be handled, ordered by time. Events queued for the
/// same time are handled in insertion order.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: VecDeque<FlightEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: FlightEvent) {
        let at = self.events.partition_point(|e| e.time <= event.time);
        self.events.insert(at, event);
    }

    /// Remove and return the next event due at or before `time`.
    pub fn pop_due(&mut self, time: f64) -> Option<FlightEvent> {
        if self.events.front().is_some_and(|e| e.time <= time + EPSILON) {
            self.events.pop_front()
        } else {
            None
        }
    }

    /// Time of the earliest queued event.
    pub fn next_time(&self) -> Option<f64> {
        self.events.front().map(|e| e.time)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

// ---------------------------------------------------------------------------
// Event detectors
// ---------------------------------------------------------------------------

/// Passive detector inspecting consecutive states.
pub trait EventDetector {
    fn check(&mut self, prev: &SimulationState, current: &SimulationState) -> Option<FlightEventKind>;
}

/// Vertical velocity changing sign from up to down.
#[derive(Debug, Clone, Default)]
pub struct ApogeeDetector {
    fired: bool,
}

impl EventDetector for ApogeeDetector {
    fn check(&mut self, prev: &SimulationState, current: &SimulationState) -> Option<FlightEventKind> {
        if !self.fired && prev.vel.z > 0.0 && current.vel.z <= 0.0 {
            self.fired = true;
            Some(FlightEventKind::Apogee)
        } else {
            None
        }
    }
}

/// Height above the pad exceeding the liftoff threshold.
#[derive(Debug, Clone, Default)]
pub struct LiftoffDetector {
    fired: bool,
}

impl LiftoffDetector {
    pub const HEIGHT: f64 = 0.02; // m
}

impl EventDetector for LiftoffDetector {
    fn check(&mut self, _prev: &SimulationState, current: &SimulationState) -> Option<FlightEventKind> {
        if !self.fired && current.pos.z > Self::HEIGHT {
            self.fired = true;
            Some(FlightEventKind::Liftoff)
        } else {
            None
        }
    }
}

/// Travel from the launch point exceeding the rod length.
#[derive(Debug, Clone)]
pub struct LaunchRodDetector {
    pub length: f64, // m
    fired: bool,
}

impl LaunchRodDetector {
    pub fn new(length: f64) -> Self {
        Self { length, fired: false }
    }
}

impl EventDetector for LaunchRodDetector {
    fn check(&mut self, _prev: &SimulationState, current: &SimulationState) -> Option<FlightEventKind> {
        if !self.fired && current.pos.norm() > self.length {
            self.fired = true;
            Some(FlightEventKind::LaunchRod)
        } else {
            None
        }
    }
}

/// Altitude crossing a threshold in one direction; fires once.
#[derive(Debug, Clone)]
pub struct AltitudeDetector {
    pub altitude: f64,
    pub ascending: bool,
    pub kind: FlightEventKind,
    fired: bool,
}

impl AltitudeDetector {
    pub fn new(altitude: f64, ascending: bool, kind: FlightEventKind) -> Self {
        Self { altitude, ascending, kind, fired: false }
    }
}

impl EventDetector for AltitudeDetector {
    fn check(&mut self, prev: &SimulationState, current: &SimulationState) -> Option<FlightEventKind> {
        if self.fired {
            return None;
        }
        let crossed = if self.ascending {
            prev.pos.z < self.altitude && current.pos.z >= self.altitude
        } else {
            prev.pos.z > self.altitude && current.pos.z <= self.altitude
        };
        if crossed {
            self.fired = true;
            Some(self.kind)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::UnitQuaternion;

    fn make_state(alt: f64, vz: f64) -> SimulationState {
        let mut s = SimulationState::at_rest(UnitQuaternion::identity());
        s.pos.z = alt;
        s.vel.z = vz;
        s
    }

    #[test]
    fn queue_orders_by_time_then_insertion() {
        let mut q = EventQueue::new();
        q.push(FlightEvent::new(2.0, FlightEventKind::Burnout));
        q.push(FlightEvent::new(0.0, FlightEventKind::Launch));
        q.push(FlightEvent::new(0.0, FlightEventKind::Ignition));
        assert_eq!(q.next_time(), Some(0.0));
        assert_eq!(q.pop_due(0.0).map(|e| e.kind), Some(FlightEventKind::Launch));
        assert_eq!(q.pop_due(0.0).map(|e| e.kind), Some(FlightEventKind::Ignition));
        assert!(q.pop_due(1.0).is_none());
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop_due(2.0).map(|e| e.kind), Some(FlightEventKind::Burnout));
        assert!(q.is_empty());
    }

    #[test]
    fn apogee_detected_once() {
        let mut det = ApogeeDetector::default();
        let prev = make_state(500.0, 1.0);
        let curr = make_state(500.1, -0.5);
        assert_eq!(det.check(&prev, &curr), Some(FlightEventKind::Apogee));
        assert!(det.check(&prev, &curr).is_none());
    }

    #[test]
    fn liftoff_threshold() {
        let mut det = LiftoffDetector::default();
        let pad = make_state(0.0, 0.0);
        assert!(det.check(&pad, &make_state(0.01, 1.0)).is_none());
        assert_eq!(det.check(&pad, &make_state(0.03, 1.0)), Some(FlightEventKind::Liftoff));
    }

    #[test]
    fn rod_clearance_uses_travel() {
        let mut det = LaunchRodDetector::new(1.0);
        let pad = make_state(0.0, 0.0);
        let mut s = make_state(0.8, 5.0);
        s.pos.x = 0.5;
        assert_eq!(det.check(&pad, &s), Some(FlightEventKind::LaunchRod));
    }

    #[test]
    fn altitude_detector_descending() {
        let mut det =
            AltitudeDetector::new(100.0, false, FlightEventKind::RecoveryDeviceDeployment);
        assert!(det.check(&make_state(90.0, 5.0), &make_state(110.0, 5.0)).is_none());
        assert!(det.check(&make_state(110.0, -5.0), &make_state(95.0, -5.0)).is_some());
        // Should not fire again
        assert!(det.check(&make_state(110.0, -5.0), &make_state(95.0, -5.0)).is_none());
    }

    #[test]
    fn abort_display() {
        let k = FlightEventKind::SimulationAbort(AbortCause::NoLiftoff);
        assert!(k.to_string().contains("without liftoff"));
    }
}
