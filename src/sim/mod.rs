//! Flight simulation: rigid-body state, flight events, integration steppers
//! and the event-driven engine that ties them together.

pub mod engine;
pub mod event;
pub mod options;
pub mod state;
pub mod status;
pub mod stepper;

pub use engine::{CannotRunReason, Simulation, SimulationAbort, SimulationOutcome};
pub use event::{AbortCause, EventDetector, EventQueue, FlightEvent, FlightEventKind};
pub use options::SimulationOptions;
pub use state::{FlightPhase, SimulationState, StateDerivative};
pub use status::SimulationStatus;
pub use stepper::{DescentStepper, RK4Stepper, StepContext, StepRecord, Stepper};
