pub mod aero;
pub mod config;
pub mod data;
pub mod error;
pub mod io;
pub mod physics;
pub mod sim;
pub mod util;
pub mod vehicle;

pub use aero::{AerodynamicForces, BarrowmanCalculator, FlightConditions, Warning, WarningSet};
pub use data::{FlightData, FlightDataBranch, FlightDataType, FlightSummary};
pub use error::SimulationError;
pub use sim::{
    CannotRunReason, FlightEvent, FlightEventKind, FlightPhase, Simulation, SimulationAbort,
    SimulationOptions, SimulationOutcome,
};
pub use vehicle::{presets, Rocket, RocketBuilder};
