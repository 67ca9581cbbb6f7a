use thiserror::Error;

use crate::sim::FlightPhase;

/// Fatal errors raised by the aerodynamic calculators and the simulation
/// engine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimulationError {
    /// A component shape or profile the calculators have no model for.
    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),
    /// A model invariant was violated; indicates a bug, not bad input.
    #[error("internal consistency error: {0}")]
    InternalConsistency(String),
    /// Numerical failure during integration.
    #[error("simulation failed at t={time:.3} s during {phase}: {message}")]
    Calculation { time: f64, phase: FlightPhase, message: String },
    #[error("simulation cancelled at t={time:.3} s")]
    Cancelled { time: f64 },
}

impl SimulationError {
    pub fn calculation(time: f64, phase: FlightPhase, message: impl Into<String>) -> Self {
        SimulationError::Calculation { time, phase, message: message.into() }
    }
}
