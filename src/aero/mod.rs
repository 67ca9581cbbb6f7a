//! Extended-Barrowman aerodynamic coefficient engine.

pub mod barrowman;
pub mod calc;
pub mod conditions;
pub mod drag;
pub mod forces;
pub mod geometry;
pub mod warning;

pub use barrowman::{BarrowmanCalculator, LARGE_AOA};
pub use calc::{AerodynamicCalc, ComponentCalc};
pub use conditions::FlightConditions;
pub use forces::{AerodynamicForces, WeightedPoint};
pub use warning::{Warning, WarningSet};
