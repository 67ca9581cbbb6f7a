//! Recorded flight data: unit-tagged time series per branch, event logs
//! and derived summaries.

pub mod axis;
pub mod branch;
pub mod summary;
pub mod types;

pub use axis::max_value_with_padding;
pub use branch::{FlightData, FlightDataBranch};
pub use summary::FlightSummary;
pub use types::FlightDataType;
