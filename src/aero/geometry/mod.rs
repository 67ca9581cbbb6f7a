//! Reduction of raw component shapes into the cached scalars and spanwise
//! arrays the coefficient calculators work on.

pub mod body;
pub mod fin;
pub mod tube;

pub use body::BodyGeometry;
pub use fin::{interference_fin_count, AxialExtent, FinGeometry, DIVISIONS};
pub use tube::{RailButtonGeometry, TubeGeometry};
