//! CSV and JSON export of flight data.

pub mod csv;
pub mod json;

pub use csv::{write_branch, write_branch_file};
pub use json::{write_summary, write_summary_file};
