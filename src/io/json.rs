use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::to_writer_pretty;

use crate::data::{FlightData, FlightDataBranch, FlightSummary};

/// Performance figures of one branch; `null` for values never reached.
#[derive(Debug, Serialize)]
struct Performance {
    max_altitude_m: Option<f64>,
    time_to_apogee_s: Option<f64>,
    max_velocity_m_s: Option<f64>,
    max_acceleration_m_s2: Option<f64>,
    max_mach: Option<f64>,
    launch_rod_velocity_m_s: Option<f64>,
    deployment_velocity_m_s: Option<f64>,
    ground_hit_velocity_m_s: Option<f64>,
    flight_time_s: Option<f64>,
}

impl From<&FlightSummary> for Performance {
    fn from(s: &FlightSummary) -> Self {
        let reached = |x: f64| x.is_finite().then_some(x);
        Self {
            max_altitude_m: reached(s.max_altitude),
            time_to_apogee_s: reached(s.time_to_apogee),
            max_velocity_m_s: reached(s.max_velocity),
            max_acceleration_m_s2: reached(s.max_acceleration),
            max_mach: reached(s.max_mach),
            launch_rod_velocity_m_s: reached(s.launch_rod_velocity),
            deployment_velocity_m_s: reached(s.deployment_velocity),
            ground_hit_velocity_m_s: reached(s.ground_hit_velocity),
            flight_time_s: reached(s.flight_time),
        }
    }
}

#[derive(Debug, Serialize)]
struct TimedLabel {
    time_s: f64,
    label: String,
}

#[derive(Debug, Serialize)]
struct BranchReport<'a> {
    name: &'a str,
    performance: Performance,
    phases: Vec<TimedLabel>,
    events: Vec<TimedLabel>,
}

impl<'a> BranchReport<'a> {
    fn new(branch: &'a FlightDataBranch) -> Self {
        Self {
            name: branch.name(),
            performance: Performance::from(&FlightSummary::from_branch(branch)),
            phases: branch
                .phases()
                .iter()
                .map(|(t, p)| TimedLabel { time_s: *t, label: p.to_string() })
                .collect(),
            events: branch
                .events()
                .iter()
                .map(|e| TimedLabel { time_s: e.time, label: e.kind.to_string() })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FlightReport<'a> {
    rocket: &'a str,
    branches: Vec<BranchReport<'a>>,
    warnings: Vec<String>,
}

/// Write per-branch flight summaries, phases, events and warnings as JSON.
pub fn write_summary<W: Write>(writer: &mut W, rocket: &str, data: &FlightData) -> io::Result<()> {
    let report = FlightReport {
        rocket,
        branches: data.branches().iter().map(BranchReport::new).collect(),
        warnings: data.warnings().iter().map(|w| w.to_string()).collect(),
    };
    to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)
}

/// Write the flight summary JSON to a file.
pub fn write_summary_file<P: AsRef<Path>>(
    path: P,
    rocket: &str,
    data: &FlightData,
) -> io::Result<()> {
    let mut file = File::create(path)?;
    write_summary(&mut file, rocket, data)
}
