use std::io::{self, Write};
use std::path::Path;

use crate::data::{FlightDataBranch, FlightDataType};

/// Write every recorded series of a branch as CSV, one row per data point.
///
/// Header cells are `name (unit)`; values that were not recorded for a
/// point are written as empty cells.
pub fn write_branch<W: Write>(writer: &mut W, branch: &FlightDataBranch) -> io::Result<()> {
    let columns: Vec<(FlightDataType, &[f64])> = FlightDataType::ALL
        .iter()
        .filter_map(|&t| branch.get(t).map(|values| (t, values)))
        .collect();

    let header: Vec<String> = columns
        .iter()
        .map(|(t, _)| match t.unit() {
            "" => t.name().to_string(),
            unit => format!("{} ({})", t.name(), unit),
        })
        .collect();
    writeln!(writer, "{}", header.join(","))?;

    for row in 0..branch.len() {
        let cells: Vec<String> = columns
            .iter()
            .map(|(_, values)| match values.get(row) {
                Some(v) if !v.is_nan() => format!("{:.6}", v),
                _ => String::new(),
            })
            .collect();
        writeln!(writer, "{}", cells.join(","))?;
    }

    Ok(())
}

/// Write a branch to a CSV file at the given path.
pub fn write_branch_file<P: AsRef<Path>>(path: P, branch: &FlightDataBranch) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write_branch(&mut file, branch)?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_output_has_header_and_rows() {
        let mut branch = FlightDataBranch::new("test");
        branch.add_point();
        branch.set_value(FlightDataType::Time, 0.0);
        branch.set_value(FlightDataType::Altitude, 0.0);
        branch.add_point();
        branch.set_value(FlightDataType::Time, 0.01);
        branch.set_value(FlightDataType::Altitude, 1.5);
        branch.set_value(FlightDataType::Mach, 0.02);

        let mut buf = Vec::new();
        write_branch(&mut buf, &branch).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3); // header + 2 data rows
        assert!(lines[0].starts_with("Time (s),Altitude (m)"), "{}", lines[0]);
        assert!(lines[1].starts_with("0.000000,0.000000,"));
        // Mach was not recorded for the first point
        assert!(lines[1].ends_with(','));
    }
}
