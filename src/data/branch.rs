use std::collections::BTreeMap;

use crate::aero::WarningSet;
use crate::sim::{FlightEvent, FlightEventKind, FlightPhase};

use super::types::FlightDataType;

// ---------------------------------------------------------------------------
// Flight data branch
// ---------------------------------------------------------------------------

/// Parallel time series of one independently flying body plus its event
/// log. Every series has one value per recorded point; quantities not set
/// for a point hold NaN.
#[derive(Debug, Clone, Default)]
pub struct FlightDataBranch {
    name: String,
    series: BTreeMap<FlightDataType, Vec<f64>>,
    len: usize,
    events: Vec<FlightEvent>,
    /// Phase changes as (time, new phase).
    phases: Vec<(f64, FlightPhase)>,
}

impl FlightDataBranch {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// New branch starting with a copy of everything recorded in `parent`.
    pub fn branch_from(name: impl Into<String>, parent: &FlightDataBranch) -> Self {
        Self { name: name.into(), ..parent.clone() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start a new data point.
    pub fn add_point(&mut self) {
        self.len += 1;
        for values in self.series.values_mut() {
            values.push(f64::NAN);
        }
    }

    /// Set a value of the latest point. Ignored before the first point.
    pub fn set_value(&mut self, kind: FlightDataType, value: f64) {
        if self.len == 0 {
            return;
        }
        let len = self.len;
        let values = self.series.entry(kind).or_insert_with(|| vec![f64::NAN; len]);
        if let Some(last) = values.last_mut() {
            *last = value;
        }
    }

    pub fn get(&self, kind: FlightDataType) -> Option<&[f64]> {
        self.series.get(&kind).map(|v| v.as_slice())
    }

    pub fn last(&self, kind: FlightDataType) -> Option<f64> {
        self.series.get(&kind).and_then(|v| v.last().copied())
    }

    /// Smallest non-NaN value of a series.
    pub fn minimum(&self, kind: FlightDataType) -> Option<f64> {
        self.finite(kind).reduce(f64::min)
    }

    /// Largest non-NaN value of a series.
    pub fn maximum(&self, kind: FlightDataType) -> Option<f64> {
        self.finite(kind).reduce(f64::max)
    }

    fn finite(&self, kind: FlightDataType) -> impl Iterator<Item = f64> + '_ {
        self.series.get(&kind).into_iter().flatten().copied().filter(|v| !v.is_nan())
    }

    /// Recorded quantity types, in enumeration order.
    pub fn types(&self) -> impl Iterator<Item = FlightDataType> + '_ {
        self.series.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Record an event, keeping the log time-ordered.
    pub fn add_event(&mut self, event: FlightEvent) {
        let at = self.events.partition_point(|e| e.time <= event.time);
        self.events.insert(at, event);
    }

    pub fn events(&self) -> &[FlightEvent] {
        &self.events
    }

    pub fn first_event(&self, kind: FlightEventKind) -> Option<&FlightEvent> {
        self.events.iter().find(|e| e.kind == kind)
    }

    pub fn last_event(&self, kind: FlightEventKind) -> Option<&FlightEvent> {
        self.events.iter().rev().find(|e| e.kind == kind)
    }

    /// Note the flight phase at `time`; only changes are kept.
    pub fn record_phase(&mut self, time: f64, phase: FlightPhase) {
        if self.phases.last().map(|p| p.1) != Some(phase) {
            self.phases.push((time, phase));
        }
    }

    pub fn phases(&self) -> &[(f64, FlightPhase)] {
        &self.phases
    }
}

// ---------------------------------------------------------------------------
// Result of a run
// ---------------------------------------------------------------------------

/// All branches of one run, in order of creation, plus the warnings raised.
/// The first branch follows the topmost stage.
#[derive(Debug, Clone, Default)]
pub struct FlightData {
    branches: Vec<FlightDataBranch>,
    warnings: WarningSet,
}

impl FlightData {
    pub fn new(branches: Vec<FlightDataBranch>, warnings: WarningSet) -> Self {
        Self { branches, warnings }
    }

    pub fn branches(&self) -> &[FlightDataBranch] {
        &self.branches
    }

    pub fn branch(&self, index: usize) -> Option<&FlightDataBranch> {
        self.branches.get(index)
    }

    pub fn primary(&self) -> Option<&FlightDataBranch> {
        self.branches.first()
    }

    pub fn warnings(&self) -> &WarningSet {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_keep_series_parallel() {
        let mut b = FlightDataBranch::new("Sustainer");
        b.add_point();
        b.set_value(FlightDataType::Time, 0.0);
        b.add_point();
        b.set_value(FlightDataType::Time, 0.1);
        b.set_value(FlightDataType::Altitude, 2.0);
        assert_eq!(b.len(), 2);
        let alt = b.get(FlightDataType::Altitude).unwrap();
        assert_eq!(alt.len(), 2);
        assert!(alt[0].is_nan());
        assert_eq!(b.last(FlightDataType::Altitude), Some(2.0));
        assert_eq!(b.minimum(FlightDataType::Altitude), Some(2.0));
        assert_eq!(b.maximum(FlightDataType::Time), Some(0.1));
        assert!(b.get(FlightDataType::Mach).is_none());
    }

    #[test]
    fn value_before_first_point_is_ignored() {
        let mut b = FlightDataBranch::new("b");
        b.set_value(FlightDataType::Time, 1.0);
        assert!(b.is_empty());
        assert!(b.get(FlightDataType::Time).is_none());
    }

    #[test]
    fn events_are_time_ordered() {
        let mut b = FlightDataBranch::new("b");
        b.add_event(FlightEvent::new(3.0, FlightEventKind::Apogee));
        b.add_event(FlightEvent::new(1.0, FlightEventKind::Burnout));
        b.add_event(FlightEvent::new(3.0, FlightEventKind::RecoveryDeviceDeployment));
        let kinds: Vec<_> = b.events().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FlightEventKind::Burnout,
                FlightEventKind::Apogee,
                FlightEventKind::RecoveryDeviceDeployment
            ]
        );
        assert_eq!(b.first_event(FlightEventKind::Apogee).map(|e| e.time), Some(3.0));
    }

    #[test]
    fn phase_log_keeps_changes_only() {
        let mut b = FlightDataBranch::new("b");
        b.record_phase(0.0, FlightPhase::OnPad);
        b.record_phase(0.0, FlightPhase::OnRod);
        b.record_phase(0.1, FlightPhase::OnRod);
        b.record_phase(0.4, FlightPhase::Powered);
        assert_eq!(
            b.phases(),
            &[(0.0, FlightPhase::OnPad), (0.0, FlightPhase::OnRod), (0.4, FlightPhase::Powered)]
        );
    }

    #[test]
    fn branch_from_copies_history() {
        let mut parent = FlightDataBranch::new("Sustainer");
        parent.add_point();
        parent.set_value(FlightDataType::Altitude, 10.0);
        parent.add_event(FlightEvent::new(0.0, FlightEventKind::Launch));
        let mut booster = FlightDataBranch::branch_from("Booster", &parent);
        booster.add_point();
        booster.set_value(FlightDataType::Altitude, 11.0);
        assert_eq!(booster.name(), "Booster");
        assert_eq!(booster.len(), 2);
        assert_eq!(booster.events().len(), 1);
        assert_eq!(parent.len(), 1);
    }
}
