use std::fmt;
use std::mem;

// ---------------------------------------------------------------------------
// Simulation warnings
// ---------------------------------------------------------------------------

/// Non-fatal condition detected during geometry reduction or flight.
/// Two warnings are the same kind if their variants match; payloads only
/// record the first occurrence.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Fin thicker than half the body radius.
    ThickFin,
    /// Fin outline whose trailing edge goes back outward after turning in.
    JaggedFin,
    ZeroAreaFin,
    /// More than eight fins interfering at one axial station.
    ParallelFins,
    Supersonic,
    LargeAngleOfAttack { aoa: f64 },
    /// Airframe radius jumps between adjacent components.
    DiameterDiscontinuity,
    NoRecoveryDevice,
    RecoveryDeploymentOnRod,
    HighSpeedDeployment { speed: f64 },
    EventAfterLanding { event: String },
    TimeLimitReached { time: f64 },
}

impl Warning {
    pub fn same_kind(&self, other: &Warning) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ThickFin => write!(f, "Thick fins may not be modeled accurately"),
            Warning::JaggedFin => write!(f, "Jagged-edged fin predictions may be inaccurate"),
            Warning::ZeroAreaFin => write!(f, "Fin set with zero area"),
            Warning::ParallelFins => write!(f, "Too many parallel fins"),
            Warning::Supersonic => write!(f, "Body calculations may not be accurate at supersonic speeds"),
            Warning::LargeAngleOfAttack { aoa } => write!(
                f,
                "Large angle of attack encountered ({:.1} deg)",
                aoa.to_degrees()
            ),
            Warning::DiameterDiscontinuity => write!(f, "Discontinuity in rocket body diameter"),
            Warning::NoRecoveryDevice => write!(f, "No recovery device defined in the simulation"),
            Warning::RecoveryDeploymentOnRod => {
                write!(f, "Recovery device deployed while on the launch guide")
            }
            Warning::HighSpeedDeployment { speed } => {
                write!(f, "Recovery device deployment at high speed ({:.1} m/s)", speed)
            }
            Warning::EventAfterLanding { event } => {
                write!(f, "Flight event occurred after landing: {}", event)
            }
            Warning::TimeLimitReached { time } => {
                write!(f, "Simulation stopped at the time limit ({:.0} s)", time)
            }
        }
    }
}

/// Insertion-ordered set of warnings, deduplicated by kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarningSet {
    warnings: Vec<Warning>,
}

impl WarningSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning. Returns false if one of the same kind is already present.
    pub fn add(&mut self, warning: Warning) -> bool {
        if self.warnings.iter().any(|w| w.same_kind(&warning)) {
            return false;
        }
        self.warnings.push(warning);
        true
    }

    pub fn add_all(&mut self, other: &WarningSet) {
        for w in other.iter() {
            self.add(w.clone());
        }
    }

    pub fn contains(&self, warning: &Warning) -> bool {
        self.warnings.iter().any(|w| w.same_kind(warning))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.warnings.iter()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn clear(&mut self) {
        self.warnings.clear();
    }
}

impl<'a> IntoIterator for &'a WarningSet {
    type Item = &'a Warning;
    type IntoIter = std::slice::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.warnings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_kind_is_noop() {
        let mut set = WarningSet::new();
        assert!(set.add(Warning::ThickFin));
        assert!(!set.add(Warning::ThickFin));
        assert!(set.add(Warning::LargeAngleOfAttack { aoa: 0.4 }));
        assert!(!set.add(Warning::LargeAngleOfAttack { aoa: 0.9 }));
        assert_eq!(set.len(), 2);
        // first payload is kept
        assert_eq!(set.iter().nth(1), Some(&Warning::LargeAngleOfAttack { aoa: 0.4 }));
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut set = WarningSet::new();
        set.add(Warning::Supersonic);
        set.add(Warning::JaggedFin);
        set.add(Warning::ThickFin);
        let kinds: Vec<_> = set.iter().cloned().collect();
        assert_eq!(kinds, vec![Warning::Supersonic, Warning::JaggedFin, Warning::ThickFin]);
    }

    #[test]
    fn merge_sets() {
        let mut a = WarningSet::new();
        a.add(Warning::ThickFin);
        let mut b = WarningSet::new();
        b.add(Warning::ThickFin);
        b.add(Warning::ParallelFins);
        a.add_all(&b);
        assert_eq!(a.len(), 2);
        assert!(a.contains(&Warning::ParallelFins));
    }
}
