//! Astronomical tidal constituents

/// A sinusoidal component of the astronomical tide
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constituent {
    pub name: &'static str,
    pub period_hours: f64,
}

impl Constituent {
    pub const fn new(name: &'static str, period_hours: f64) -> Self {
        Self { name, period_hours }
    }

    /// Cycles per hour
    pub fn frequency(&self) -> f64 {
        1.0 / self.period_hours
    }

    /// Radians per hour
    pub fn angular_frequency(&self) -> f64 {
        2.0 * std::f64::consts::PI * self.frequency()
    }
}

/// Principal lunar semidiurnal
pub const M2: Constituent = Constituent::new("M2", 12.420_601_2);
/// Principal solar semidiurnal
pub const S2: Constituent = Constituent::new("S2", 12.0);
/// Larger lunar elliptic semidiurnal
pub const N2: Constituent = Constituent::new("N2", 12.658_347_5);
/// Lunisolar diurnal
pub const K1: Constituent = Constituent::new("K1", 23.934_472_1);
/// Lunar diurnal
pub const O1: Constituent = Constituent::new("O1", 25.819_338_7);
/// Shallow-water overtide of M2
pub const M4: Constituent = Constituent::new("M4", 6.210_300_6);
/// Shallow-water compound of M2 and S2
pub const MS4: Constituent = Constituent::new("MS4", 6.103_339_3);
/// Shallow-water overtide of M2
pub const M6: Constituent = Constituent::new("M6", 4.140_200_4);

/// Constituents in the order they are admitted into a harmonic fit
pub const PRIORITY: [Constituent; 8] = [M2, K1, S2, O1, N2, M4, MS4, M6];

/// Major constituents a residual oscillation is compared against
pub const TIDAL_REFERENCES: [Constituent; 5] = [M2, S2, N2, K1, O1];

/// Constituents a record of `span_hours` can separate
///
/// A constituent needs two full periods within the record and must be at
/// least one Rayleigh resolution (`1 / span`) away from every constituent
/// already admitted.
pub fn resolvable(span_hours: f64) -> Vec<Constituent> {
    let mut admitted: Vec<Constituent> = Vec::new();
    for candidate in PRIORITY {
        if span_hours < 2.0 * candidate.period_hours {
            continue;
        }
        let separated = admitted
            .iter()
            .all(|c| (c.frequency() - candidate.frequency()).abs() * span_hours >= 1.0);
        if separated {
            admitted.push(candidate);
        }
    }
    admitted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(constituents: &[Constituent]) -> Vec<&'static str> {
        constituents.iter().map(|c| c.name).collect()
    }

    #[test]
    fn test_three_day_record() {
        assert_eq!(names(&resolvable(72.0)), vec!["M2", "K1", "M4", "M6"]);
    }

    #[test]
    fn test_short_record_keeps_semidiurnal_only() {
        assert_eq!(names(&resolvable(30.0)), vec!["M2", "M4", "M6"]);
        assert!(resolvable(20.0).iter().all(|c| c.period_hours < 10.0));
    }

    #[test]
    fn test_month_long_record_separates_everything() {
        assert_eq!(
            names(&resolvable(30.0 * 24.0)),
            vec!["M2", "K1", "S2", "O1", "N2", "M4", "MS4", "M6"]
        );
    }
}
