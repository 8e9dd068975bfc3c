//! Least-squares harmonic tide model
//!
//! Fits `level(t) = a + b·t + Σ (c_k cos ω_k t + s_k sin ω_k t)` over the
//! constituents the record can resolve. The normal equations are solved by
//! Cholesky, falling back to SVD when the system is rank deficient.

use crate::constituents::{self, Constituent};
use nalgebra::{DMatrix, DVector};
use poseidon_core::{ensure_finite, Error, Result};
use tracing::debug;

/// Singular values below this are treated as zero in the SVD fallback
const SVD_EPSILON: f64 = 1e-10;

/// Fitted amplitude and phase of one constituent
#[derive(Debug, Clone, PartialEq)]
pub struct ConstituentFit {
    pub name: &'static str,
    pub period_hours: f64,
    /// Same unit as the input series
    pub amplitude: f64,
    /// Phase lag in degrees, `[0, 360)`, relative to the first sample
    pub phase_degrees: f64,
}

/// Harmonic model fitted to a record
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicFit {
    /// Hour, on the input time axis, that `mean_level` refers to
    pub reference_hour: f64,
    /// Model level at the middle of the record
    pub mean_level: f64,
    /// Linear trend in units per hour
    pub trend_per_hour: f64,
    pub constituents: Vec<ConstituentFit>,
    /// Model evaluated at every input sample
    pub fitted: Vec<f64>,
}

impl HarmonicFit {
    /// The constituent with the largest amplitude
    pub fn strongest(&self) -> Option<&ConstituentFit> {
        self.constituents
            .iter()
            .max_by(|a, b| a.amplitude.total_cmp(&b.amplitude))
    }

    /// Model at `hours`, each constituent scaled by `weight(frequency_cph)`
    ///
    /// Mean and trend are never scaled. A weight of one everywhere
    /// reproduces [`HarmonicFit::fitted`] on the input time axis.
    pub fn evaluate<W>(&self, hours: &[f64], weight: W) -> Vec<f64>
    where
        W: Fn(f64) -> f64,
    {
        let weights: Vec<f64> = self
            .constituents
            .iter()
            .map(|c| weight(1.0 / c.period_hours))
            .collect();
        hours
            .iter()
            .map(|&t| {
                let tidal: f64 = self
                    .constituents
                    .iter()
                    .zip(&weights)
                    .map(|(c, w)| w * c.value_at(t))
                    .sum();
                self.mean_level + self.trend_per_hour * (t - self.reference_hour) + tidal
            })
            .collect()
    }
}

impl ConstituentFit {
    /// `amplitude · cos(ωt − phase)` at hour `t`
    pub fn value_at(&self, t: f64) -> f64 {
        let omega = 2.0 * std::f64::consts::PI / self.period_hours;
        self.amplitude * (omega * t - self.phase_degrees.to_radians()).cos()
    }
}

/// Fit the harmonic model to `values` observed at `hours` since the first sample
///
/// Uses every constituent the record length can resolve.
pub fn fit(hours: &[f64], values: &[f64]) -> Result<HarmonicFit> {
    fit_with(hours, values, &constituents::resolvable(record_span(hours)))
}

/// Fit the harmonic model with an explicit constituent set
pub fn fit_with(hours: &[f64], values: &[f64], included: &[Constituent]) -> Result<HarmonicFit> {
    if hours.len() != values.len() {
        return Err(Error::size_mismatch(hours.len(), values.len(), "harmonic fit"));
    }
    let n = values.len();
    let span = record_span(hours);
    let columns = 2 + 2 * included.len();
    if n < columns {
        return Err(Error::InsufficientData {
            expected: columns,
            actual: n,
        });
    }
    ensure_finite(values, "harmonic fit input")?;

    // Centre and scale time for the trend column so it is comparable to the
    // unit-amplitude sinusoids
    let mid = hours[0] + span / 2.0;
    let half_span = (span / 2.0).max(f64::EPSILON);

    let design = DMatrix::from_fn(n, columns, |row, col| {
        let t = hours[row];
        match col {
            0 => 1.0,
            1 => (t - mid) / half_span,
            _ => {
                let constituent = &included[(col - 2) / 2];
                let angle = constituent.angular_frequency() * t;
                if col % 2 == 0 {
                    angle.cos()
                } else {
                    angle.sin()
                }
            }
        }
    });
    let observed = DVector::from_column_slice(values);

    let xtx = design.transpose() * &design;
    let xty = design.transpose() * &observed;

    let coeffs = match xtx.clone().cholesky() {
        Some(chol) => chol.solve(&xty),
        None => {
            debug!("Normal equations not positive definite, falling back to SVD");
            xtx.svd(true, true)
                .solve(&xty, SVD_EPSILON)
                .map_err(|e| Error::NumericalFailure(format!("harmonic least squares: {e}")))?
        }
    };
    ensure_finite(coeffs.as_slice(), "harmonic coefficients")?;

    let fitted_vector = &design * &coeffs;
    let fitted = fitted_vector.as_slice().to_vec();

    let constituents = included
        .iter()
        .enumerate()
        .map(|(k, c)| constituent_fit(c, coeffs[2 + 2 * k], coeffs[3 + 2 * k]))
        .collect();

    debug!(
        "Harmonic fit over {:.1} h with {} constituents",
        span,
        included.len()
    );

    Ok(HarmonicFit {
        reference_hour: mid,
        mean_level: coeffs[0],
        trend_per_hour: coeffs[1] / half_span,
        constituents,
        fitted,
    })
}

/// Hours between the first and last observation
pub fn record_span(hours: &[f64]) -> f64 {
    match (hours.first(), hours.last()) {
        (Some(first), Some(last)) => last - first,
        _ => 0.0,
    }
}

fn constituent_fit(constituent: &Constituent, cos_coeff: f64, sin_coeff: f64) -> ConstituentFit {
    // c cos(ωt) + s sin(ωt) = A cos(ωt - φ)
    let amplitude = cos_coeff.hypot(sin_coeff);
    let phase_degrees = sin_coeff.atan2(cos_coeff).to_degrees().rem_euclid(360.0);
    ConstituentFit {
        name: constituent.name,
        period_hours: constituent.period_hours,
        amplitude,
        phase_degrees,
    }
}
