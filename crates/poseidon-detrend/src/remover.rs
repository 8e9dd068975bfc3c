//! Tide removal entry point

use crate::constituents::M2;
use crate::harmonic::{self, HarmonicFit};
use crate::lowpass::{LowpassFilter, LowpassParameters};
use poseidon_core::{ensure_finite, stats, Error, Result, TideRemovalMethod, TimeSeries};
use tracing::{debug, instrument};

/// Fewest samples any tide removal runs on
pub const MIN_SAMPLES: usize = 16;

/// Shortest record that resolves the principal lunar tide, in hours
pub fn min_span_hours() -> f64 {
    2.0 * M2.period_hours
}

/// Samples needed to span [`min_span_hours`] at `dt_hours` spacing
pub fn required_samples(dt_hours: Option<f64>) -> usize {
    match dt_hours {
        Some(dt) if dt > 0.0 => {
            let needed = (min_span_hours() / dt).ceil() as usize + 1;
            needed.max(MIN_SAMPLES)
        }
        _ => MIN_SAMPLES,
    }
}

/// Splits a sea-level record into its tidal/trend component
#[derive(Debug, Clone, Copy, Default)]
pub struct TideRemover {
    method: TideRemovalMethod,
    lowpass: LowpassParameters,
}

impl TideRemover {
    pub fn new(method: TideRemovalMethod) -> Self {
        Self {
            method,
            lowpass: LowpassParameters::default(),
        }
    }

    pub fn with_lowpass_parameters(mut self, params: LowpassParameters) -> Self {
        self.lowpass = params;
        self
    }

    pub fn method(&self) -> TideRemovalMethod {
        self.method
    }

    /// Tidal and trend component of `series`, on the same timestamps
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - [`Error::InsufficientData`] when the record is shorter than two M2
    ///   periods or has fewer than [`MIN_SAMPLES`] samples
    /// - [`Error::NumericalFailure`] on non-finite input or output
    /// - [`Error::DegenerateSignal`] when the record is (nearly) constant
    #[instrument(skip_all, fields(method = self.method.name(), samples = series.len()))]
    pub fn remove(&self, series: &TimeSeries) -> Result<TimeSeries> {
        let dt = validate(series)?;
        let values = series.values();

        let detrended = match self.method {
            TideRemovalMethod::Lowpass => {
                LowpassFilter::new(self.lowpass).filter_values(&values, dt)?
            }
            TideRemovalMethod::HarmonicModel => {
                harmonic::fit(&series.elapsed_hours(), &values)?.fitted
            }
        };
        ensure_finite(&detrended, "detrended series")?;

        debug!("Removed tide from {} samples at {:.4} h spacing", values.len(), dt);
        series.with_values(detrended)
    }
}

/// Detrended series of `series` using `method` with default parameters
pub fn remove(series: &TimeSeries, method: TideRemovalMethod) -> Result<TimeSeries> {
    TideRemover::new(method).remove(series)
}

/// Fitted harmonic constituents of `series`
pub fn fit_harmonics(series: &TimeSeries) -> Result<HarmonicFit> {
    validate(series)?;
    harmonic::fit(&series.elapsed_hours(), &series.values())
}

/// Record minus its astronomical tide prediction
///
/// Keeps sub-tidal level changes with their sign, which a lowpass residual
/// does not: the lowpass folds slow set-up into the detrended component.
pub fn non_tidal_level(series: &TimeSeries) -> Result<TimeSeries> {
    let fit = fit_harmonics(series)?;
    let level: Vec<f64> = series
        .values()
        .iter()
        .zip(&fit.fitted)
        .map(|(v, tide)| v - tide)
        .collect();
    series.with_values(level)
}

/// Checks a record is usable and returns its sampling interval in hours
fn validate(series: &TimeSeries) -> Result<f64> {
    let n = series.len();
    let dt = series.sampling_interval_hours();
    let required = required_samples(dt);
    let dt = match dt {
        Some(dt) if n >= MIN_SAMPLES && series.duration_hours() >= min_span_hours() => dt,
        _ => {
            return Err(Error::InsufficientData {
                expected: required,
                actual: n,
            })
        }
    };

    let values = series.values();
    ensure_finite(&values, "tide removal input")?;

    let mean = stats::mean(&values).unwrap_or(0.0);
    let std_dev = stats::population_std_dev(&values).unwrap_or(0.0);
    if std_dev <= 1e-9 * (1.0 + mean.abs()) {
        return Err(Error::DegenerateSignal(format!(
            "series has no variation (std dev {std_dev:e} around {mean})"
        )));
    }
    Ok(dt)
}
