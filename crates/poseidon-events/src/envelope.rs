//! Envelope-based extreme detection
//!
//! The envelope is the magnitude of the analytic signal of the mean-removed
//! residual, lightly smoothed. A sample is extreme when its envelope reaches
//! the cutoff derived from the threshold:
//!
//! ```text
//! cutoff = max(median + (threshold / 100) * (max - median), noise_floor)
//! ```
//!
//! so `threshold = 100` only admits the envelope maximum itself. The
//! comparison is inclusive: `envelope >= cutoff` is a crossing.

use chrono::{DateTime, Utc};
use poseidon_core::{
    ensure_finite, hours_between, stats, validate_extreme_threshold, Error, Result, Sample,
    TimeSeries,
};
use poseidon_spectral::HilbertTransform;
use tracing::{debug, instrument};

/// Tuning for [`EnvelopeDetector`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorParameters {
    /// Absolute envelope level below which nothing is flagged
    pub noise_floor: f64,
    /// Runs closer than this many sampling intervals are merged
    pub merge_gap_intervals: f64,
    /// Width of the centred moving average applied to the envelope
    pub smoothing_window: usize,
}

impl Default for DetectorParameters {
    fn default() -> Self {
        Self {
            noise_floor: 0.0,
            merge_gap_intervals: 3.0,
            smoothing_window: 5,
        }
    }
}

impl DetectorParameters {
    pub fn with_noise_floor(mut self, noise_floor: f64) -> Self {
        self.noise_floor = noise_floor;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.noise_floor.is_finite() && self.noise_floor >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "noise floor must be finite and non-negative, got {}",
                self.noise_floor
            )));
        }
        if !(self.merge_gap_intervals.is_finite() && self.merge_gap_intervals >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "merge gap must be finite and non-negative, got {}",
                self.merge_gap_intervals
            )));
        }
        if self.smoothing_window == 0 {
            return Err(Error::InvalidConfig(
                "smoothing window must hold at least one sample".to_string(),
            ));
        }
        Ok(())
    }
}

/// A stretch of the residual whose envelope stays at or above the cutoff
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateInterval {
    pub start_index: usize,
    /// Inclusive
    pub end_index: usize,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub peak_time: DateTime<Utc>,
    /// Highest envelope value in the interval
    pub peak_magnitude: f64,
    /// Residual value of largest magnitude in the interval, with its sign
    pub residual_extreme: f64,
}

impl CandidateInterval {
    pub fn duration_hours(&self) -> f64 {
        hours_between(self.start_time, self.end_time)
    }

    /// Number of samples covered, never zero
    pub fn sample_count(&self) -> usize {
        self.end_index - self.start_index + 1
    }
}

/// Envelope, cutoff and the intervals that reached it
#[derive(Debug, Clone, PartialEq)]
pub struct ExtremeDetection {
    pub envelope: Vec<f64>,
    pub cutoff: f64,
    pub intervals: Vec<CandidateInterval>,
}

/// Flags intervals where the residual's amplitude envelope is extreme
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeDetector {
    params: DetectorParameters,
}

impl EnvelopeDetector {
    pub fn new(params: DetectorParameters) -> Self {
        Self { params }
    }

    pub fn parameters(&self) -> &DetectorParameters {
        &self.params
    }

    /// Smoothed amplitude envelope of `values`
    pub fn envelope(&self, values: &[f64]) -> Result<Vec<f64>> {
        self.params.validate()?;
        ensure_finite(values, "envelope input")?;
        let mean = stats::mean(values).ok_or(Error::InsufficientData {
            expected: 2,
            actual: 0,
        })?;
        let centred: Vec<f64> = values.iter().map(|v| v - mean).collect();
        let raw = HilbertTransform::new(centred.len()).envelope(&centred)?;
        Ok(moving_average(&raw, self.params.smoothing_window))
    }

    /// Candidate intervals of `residual` at `threshold` (0, 100]
    #[instrument(skip_all, fields(samples = residual.len(), threshold = threshold))]
    pub fn detect(&self, residual: &TimeSeries, threshold: f64) -> Result<ExtremeDetection> {
        validate_extreme_threshold(threshold)?;
        let envelope = self.envelope(&residual.values())?;
        let cutoff = cutoff_for(&envelope, threshold, self.params.noise_floor)?;

        let dt_hours = residual.sampling_interval_hours().ok_or(Error::InsufficientData {
            expected: 2,
            actual: residual.len(),
        })?;
        let max_gap_hours = self.params.merge_gap_intervals * dt_hours;

        let samples = residual.samples();
        let mut runs = crossing_runs(&envelope, cutoff);
        runs = merge_runs(runs, |prev_end, next_start| {
            hours_between(samples[prev_end].timestamp, samples[next_start].timestamp) < max_gap_hours
        });

        let intervals: Vec<CandidateInterval> = runs
            .into_iter()
            .map(|(start, end)| build_interval(samples, &envelope, start, end))
            .collect();

        debug!(
            "Envelope cutoff {:.4} (threshold {}), {} candidate intervals",
            cutoff,
            threshold,
            intervals.len()
        );

        Ok(ExtremeDetection {
            envelope,
            cutoff,
            intervals,
        })
    }
}

/// Candidate intervals of `residual` with default parameters
pub fn detect(residual: &TimeSeries, threshold: f64) -> Result<ExtremeDetection> {
    EnvelopeDetector::default().detect(residual, threshold)
}

/// Envelope level corresponding to `threshold`
pub fn cutoff_for(envelope: &[f64], threshold: f64, noise_floor: f64) -> Result<f64> {
    validate_extreme_threshold(threshold)?;
    let median = stats::median(envelope).ok_or(Error::InsufficientData {
        expected: 1,
        actual: 0,
    })?;
    let max = stats::max(envelope).ok_or(Error::InsufficientData {
        expected: 1,
        actual: 0,
    })?;
    let fraction = threshold / 100.0;
    let cutoff = if fraction >= 1.0 {
        max
    } else {
        median + fraction * (max - median)
    };
    Ok(cutoff.max(noise_floor))
}

/// Maximal runs of consecutive samples with `envelope >= cutoff`
///
/// An envelope without any positive value has no runs.
pub fn crossing_runs(envelope: &[f64], cutoff: f64) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    if !envelope.iter().any(|&v| v > 0.0) {
        return runs;
    }
    let mut open: Option<usize> = None;
    for (i, &value) in envelope.iter().enumerate() {
        match (value >= cutoff, open) {
            (true, None) => open = Some(i),
            (false, Some(start)) => {
                runs.push((start, i - 1));
                open = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        runs.push((start, envelope.len() - 1));
    }
    runs
}

fn merge_runs<F>(runs: Vec<(usize, usize)>, close_enough: F) -> Vec<(usize, usize)>
where
    F: Fn(usize, usize) -> bool,
{
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(runs.len());
    for (start, end) in runs {
        match merged.last_mut() {
            Some(last) if close_enough(last.1, start) => last.1 = end,
            _ => merged.push((start, end)),
        }
    }
    merged
}

fn build_interval(
    samples: &[Sample],
    envelope: &[f64],
    start: usize,
    end: usize,
) -> CandidateInterval {
    let mut peak = start;
    let mut extreme = start;
    for i in start..=end {
        if envelope[i] > envelope[peak] {
            peak = i;
        }
        if samples[i].value.abs() > samples[extreme].value.abs() {
            extreme = i;
        }
    }
    CandidateInterval {
        start_index: start,
        end_index: end,
        start_time: samples[start].timestamp,
        end_time: samples[end].timestamp,
        peak_time: samples[peak].timestamp,
        peak_magnitude: envelope[peak],
        residual_extreme: samples[extreme].value,
    }
}

/// Centred moving average, shrinking the window at the edges
fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let half = window / 2;
    let n = values.len();
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half).min(n - 1);
            let slice = &values[lo..=hi];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}
