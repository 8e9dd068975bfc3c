//! Zero-phase FFT lowpass
//!
//! A finite record of a tide does not end on a whole cycle, and any FFT
//! filter rings at the record ends when the signal does not. The
//! deterministic part is therefore filtered analytically:
//!
//! 1. a harmonic model (mean, trend, resolvable constituents) is fitted and
//!    evaluated with every constituent scaled by the filter gain at its
//!    frequency;
//! 2. the remainder, which holds no periodic tide, goes through the FFT
//!    filter below;
//! 3. the two parts are added back together.
//!
//! The FFT filter makes the remainder periodic before transforming:
//!
//! 1. the straight line through the first and last samples is removed,
//!    leaving a segment that starts and ends at zero;
//! 2. the segment is extended by point reflection to length `2n - 2`,
//!    which keeps the first derivative continuous across the joins;
//! 3. the spectrum is multiplied by a real, symmetric gain, so no phase
//!    shift is introduced;
//! 4. the first `n` samples of the inverse transform get the line back.

use crate::constituents::{self, Constituent};
use crate::harmonic;
use num_complex::Complex;
use poseidon_core::{ensure_finite, Error, Result};
use rustfft::FftPlanner;
use std::f64::consts::PI;
use tracing::debug;

/// Pass and stop band edges of the lowpass, as periods in hours
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowpassParameters {
    /// Periods at or above this are kept untouched
    pub pass_period_hours: f64,
    /// Periods at or below this are removed entirely
    pub stop_period_hours: f64,
}

impl Default for LowpassParameters {
    fn default() -> Self {
        Self {
            pass_period_hours: 10.0,
            stop_period_hours: 6.0,
        }
    }
}

impl LowpassParameters {
    pub fn validate(&self) -> Result<()> {
        let ordered = self.stop_period_hours > 0.0 && self.pass_period_hours > self.stop_period_hours;
        if !(ordered && self.pass_period_hours.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "lowpass needs 0 < stop period < pass period, got stop={} h pass={} h",
                self.stop_period_hours, self.pass_period_hours
            )));
        }
        Ok(())
    }

    /// Amplitude gain at `frequency` cycles per hour
    ///
    /// Raised-cosine taper between the pass and stop frequencies.
    pub fn gain(&self, frequency: f64) -> f64 {
        let f_pass = 1.0 / self.pass_period_hours;
        let f_stop = 1.0 / self.stop_period_hours;
        let f = frequency.abs();
        if f <= f_pass {
            1.0
        } else if f >= f_stop {
            0.0
        } else {
            let x = (f - f_pass) / (f_stop - f_pass);
            0.5 * (1.0 + (PI * x).cos())
        }
    }
}

/// Zero-phase lowpass over uniformly spaced values
#[derive(Debug, Clone, Copy, Default)]
pub struct LowpassFilter {
    params: LowpassParameters,
}

impl LowpassFilter {
    pub fn new(params: LowpassParameters) -> Self {
        Self { params }
    }

    pub fn parameters(&self) -> &LowpassParameters {
        &self.params
    }

    /// Low-frequency part of `values` sampled every `dt_hours`
    pub fn filter_values(&self, values: &[f64], dt_hours: f64) -> Result<Vec<f64>> {
        self.params.validate()?;
        let n = values.len();
        if n < 3 {
            return Err(Error::InsufficientData {
                expected: 3,
                actual: n,
            });
        }
        ensure_finite(values, "lowpass input")?;

        let hours: Vec<f64> = (0..n).map(|i| i as f64 * dt_hours).collect();
        let model = harmonic::fit_with(&hours, values, &model_constituents(&hours, dt_hours))?;
        let remainder: Vec<f64> = values.iter().zip(&model.fitted).map(|(v, f)| v - f).collect();

        let smooth_model = model.evaluate(&hours, |f| self.params.gain(f));
        let smooth_remainder = self.filter_remainder(&remainder, dt_hours);

        debug!(
            "Lowpass over {} samples with {} modelled constituents, pass {} h, stop {} h",
            n,
            model.constituents.len(),
            self.params.pass_period_hours,
            self.params.stop_period_hours
        );
        Ok(smooth_model
            .iter()
            .zip(&smooth_remainder)
            .map(|(a, b)| a + b)
            .collect())
    }

    fn filter_remainder(&self, values: &[f64], dt_hours: f64) -> Vec<f64> {
        let n = values.len();
        let first = values[0];
        let slope = (values[n - 1] - first) / (n - 1) as f64;
        let line = |i: usize| first + slope * i as f64;

        let m = 2 * n - 2;
        let mut buffer: Vec<Complex<f64>> = Vec::with_capacity(m);
        buffer.extend((0..n).map(|i| Complex::new(values[i] - line(i), 0.0)));
        buffer.extend((1..n - 1).map(|j| {
            let i = n - 1 - j;
            Complex::new(-(values[i] - line(i)), 0.0)
        }));

        let mut planner = FftPlanner::<f64>::new();
        planner.plan_fft_forward(m).process(&mut buffer);

        let resolution = 1.0 / (m as f64 * dt_hours);
        for (k, bin) in buffer.iter_mut().enumerate() {
            let folded = k.min(m - k);
            *bin *= self.params.gain(folded as f64 * resolution);
        }

        planner.plan_fft_inverse(m).process(&mut buffer);

        let norm = 1.0 / m as f64;
        buffer
            .iter()
            .take(n)
            .enumerate()
            .map(|(i, c)| c.re * norm + line(i))
            .collect()
    }
}

/// Resolvable constituents below Nyquist, as many as the sample count allows
fn model_constituents(hours: &[f64], dt_hours: f64) -> Vec<Constituent> {
    let nyquist = 0.5 / dt_hours;
    let room = hours.len().saturating_sub(2) / 2;
    constituents::resolvable(harmonic::record_span(hours))
        .into_iter()
        .filter(|c| c.frequency() < nyquist)
        .take(room)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sinusoid(n: usize, dt: f64, period: f64, amplitude: f64) -> Vec<f64> {
        (0..n)
            .map(|i| amplitude * (2.0 * PI * i as f64 * dt / period).cos())
            .collect()
    }

    #[test]
    fn test_gain_bands() {
        let p = LowpassParameters::default();
        assert_eq!(p.gain(0.0), 1.0);
        assert_eq!(p.gain(1.0 / 12.42), 1.0);
        assert_eq!(p.gain(1.0 / 10.0), 1.0);
        assert_eq!(p.gain(1.0 / 6.0), 0.0);
        assert_eq!(p.gain(1.0 / 0.5), 0.0);
        let mid = 0.5 * (0.1 + 1.0 / 6.0);
        assert_relative_eq!(p.gain(mid), 0.5, epsilon = 1e-12);
        assert_eq!(p.gain(-0.05), p.gain(0.05));
    }

    #[test]
    fn test_linear_trend_passes_unchanged() {
        let values: Vec<f64> = (0..200).map(|i| 0.3 + 0.01 * i as f64).collect();
        let out = LowpassFilter::default().filter_values(&values, 0.25).unwrap();
        for (a, b) in out.iter().zip(&values) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_short_period_removed_in_interior() {
        // 4 h oscillation on top of a slow 24 h one, 10-minute sampling over 3 days
        let dt = 1.0 / 6.0;
        let slow = sinusoid(433, dt, 24.0, 1.0);
        let fast = sinusoid(433, dt, 4.0, 0.3);
        let mixed: Vec<f64> = slow.iter().zip(&fast).map(|(a, b)| a + b).collect();

        let out = LowpassFilter::default().filter_values(&mixed, dt).unwrap();
        let interior = 72..361;
        for i in interior {
            assert!(
                (out[i] - slow[i]).abs() < 0.02,
                "sample {} off by {}",
                i,
                out[i] - slow[i]
            );
        }
    }

    #[test]
    fn test_pure_tide_passes_to_the_record_ends() {
        // 12.4 h is close to M2 but not on it, and 3 days is not a whole number of cycles
        let dt = 1.0 / 6.0;
        let tide = sinusoid(433, dt, 12.4, 1.0);
        let out = LowpassFilter::default().filter_values(&tide, dt).unwrap();
        let worst = out
            .iter()
            .zip(&tide)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        assert!(worst < 0.01, "worst deviation {}", worst);
    }

    #[test]
    fn test_short_record_falls_back_to_fft_only() {
        let values = [1.0, 2.0, 4.0, 3.0];
        let out = LowpassFilter::default().filter_values(&values, 1.0).unwrap();
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|v| v.is_finite()));
        assert_relative_eq!(out[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(out[3], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_band_edges() {
        let filter = LowpassFilter::new(LowpassParameters {
            pass_period_hours: 4.0,
            stop_period_hours: 6.0,
        });
        assert!(matches!(
            filter.filter_values(&[0.0; 32], 1.0),
            Err(Error::InvalidConfig(_))
        ));
    }
}
