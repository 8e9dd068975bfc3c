//! Windowed periodogram of a uniformly sampled series
//!
//! Frequencies are in cycles per hour (cph), the usual unit for tidal work.
//! The power of bin k is scaled so that a sinusoid of amplitude A centred on
//! that bin contributes A²/2, i.e. its variance, whatever window is used.

use crate::window::WindowFunction;
use num_complex::Complex;
use ordered_float::OrderedFloat;
use poseidon_core::{ensure_finite, Error, Result, TimeSeries};
use rustfft::FftPlanner;
use tracing::{debug, instrument};

/// Fewest samples a spectrum is computed from
pub const MIN_SPECTRAL_SAMPLES: usize = 8;

/// One frequency bin of a spectrum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralBin {
    /// Cycles per hour
    pub frequency: f64,
    /// Variance contribution at this frequency
    pub power: f64,
}

impl SpectralBin {
    pub fn period_hours(&self) -> f64 {
        1.0 / self.frequency
    }
}

/// One-sided spectrum from the lowest resolvable frequency up to Nyquist
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    bins: Vec<SpectralBin>,
    sampling_interval_hours: f64,
    resolution: f64,
}

impl Spectrum {
    /// Bins in ascending frequency; bin `i` sits at `(i + 1) * resolution`
    pub fn bins(&self) -> &[SpectralBin] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Frequency spacing between bins (cph)
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn sampling_interval_hours(&self) -> f64 {
        self.sampling_interval_hours
    }

    /// Highest representable frequency (cph)
    pub fn nyquist(&self) -> f64 {
        0.5 / self.sampling_interval_hours
    }

    pub fn total_power(&self) -> f64 {
        self.bins.iter().map(|b| b.power).sum()
    }

    /// Index and bin of the single most powerful frequency
    pub fn peak(&self) -> Option<(usize, SpectralBin)> {
        self.bins
            .iter()
            .copied()
            .enumerate()
            .max_by_key(|(i, b)| (OrderedFloat(b.power), std::cmp::Reverse(*i)))
    }

    /// Summed power of bins with `low <= frequency <= high`
    pub fn band_power(&self, low: f64, high: f64) -> f64 {
        self.bins
            .iter()
            .filter(|b| b.frequency >= low && b.frequency <= high)
            .map(|b| b.power)
            .sum()
    }

    /// Share of total power held by bins within `half_width` of `index`
    pub fn concentration(&self, index: usize, half_width: usize) -> f64 {
        let total = self.total_power();
        if total <= 0.0 || index >= self.bins.len() {
            return 0.0;
        }
        let lo = index.saturating_sub(half_width);
        let hi = (index + half_width).min(self.bins.len() - 1);
        let local: f64 = self.bins[lo..=hi].iter().map(|b| b.power).sum();
        (local / total).clamp(0.0, 1.0)
    }

    /// The `k` most powerful frequencies, strongest first
    ///
    /// Local maxima are ranked so that one leaked peak does not occupy
    /// several slots. Ties go to the lower frequency. When the spectrum has
    /// fewer local maxima than `k` the remaining slots are left empty; a
    /// spectrum without any interior maximum falls back to its raw bins.
    pub fn dominant_frequencies(&self, k: usize) -> Vec<SpectralBin> {
        let n = self.bins.len();
        let mut candidates: Vec<(usize, SpectralBin)> = self
            .bins
            .iter()
            .copied()
            .enumerate()
            .filter(|(i, b)| {
                let left = if *i == 0 { f64::NEG_INFINITY } else { self.bins[i - 1].power };
                let right = if i + 1 == n { f64::NEG_INFINITY } else { self.bins[i + 1].power };
                b.power > 0.0 && b.power >= left && b.power > right
            })
            .collect();

        if candidates.is_empty() {
            candidates = self.bins.iter().copied().enumerate().collect();
        }

        candidates.sort_by_key(|(i, b)| (std::cmp::Reverse(OrderedFloat(b.power)), *i));
        candidates.into_iter().take(k).map(|(_, b)| b).collect()
    }
}

/// The `k` frequencies with the highest power
pub fn dominant_frequencies(spectrum: &Spectrum, k: usize) -> Vec<SpectralBin> {
    spectrum.dominant_frequencies(k)
}

/// Computes windowed power spectra
#[derive(Debug, Clone, Copy, Default)]
pub struct SpectralAnalyzer {
    window: WindowFunction,
}

impl SpectralAnalyzer {
    pub fn new(window: WindowFunction) -> Self {
        Self { window }
    }

    pub fn window(&self) -> WindowFunction {
        self.window
    }

    /// Spectrum of a series, assuming its dominant sampling interval
    #[instrument(skip_all, fields(samples = series.len()))]
    pub fn analyze(&self, series: &TimeSeries) -> Result<Spectrum> {
        let dt = series
            .sampling_interval_hours()
            .ok_or(Error::InsufficientData {
                expected: MIN_SPECTRAL_SAMPLES,
                actual: series.len(),
            })?;
        self.analyze_values(&series.values(), dt)
    }

    /// Spectrum of uniformly spaced values `dt_hours` apart
    pub fn analyze_values(&self, values: &[f64], dt_hours: f64) -> Result<Spectrum> {
        let n = values.len();
        if n < MIN_SPECTRAL_SAMPLES {
            return Err(Error::InsufficientData {
                expected: MIN_SPECTRAL_SAMPLES,
                actual: n,
            });
        }
        ensure_finite(values, "spectral input")?;
        if !(dt_hours.is_finite() && dt_hours > 0.0) {
            return Err(Error::MalformedSeries(format!(
                "sampling interval must be positive, got {dt_hours} h"
            )));
        }

        let mean = values.iter().sum::<f64>() / n as f64;
        let weights = self.window.coefficients(n);
        let weight_sum: f64 = weights.iter().sum();

        let mut buffer: Vec<Complex<f64>> = values
            .iter()
            .zip(&weights)
            .map(|(&x, &w)| Complex::new((x - mean) * w, 0.0))
            .collect();

        let mut planner = FftPlanner::<f64>::new();
        planner.plan_fft_forward(n).process(&mut buffer);

        let resolution = 1.0 / (n as f64 * dt_hours);
        let scale = 1.0 / (weight_sum * weight_sum);
        let half = n / 2;
        let bins: Vec<SpectralBin> = (1..=half)
            .map(|k| {
                let magnitude_sq = buffer[k].norm_sqr();
                // The Nyquist bin of an even-length transform has no mirror
                let one_sided = if n % 2 == 0 && k == half { 1.0 } else { 2.0 };
                SpectralBin {
                    frequency: k as f64 * resolution,
                    power: one_sided * magnitude_sq * scale,
                }
            })
            .collect();

        let spectrum = Spectrum {
            bins,
            sampling_interval_hours: dt_hours,
            resolution,
        };
        ensure_finite(
            &spectrum.bins.iter().map(|b| b.power).collect::<Vec<_>>(),
            "spectral power",
        )?;

        debug!(
            bins = spectrum.len(),
            resolution,
            window = self.window.name(),
            "computed periodogram"
        );
        Ok(spectrum)
    }
}

/// Hann-windowed spectrum of a series
pub fn analyze(series: &TimeSeries) -> Result<Spectrum> {
    SpectralAnalyzer::default().analyze(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};
    use std::f64::consts::PI;

    fn sinusoid(n: usize, dt_hours: f64, period_hours: f64, amplitude: f64) -> Vec<f64> {
        (0..n)
            .map(|i| amplitude * (2.0 * PI * i as f64 * dt_hours / period_hours).sin())
            .collect()
    }

    #[test]
    fn test_bin_layout() {
        let analyzer = SpectralAnalyzer::default();
        let spectrum = analyzer.analyze_values(&sinusoid(64, 0.5, 4.0, 1.0), 0.5).unwrap();
        assert_eq!(spectrum.len(), 32);
        assert_relative_eq!(spectrum.resolution(), 1.0 / 32.0);
        assert_relative_eq!(spectrum.bins()[0].frequency, 1.0 / 32.0);
        assert_relative_eq!(spectrum.bins().last().unwrap().frequency, spectrum.nyquist());
    }

    #[test]
    fn test_on_bin_sinusoid_power() {
        // 8 full cycles in 128 samples: frequency sits exactly on bin 8
        let amplitude = 2.0;
        let values = sinusoid(128, 1.0, 16.0, amplitude);
        let spectrum = SpectralAnalyzer::new(WindowFunction::Rectangular)
            .analyze_values(&values, 1.0)
            .unwrap();
        let (index, bin) = spectrum.peak().unwrap();
        assert_eq!(index, 7);
        assert_relative_eq!(bin.period_hours(), 16.0, epsilon = 1e-9);
        assert_relative_eq!(bin.power, amplitude * amplitude / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_hann_preserves_peak_location() {
        let values = sinusoid(256, 10.0 / 60.0, 12.42, 1.0);
        let spectrum = SpectralAnalyzer::default()
            .analyze_values(&values, 10.0 / 60.0)
            .unwrap();
        let dominant = spectrum.dominant_frequencies(1);
        assert_eq!(dominant.len(), 1);
        // Resolution is 1 / 42.67 h; the peak must land on the nearest bin
        let expected = 1.0 / 12.42;
        assert!((dominant[0].frequency - expected).abs() <= spectrum.resolution());
    }

    #[test]
    fn test_dominant_frequencies_are_distinct_peaks() {
        let dt = 0.25;
        let n = 512;
        let values: Vec<f64> = sinusoid(n, dt, 12.8, 1.0)
            .iter()
            .zip(sinusoid(n, dt, 3.2, 0.4))
            .map(|(a, b)| a + b)
            .collect();
        let spectrum = SpectralAnalyzer::default().analyze_values(&values, dt).unwrap();
        let dominant = dominant_frequencies(&spectrum, 2);
        assert_eq!(dominant.len(), 2);
        assert_relative_eq!(dominant[0].period_hours(), 12.8, epsilon = 1e-9);
        assert_relative_eq!(dominant[1].period_hours(), 3.2, epsilon = 1e-9);
        assert!(dominant[0].power > dominant[1].power);
    }

    #[test]
    fn test_concentration_of_pure_tone() {
        let values = sinusoid(128, 1.0, 16.0, 1.0);
        let spectrum = SpectralAnalyzer::default().analyze_values(&values, 1.0).unwrap();
        let (index, _) = spectrum.peak().unwrap();
        assert!(spectrum.concentration(index, 1) > 0.95);
        assert_relative_eq!(spectrum.concentration(index, spectrum.len()), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_deterministic() {
        let values = sinusoid(300, 0.1, 2.7, 0.8);
        let analyzer = SpectralAnalyzer::default();
        assert_eq!(
            analyzer.analyze_values(&values, 0.1).unwrap(),
            analyzer.analyze_values(&values, 0.1).unwrap()
        );
    }

    #[test]
    fn test_too_short_and_non_finite() {
        let analyzer = SpectralAnalyzer::default();
        assert!(matches!(
            analyzer.analyze_values(&[1.0, 2.0, 3.0], 1.0),
            Err(Error::InsufficientData { expected: 8, actual: 3 })
        ));
        let mut values = vec![0.0; 16];
        values[5] = f64::INFINITY;
        assert!(matches!(
            analyzer.analyze_values(&values, 1.0),
            Err(Error::NumericalFailure(_))
        ));
    }

    #[test]
    fn test_analyze_series_uses_sampling_interval() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let values = sinusoid(96, 0.5, 6.0, 1.0);
        let series = TimeSeries::from_values(start, Duration::minutes(30), &values).unwrap();
        let spectrum = analyze(&series).unwrap();
        assert_relative_eq!(spectrum.sampling_interval_hours(), 0.5);
        let (_, bin) = spectrum.peak().unwrap();
        assert_relative_eq!(bin.period_hours(), 6.0, epsilon = 1e-9);
    }
}
