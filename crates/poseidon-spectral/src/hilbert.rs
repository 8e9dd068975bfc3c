//! FFT-based analytic signal and amplitude envelope
//!
//! The analytic signal z(t) = x(t) + j·H[x](t) keeps only the positive
//! frequencies of x. Its magnitude |z(t)| is the instantaneous amplitude:
//! a smooth, non-negative curve that follows the local size of an
//! oscillation regardless of its phase.
//!
//! In the frequency domain the analytic signal is obtained by
//! - keeping the DC bin,
//! - doubling bins 1..N/2,
//! - keeping the Nyquist bin (even N),
//! - zeroing the negative-frequency bins.

use num_complex::Complex;
use poseidon_core::{ensure_finite, Error, Result};
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Analytic-signal processor for signals of one fixed length
///
/// Forward and inverse plans are built once so the processor can be reused
/// across many signals of the same length.
pub struct HilbertTransform {
    length: usize,
    /// Per-bin factor turning a spectrum into an analytic spectrum
    analytic_multiplier: Vec<f64>,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl HilbertTransform {
    pub fn new(length: usize) -> Self {
        let analytic_multiplier = (0..length)
            .map(|k| {
                if k == 0 {
                    1.0
                } else if k < length / 2 || (k == length / 2 && length % 2 == 1) {
                    // Odd N has no Nyquist bin; k == N/2 is still positive
                    2.0
                } else if k == length / 2 {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();

        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(length);
        let inverse = planner.plan_fft_inverse(length);

        Self {
            length,
            analytic_multiplier,
            forward,
            inverse,
        }
    }

    /// Length of signals this transformer handles
    pub fn length(&self) -> usize {
        self.length
    }

    /// Complex analytic signal; the real part reproduces `signal`
    pub fn analytic_signal(&self, signal: &[f64]) -> Result<Vec<Complex<f64>>> {
        if signal.len() != self.length {
            return Err(Error::size_mismatch(
                self.length,
                signal.len(),
                "analytic signal input",
            ));
        }
        if self.length < 2 {
            return Err(Error::InsufficientData {
                expected: 2,
                actual: self.length,
            });
        }
        ensure_finite(signal, "analytic signal input")?;

        let mut buffer: Vec<Complex<f64>> =
            signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
        self.forward.process(&mut buffer);

        for (bin, &factor) in buffer.iter_mut().zip(&self.analytic_multiplier) {
            *bin *= factor;
        }

        self.inverse.process(&mut buffer);

        // RustFFT leaves the inverse unnormalised
        let norm = 1.0 / self.length as f64;
        Ok(buffer.into_iter().map(|c| c * norm).collect())
    }

    /// Instantaneous amplitude |z(t)|
    pub fn envelope(&self, signal: &[f64]) -> Result<Vec<f64>> {
        let analytic = self.analytic_signal(signal)?;
        Ok(analytic.iter().map(|c| c.norm()).collect())
    }
}

/// One-off envelope extraction
pub fn envelope(signal: &[f64]) -> Result<Vec<f64>> {
    HilbertTransform::new(signal.len()).envelope(signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_real_part_reproduces_signal() {
        let signal: Vec<f64> = (0..64).map(|i| (i as f64 * 0.3).sin() + 0.1 * i as f64).collect();
        let transformer = HilbertTransform::new(signal.len());
        let analytic = transformer.analytic_signal(&signal).unwrap();
        for (z, &x) in analytic.iter().zip(&signal) {
            assert_abs_diff_eq!(z.re, x, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_envelope_of_periodic_cosine_is_flat() {
        let n = 256;
        let amplitude = 1.7;
        let signal: Vec<f64> = (0..n)
            .map(|i| amplitude * (2.0 * PI * 8.0 * i as f64 / n as f64).cos())
            .collect();
        let env = envelope(&signal).unwrap();
        for value in env {
            assert_abs_diff_eq!(value, amplitude, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_envelope_tracks_modulation() {
        let n = 512;
        let signal: Vec<f64> = (0..n)
            .map(|i| {
                let t = i as f64 / n as f64;
                let modulation = 1.0 + 0.5 * (2.0 * PI * 2.0 * t).cos();
                modulation * (2.0 * PI * 64.0 * t).cos()
            })
            .collect();
        let env = envelope(&signal).unwrap();
        for (i, value) in env.iter().enumerate() {
            let t = i as f64 / n as f64;
            let expected = 1.0 + 0.5 * (2.0 * PI * 2.0 * t).cos();
            assert_abs_diff_eq!(*value, expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_odd_length_cosine() {
        let n = 255;
        let signal: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * 5.0 * i as f64 / n as f64).cos())
            .collect();
        let env = envelope(&signal).unwrap();
        for value in env {
            assert_abs_diff_eq!(value, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_length_mismatch_and_non_finite() {
        let transformer = HilbertTransform::new(8);
        assert!(transformer.envelope(&[0.0; 7]).is_err());

        let mut signal = vec![0.0; 8];
        signal[3] = f64::NAN;
        assert!(matches!(
            transformer.envelope(&signal),
            Err(Error::NumericalFailure(_))
        ));
    }
}
