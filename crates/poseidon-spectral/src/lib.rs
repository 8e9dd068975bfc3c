//! Frequency-domain tools for sea-level series
//!
//! - [`SpectralAnalyzer`]: windowed periodogram in cycles per hour, with
//!   [`Spectrum::dominant_frequencies`] for picking the strongest periodicities
//! - [`HilbertTransform`]: analytic signal and amplitude envelope
//!
//! # Example
//!
//! ```rust
//! use poseidon_spectral::{SpectralAnalyzer, WindowFunction};
//!
//! // 12 h oscillation sampled hourly for 4 days
//! let values: Vec<f64> = (0..96)
//!     .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 12.0).cos())
//!     .collect();
//!
//! let spectrum = SpectralAnalyzer::new(WindowFunction::Hann)
//!     .analyze_values(&values, 1.0)
//!     .unwrap();
//! let strongest = spectrum.dominant_frequencies(1);
//! assert!((strongest[0].period_hours() - 12.0).abs() < 1e-9);
//! ```

pub mod hilbert;
pub mod periodogram;
pub mod window;

pub use hilbert::{envelope, HilbertTransform};
pub use periodogram::{
    analyze, dominant_frequencies, SpectralAnalyzer, SpectralBin, Spectrum, MIN_SPECTRAL_SAMPLES,
};
pub use window::WindowFunction;
