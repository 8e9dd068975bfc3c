//! Tide removal for sea-level records
//!
//! Two ways of extracting the tidal and trend component:
//!
//! - **Lowpass**: zero-phase FFT filter keeping periods of 10 h and longer
//! - **HarmonicModel**: least-squares fit of the astronomical constituents the
//!   record can resolve, plus a linear trend
//!
//! The residual (record minus detrended component) is what the event
//! detectors look at.
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use poseidon_core::{TideRemovalMethod, TimeSeries};
//! use poseidon_detrend::TideRemover;
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let values: Vec<f64> = (0..433)
//!     .map(|i| (2.0 * std::f64::consts::PI * (i as f64 / 6.0) / 12.4206012).cos())
//!     .collect();
//! let series = TimeSeries::from_values(start, Duration::minutes(10), &values).unwrap();
//!
//! let tide = TideRemover::new(TideRemovalMethod::HarmonicModel)
//!     .remove(&series)
//!     .unwrap();
//! assert_eq!(tide.len(), series.len());
//! ```

pub mod constituents;
pub mod harmonic;
pub mod lowpass;
pub mod remover;

pub use constituents::{Constituent, TIDAL_REFERENCES};
pub use harmonic::{ConstituentFit, HarmonicFit};
pub use lowpass::{LowpassFilter, LowpassParameters};
pub use remover::{
    fit_harmonics, non_tidal_level, remove, required_samples, TideRemover, MIN_SAMPLES,
};
