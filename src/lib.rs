//! Sea-level analysis engine
//!
//! Splits a univariate sea-level record into its tidal/trend component and a
//! residual, then finds and types oceanographic events in the residual:
//! storm surges, seiches, tidal-phase anomalies and anomalous waves.
//!
//! This crate re-exports the workspace crates:
//!
//! - [`model`]: series model, configuration, events, errors
//! - [`spectral`]: periodogram and Hilbert envelope
//! - [`detrend`]: lowpass and harmonic tide removal
//! - [`events`]: envelope extreme detection and event classification
//! - [`engine`]: staged, cancellable orchestration
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use poseidon::{run_full_analysis, AnalysisConfig, TimeSeries};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let values: Vec<f64> = (0..433)
//!     .map(|i| (2.0 * std::f64::consts::PI * (i as f64 / 6.0) / 12.42).cos())
//!     .collect();
//! let series = TimeSeries::from_values(start, Duration::minutes(10), &values).unwrap();
//!
//! let output = run_full_analysis(&series, &AnalysisConfig::default()).unwrap();
//! assert_eq!(output.processed_data.len(), series.len());
//! ```

pub use poseidon_core as model;
pub use poseidon_detrend as detrend;
pub use poseidon_engine as engine;
pub use poseidon_events as events;
pub use poseidon_spectral as spectral;

pub use poseidon_core::{
    AnalysisConfig, Confidence, DetectedEvent, Error, ErrorKind, EventType, ProcessedData,
    Result, Sample, TideRemovalMethod, TimeSeries,
};
pub use poseidon_engine::{
    run_full_analysis, spawn_analysis, AnalysisDiagnostics, AnalysisError, AnalysisHandle,
    AnalysisObserver, AnalysisOutput, AnalysisRunner, CancellationToken, NullAnalysisObserver,
    Stage,
};
