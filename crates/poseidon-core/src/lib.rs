//! Core types for sea-level analysis
//!
//! This crate holds the pieces every analysis stage shares:
//!
//! - [`TimeSeries`] / [`Sample`]: the immutable, time-ordered input
//! - [`ProcessedData`]: original, detrended and residual series, aligned
//! - [`AnalysisConfig`]: the caller's options, threaded through every stage
//! - [`DetectedEvent`]: typed events with confidence and supporting features
//! - [`Error`]: the unified error type
//!
//! # Example
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use poseidon_core::{ProcessedData, TimeSeries};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let raw = TimeSeries::from_values(start, Duration::minutes(10), &[1.0, 1.2, 0.9]).unwrap();
//! let smooth = raw.with_values(vec![1.0, 1.0, 1.0]).unwrap();
//!
//! let data = ProcessedData::new(raw, smooth).unwrap();
//! assert!((data.residual().samples()[1].value - 0.2).abs() < 1e-12);
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod processed;
pub mod series;
pub mod stats;

pub use config::{validate_extreme_threshold, AnalysisConfig, TideRemovalMethod};
pub use error::{ensure_finite, Error, ErrorKind, Result};
pub use events::{Confidence, DetectedEvent, EventType};
pub use processed::ProcessedData;
pub use series::{hours_between, Sample, TimeSeries};
