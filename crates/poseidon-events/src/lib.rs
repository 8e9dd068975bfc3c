//! Oceanographic event detection on tide-free residuals
//!
//! Detection runs in two steps:
//!
//! 1. [`EnvelopeDetector`] turns the residual into a smooth amplitude envelope
//!    and flags the intervals where it reaches a threshold-derived cutoff.
//! 2. [`EventClassifier`] measures each interval (duration, magnitude, local
//!    dominant period, spectral concentration, and how one-signed the
//!    non-tidal level stays), assigns an
//!    [`EventType`](poseidon_core::EventType) and a confidence, and drops
//!    events below the configured confidence.
//!
//! With the `parallel` feature the per-interval measurements run on rayon's
//! pool; results are identical either way.

pub mod classifier;
pub mod envelope;

pub use classifier::{
    classify, confidence_from_score, confidence_score, event_type_for, excursion_coherence,
    ClassifierParameters, EventClassifier, FrequencyBand, IntervalFeatures,
    HIGH_CONFIDENCE_SCORE, MEDIUM_CONFIDENCE_SCORE, SEICHE_MAX_PERIOD_HOURS,
    SUBTIDAL_MIN_PERIOD_HOURS, SURGE_MIN_COHERENCE, SURGE_MIN_DURATION_HOURS,
    SURGE_MIN_MAGNITUDE_RATIO, TIDAL_BAND_TOLERANCE,
};
pub use envelope::{
    crossing_runs, cutoff_for, detect, CandidateInterval, DetectorParameters, EnvelopeDetector,
    ExtremeDetection,
};
