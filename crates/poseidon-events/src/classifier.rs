//! Typing and scoring of candidate intervals
//!
//! Every interval gets a local spectrum over a window centred on it. The
//! dominant local period picks a [`FrequencyBand`]. A surge is recognised
//! in the time domain as well: a long, strong interval over which the
//! non-tidal level stays on one side of zero is a surge whatever the local
//! spectrum says, since a short pulse has no well-defined period. Confidence
//! blends how far the envelope rose above the cutoff with how concentrated
//! the local spectrum is.

use crate::envelope::{CandidateInterval, ExtremeDetection};
use poseidon_core::{
    AnalysisConfig, Confidence, DetectedEvent, Error, EventType, Result, TimeSeries,
};
use poseidon_detrend::TIDAL_REFERENCES;
use poseidon_spectral::{SpectralAnalyzer, Spectrum, MIN_SPECTRAL_SAMPLES};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Dominant periods shorter than this are basin oscillations
pub const SEICHE_MAX_PERIOD_HOURS: f64 = 2.0;
/// Relative distance from a tidal period that still counts as tidal
pub const TIDAL_BAND_TOLERANCE: f64 = 0.08;
/// Shortest interval typed as a storm surge
pub const SURGE_MIN_DURATION_HOURS: f64 = 1.0;
/// Smallest peak-to-cutoff ratio typed as a storm surge
pub const SURGE_MIN_MAGNITUDE_RATIO: f64 = 1.5;
/// Dominant periods at or above this are sub-tidal
pub const SUBTIDAL_MIN_PERIOD_HOURS: f64 = 30.0;
/// Excursion coherence at which a strong interval counts as one-signed
pub const SURGE_MIN_COHERENCE: f64 = 0.6;
/// Scores below this are [`Confidence::Low`]
pub const MEDIUM_CONFIDENCE_SCORE: f64 = 0.4;
/// Scores at or above this are [`Confidence::High`]
pub const HIGH_CONFIDENCE_SCORE: f64 = 0.7;
/// Magnitude ratio above 1 at which the magnitude term saturates
pub const RATIO_SATURATION: f64 = 1.5;
/// Weight of the magnitude term in the confidence score
pub const MAGNITUDE_WEIGHT: f64 = 0.6;
/// Weight of the spectral concentration term in the confidence score
pub const CONCENTRATION_WEIGHT: f64 = 0.4;

/// Period range searched for additional tidal references in the tide spectrum
const SPECTRAL_REFERENCE_RANGE_HOURS: (f64, f64) = (10.0, 30.0);

/// Frequency band of an interval's dominant local period
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrequencyBand {
    /// Minutes to tens of minutes
    Seiche,
    /// Close to a tidal period
    Tidal { reference_period_hours: f64 },
    /// Between the seiche band and sub-tidal periods, away from the tides
    Intermediate,
    /// Sub-tidal: [`SUBTIDAL_MIN_PERIOD_HOURS`] and longer
    Surge,
}

impl FrequencyBand {
    /// Band of `period_hours` given the tidal periods in play
    pub fn of_period(period_hours: f64, tidal_periods: &[f64]) -> Self {
        if period_hours < SEICHE_MAX_PERIOD_HOURS {
            return FrequencyBand::Seiche;
        }
        tidal_periods
            .iter()
            .copied()
            .filter(|&reference| {
                (period_hours - reference).abs() <= TIDAL_BAND_TOLERANCE * reference
            })
            .min_by(|a, b| {
                (period_hours - a)
                    .abs()
                    .total_cmp(&(period_hours - b).abs())
            })
            .map(|reference_period_hours| FrequencyBand::Tidal {
                reference_period_hours,
            })
            .unwrap_or(if period_hours >= SUBTIDAL_MIN_PERIOD_HOURS {
                FrequencyBand::Surge
            } else {
                FrequencyBand::Intermediate
            })
    }
}

/// Event type in rule order
///
/// 1. seiche band: [`EventType::Seiche`]
/// 2. at least [`SURGE_MIN_DURATION_HOURS`] long, at least
///    [`SURGE_MIN_MAGNITUDE_RATIO`] above the cutoff, and either sub-tidal or
///    one-signed (coherence at least [`SURGE_MIN_COHERENCE`]):
///    [`EventType::StormSurge`]
/// 3. tidal band: [`EventType::TidalPhase`]
/// 4. otherwise [`EventType::AnomalousWave`]
pub fn event_type_for(
    band: FrequencyBand,
    duration_hours: f64,
    magnitude_ratio: f64,
    coherence: f64,
) -> EventType {
    let strong =
        duration_hours >= SURGE_MIN_DURATION_HOURS && magnitude_ratio >= SURGE_MIN_MAGNITUDE_RATIO;
    let surge_like = band == FrequencyBand::Surge || coherence >= SURGE_MIN_COHERENCE;
    match band {
        FrequencyBand::Seiche => EventType::Seiche,
        _ if strong && surge_like => EventType::StormSurge,
        FrequencyBand::Tidal { .. } => EventType::TidalPhase,
        FrequencyBand::Intermediate | FrequencyBand::Surge => EventType::AnomalousWave,
    }
}

/// `|Σ x| / Σ |x|`: 1 for a one-signed excursion, near 0 for an oscillation
pub fn excursion_coherence(values: &[f64]) -> f64 {
    let total: f64 = values.iter().map(|v| v.abs()).sum();
    if total > 0.0 {
        values.iter().sum::<f64>().abs() / total
    } else {
        0.0
    }
}

/// Composite score in `[0, 1]`
pub fn confidence_score(magnitude_ratio: f64, concentration: f64) -> f64 {
    let magnitude = ((magnitude_ratio - 1.0) / RATIO_SATURATION).clamp(0.0, 1.0);
    MAGNITUDE_WEIGHT * magnitude + CONCENTRATION_WEIGHT * concentration.clamp(0.0, 1.0)
}

pub fn confidence_from_score(score: f64) -> Confidence {
    if score < MEDIUM_CONFIDENCE_SCORE {
        Confidence::Low
    } else if score < HIGH_CONFIDENCE_SCORE {
        Confidence::Medium
    } else {
        Confidence::High
    }
}

/// Tuning for the local spectral window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierParameters {
    /// Shortest local window, in hours
    pub min_window_hours: f64,
    /// Local window length as a multiple of the interval duration
    pub window_duration_factor: f64,
    /// Fewest samples in a local window
    pub min_window_samples: usize,
    /// How many tide-spectrum peaks join the fixed tidal references
    pub spectral_references: usize,
}

impl Default for ClassifierParameters {
    fn default() -> Self {
        Self {
            min_window_hours: 24.0,
            window_duration_factor: 2.0,
            min_window_samples: 16,
            spectral_references: 3,
        }
    }
}

/// Features measured on one candidate interval
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalFeatures {
    pub duration_hours: f64,
    pub envelope_peak: f64,
    pub magnitude_ratio: f64,
    pub dominant_period_hours: f64,
    pub spectral_concentration: f64,
    pub residual_extreme: f64,
    /// [`excursion_coherence`] of the non-tidal level over the interval
    pub excursion_coherence: f64,
}

impl IntervalFeatures {
    pub fn dominant_frequency_cph(&self) -> f64 {
        1.0 / self.dominant_period_hours
    }
}

/// Turns candidate intervals into typed, scored events
#[derive(Debug, Clone, Copy, Default)]
pub struct EventClassifier {
    params: ClassifierParameters,
    analyzer: SpectralAnalyzer,
}

impl EventClassifier {
    pub fn new(params: ClassifierParameters) -> Self {
        Self {
            params,
            analyzer: SpectralAnalyzer::default(),
        }
    }

    pub fn parameters(&self) -> &ClassifierParameters {
        &self.params
    }

    /// Tidal periods an interval's dominant period is compared against
    ///
    /// The major astronomical constituents plus the strongest peaks of the
    /// tide spectrum within the diurnal and semidiurnal range.
    pub fn tidal_periods(&self, tidal_spectrum: &Spectrum) -> Vec<f64> {
        let (lo, hi) = SPECTRAL_REFERENCE_RANGE_HOURS;
        let mut periods: Vec<f64> = TIDAL_REFERENCES.iter().map(|c| c.period_hours).collect();
        periods.extend(
            tidal_spectrum
                .dominant_frequencies(tidal_spectrum.len())
                .into_iter()
                .map(|bin| bin.period_hours())
                .filter(|p| (lo..=hi).contains(p))
                .take(self.params.spectral_references),
        );
        periods
    }

    /// Features of `interval`
    ///
    /// The local spectrum is taken on `residual`, the excursion coherence on
    /// `non_tidal`, which must be aligned with it.
    pub fn features(
        &self,
        interval: &CandidateInterval,
        residual: &TimeSeries,
        non_tidal: &TimeSeries,
        cutoff: f64,
    ) -> Result<IntervalFeatures> {
        let n = residual.len();
        let dt = residual.sampling_interval_hours().ok_or(Error::InsufficientData {
            expected: MIN_SPECTRAL_SAMPLES,
            actual: n,
        })?;
        if interval.end_index >= n || interval.start_index > interval.end_index {
            return Err(Error::MalformedSeries(format!(
                "interval {}..={} outside series of {} samples",
                interval.start_index, interval.end_index, n
            )));
        }
        if non_tidal.len() != n {
            return Err(Error::size_mismatch(n, non_tidal.len(), "non-tidal level"));
        }

        let duration_hours = interval.duration_hours();
        let window_hours = (self.params.window_duration_factor * duration_hours)
            .max(self.params.min_window_hours);
        let window = ((window_hours / dt).ceil() as usize)
            .max(self.params.min_window_samples)
            .min(n);
        let centre = (interval.start_index + interval.end_index) / 2;
        let lo = centre.saturating_sub(window / 2).min(n - window);

        let values = residual.values();
        let local = self.analyzer.analyze_values(&values[lo..lo + window], dt)?;
        let (peak_index, peak_bin) = local.peak().ok_or(Error::InsufficientData {
            expected: MIN_SPECTRAL_SAMPLES,
            actual: window,
        })?;

        let magnitude_ratio = if cutoff > 0.0 {
            interval.peak_magnitude / cutoff
        } else {
            1.0
        };

        Ok(IntervalFeatures {
            duration_hours,
            envelope_peak: interval.peak_magnitude,
            magnitude_ratio,
            dominant_period_hours: peak_bin.period_hours(),
            spectral_concentration: local.concentration(peak_index, 1),
            residual_extreme: interval.residual_extreme,
            excursion_coherence: excursion_coherence(
                &non_tidal.values()[interval.start_index..=interval.end_index],
            ),
        })
    }

    /// [`EventClassifier::features`] of every interval, in interval order
    pub fn measure_intervals(
        &self,
        detection: &ExtremeDetection,
        residual: &TimeSeries,
        non_tidal: &TimeSeries,
    ) -> Vec<Result<IntervalFeatures>> {
        let measure = |interval: &CandidateInterval| {
            self.features(interval, residual, non_tidal, detection.cutoff)
        };

        #[cfg(feature = "parallel")]
        let measured = detection.intervals.par_iter().map(measure).collect();
        #[cfg(not(feature = "parallel"))]
        let measured = detection.intervals.iter().map(measure).collect();

        measured
    }

    /// Typed events at or above the configured confidence, in time order
    ///
    /// The residual doubles as the non-tidal level, which holds when it came
    /// from the harmonic model.
    pub fn classify(
        &self,
        detection: &ExtremeDetection,
        residual: &TimeSeries,
        tidal_spectrum: &Spectrum,
        config: &AnalysisConfig,
    ) -> Result<Vec<DetectedEvent>> {
        self.classify_with_level(detection, residual, residual, tidal_spectrum, config)
    }

    /// Like [`EventClassifier::classify`] with an explicit non-tidal level
    #[instrument(skip_all, fields(candidates = detection.intervals.len()))]
    pub fn classify_with_level(
        &self,
        detection: &ExtremeDetection,
        residual: &TimeSeries,
        non_tidal: &TimeSeries,
        tidal_spectrum: &Spectrum,
        config: &AnalysisConfig,
    ) -> Result<Vec<DetectedEvent>> {
        let tidal_periods = self.tidal_periods(tidal_spectrum);
        let measured = self.measure_intervals(detection, residual, non_tidal);

        let mut events = Vec::with_capacity(measured.len());
        for (interval, features) in detection.intervals.iter().zip(measured) {
            let event = build_event(interval, &features?, &tidal_periods);
            if event.confidence >= config.confidence_threshold {
                events.push(event);
            } else {
                debug!(
                    "Dropping {} at {} with {} confidence",
                    event.event_type, event.start_time, event.confidence
                );
            }
        }

        debug!(
            "Kept {} of {} candidates at {} confidence",
            events.len(),
            detection.intervals.len(),
            config.confidence_threshold
        );
        Ok(events)
    }
}

/// Typed events with default classifier parameters
pub fn classify(
    detection: &ExtremeDetection,
    residual: &TimeSeries,
    tidal_spectrum: &Spectrum,
    config: &AnalysisConfig,
) -> Result<Vec<DetectedEvent>> {
    EventClassifier::default().classify(detection, residual, tidal_spectrum, config)
}

fn build_event(
    interval: &CandidateInterval,
    features: &IntervalFeatures,
    tidal_periods: &[f64],
) -> DetectedEvent {
    let band = FrequencyBand::of_period(features.dominant_period_hours, tidal_periods);
    let event_type = event_type_for(
        band,
        features.duration_hours,
        features.magnitude_ratio,
        features.excursion_coherence,
    );
    let score = confidence_score(features.magnitude_ratio, features.spectral_concentration);

    let mut supporting = BTreeMap::new();
    supporting.insert("duration_hours".to_string(), features.duration_hours);
    supporting.insert("envelope_peak".to_string(), features.envelope_peak);
    supporting.insert("magnitude_ratio".to_string(), features.magnitude_ratio);
    supporting.insert("dominant_period_hours".to_string(), features.dominant_period_hours);
    supporting.insert("dominant_frequency_cph".to_string(), features.dominant_frequency_cph());
    supporting.insert("spectral_concentration".to_string(), features.spectral_concentration);
    supporting.insert("confidence_score".to_string(), score);
    supporting.insert("residual_extreme".to_string(), features.residual_extreme);
    supporting.insert("excursion_coherence".to_string(), features.excursion_coherence);
    if let FrequencyBand::Tidal {
        reference_period_hours,
    } = band
    {
        supporting.insert("tidal_reference_period_hours".to_string(), reference_period_hours);
    }

    DetectedEvent {
        event_type,
        start_time: interval.start_time,
        end_time: interval.end_time,
        peak_magnitude: interval.peak_magnitude,
        confidence: confidence_from_score(score),
        supporting_features: supporting,
    }
}
