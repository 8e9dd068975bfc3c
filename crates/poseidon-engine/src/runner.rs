//! Full analysis run

use crate::cancel::CancellationToken;
use crate::error::AnalysisError;
use crate::observer::{AnalysisObserver, NullAnalysisObserver};
use crate::stage::Stage;
use poseidon_core::{
    stats, AnalysisConfig, DetectedEvent, ProcessedData, Result, TideRemovalMethod, TimeSeries,
};
use poseidon_detrend::{non_tidal_level, LowpassParameters, TideRemover};
use poseidon_events::{ClassifierParameters, DetectorParameters, EnvelopeDetector, EventClassifier};
use poseidon_spectral::SpectralAnalyzer;
use serde::{Deserialize, Serialize};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Envelope noise floor as a fraction of the raw series' standard deviation
pub const NOISE_FLOOR_FRACTION: f64 = 0.1;

/// Quantities measured along the way, for display next to the results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDiagnostics {
    pub tide_removal_method: TideRemovalMethod,
    pub sampling_interval_hours: f64,
    /// Period of the strongest oscillation in the tidal component
    pub dominant_tidal_period_hours: Option<f64>,
    pub noise_floor: f64,
    pub envelope_cutoff: f64,
    pub candidate_count: usize,
    pub residual_rms: f64,
}

/// Everything a successful run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutput {
    pub processed_data: ProcessedData,
    /// In time order
    pub events: Vec<DetectedEvent>,
    pub diagnostics: AnalysisDiagnostics,
}

/// Runs the pipeline stage by stage
///
/// Holds no per-run state: one runner can serve any number of runs, from
/// any number of threads.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRunner<O: AnalysisObserver = NullAnalysisObserver> {
    observer: O,
    token: CancellationToken,
    lowpass: LowpassParameters,
    detector: DetectorParameters,
    classifier: ClassifierParameters,
}

impl AnalysisRunner<NullAnalysisObserver> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<O: AnalysisObserver> AnalysisRunner<O> {
    pub fn with_observer<P: AnalysisObserver>(self, observer: P) -> AnalysisRunner<P> {
        AnalysisRunner {
            observer,
            token: self.token,
            lowpass: self.lowpass,
            detector: self.detector,
            classifier: self.classifier,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn with_lowpass_parameters(mut self, params: LowpassParameters) -> Self {
        self.lowpass = params;
        self
    }

    /// Detector tuning; the noise floor is always derived from the input
    pub fn with_detector_parameters(mut self, params: DetectorParameters) -> Self {
        self.detector = params;
        self
    }

    pub fn with_classifier_parameters(mut self, params: ClassifierParameters) -> Self {
        self.classifier = params;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Decompose `series` and detect events, all or nothing
    #[instrument(skip_all, fields(samples = series.len(), method = config.tide_removal_method.name()))]
    pub fn run(
        &self,
        series: &TimeSeries,
        config: &AnalysisConfig,
    ) -> std::result::Result<AnalysisOutput, AnalysisError> {
        let output = self.run_stages(series, config);
        match &output {
            Ok(out) => {
                self.observer.stage_entered(Stage::Complete);
                info!(
                    events = out.events.len(),
                    candidates = out.diagnostics.candidate_count,
                    "analysis complete"
                );
            }
            Err(err) => {
                self.observer.run_failed(err);
                warn!(stage = %err.stage(), kind = %err.kind(), "analysis failed: {}", err);
            }
        }
        output
    }

    fn run_stages(
        &self,
        series: &TimeSeries,
        config: &AnalysisConfig,
    ) -> std::result::Result<AnalysisOutput, AnalysisError> {
        self.observer.stage_entered(Stage::Idle);
        config
            .validate()
            .and_then(|_| self.detector.validate())
            .and_then(|_| self.lowpass.validate())
            .map_err(|e| AnalysisError::new(Stage::Idle, e))?;

        let (processed, non_tidal) = self.stage(Stage::Detrending, || {
            let detrended = TideRemover::new(config.tide_removal_method)
                .with_lowpass_parameters(self.lowpass)
                .remove(series)?;
            let processed = ProcessedData::new(series.clone(), detrended)?;
            // The lowpass keeps slow set-up in the detrended component, so its
            // residual cannot tell a surge from an oscillation
            let non_tidal = match config.tide_removal_method {
                TideRemovalMethod::HarmonicModel => processed.residual().clone(),
                TideRemovalMethod::Lowpass => non_tidal_level(series)?,
            };
            Ok((processed, non_tidal))
        })?;

        let tidal_spectrum = self.stage(Stage::SpectralAnalysis, || {
            let spectrum = SpectralAnalyzer::default().analyze(processed.detrended())?;
            if let Some(peak) = spectrum.dominant_frequencies(1).first() {
                debug!("Tidal component peaks at {:.2} h", peak.period_hours());
            }
            Ok(spectrum)
        })?;

        let noise_floor = NOISE_FLOOR_FRACTION
            * stats::population_std_dev(&series.values()).unwrap_or(0.0);
        let detection = self.stage(Stage::ExtremeDetection, || {
            EnvelopeDetector::new(self.detector.with_noise_floor(noise_floor))
                .detect(processed.residual(), config.extreme_threshold)
        })?;

        let events = self.stage(Stage::Classification, || {
            EventClassifier::new(self.classifier).classify_with_level(
                &detection,
                processed.residual(),
                &non_tidal,
                &tidal_spectrum,
                config,
            )
        })?;

        let diagnostics = AnalysisDiagnostics {
            tide_removal_method: config.tide_removal_method,
            sampling_interval_hours: series.sampling_interval_hours().unwrap_or(0.0),
            dominant_tidal_period_hours: tidal_spectrum
                .dominant_frequencies(1)
                .first()
                .map(|bin| bin.period_hours()),
            noise_floor,
            envelope_cutoff: detection.cutoff,
            candidate_count: detection.intervals.len(),
            residual_rms: stats::rms(&processed.residual().values()).unwrap_or(0.0),
        };

        Ok(AnalysisOutput {
            processed_data: processed,
            events,
            diagnostics,
        })
    }

    /// Run one stage unless cancelled, tagging any failure with the stage
    fn stage<T, F>(&self, stage: Stage, work: F) -> std::result::Result<T, AnalysisError>
    where
        F: FnOnce() -> Result<T>,
    {
        self.token
            .check()
            .map_err(|e| AnalysisError::new(stage, e))?;
        self.observer.stage_entered(stage);
        let started = Instant::now();
        let value = work().map_err(|e| AnalysisError::new(stage, e))?;
        let elapsed = started.elapsed();
        debug!("Stage {} finished in {:?}", stage, elapsed);
        self.observer.stage_completed(stage, elapsed);
        Ok(value)
    }
}

impl<O: AnalysisObserver + 'static> AnalysisRunner<O> {
    /// Run on a background thread
    ///
    /// The series and config are moved into the run, so the caller keeps no
    /// shared state with it besides the cancellation token.
    pub fn spawn(self, series: TimeSeries, config: AnalysisConfig) -> AnalysisHandle {
        let token = self.token.clone();
        let join = thread::spawn(move || self.run(&series, &config));
        AnalysisHandle { token, join }
    }
}

/// A run executing on a background thread
#[derive(Debug)]
pub struct AnalysisHandle {
    token: CancellationToken,
    join: JoinHandle<std::result::Result<AnalysisOutput, AnalysisError>>,
}

impl AnalysisHandle {
    /// Ask the run to stop at its next stage boundary
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the run's result
    ///
    /// A panic inside the run is resumed on the calling thread.
    pub fn join(self) -> std::result::Result<AnalysisOutput, AnalysisError> {
        match self.join.join() {
            Ok(result) => result,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
}

/// Decompose `series` and detect events with default tuning
pub fn run_full_analysis(
    series: &TimeSeries,
    config: &AnalysisConfig,
) -> std::result::Result<AnalysisOutput, AnalysisError> {
    AnalysisRunner::new().run(series, config)
}

/// [`run_full_analysis`] on a background thread
pub fn spawn_analysis(series: TimeSeries, config: AnalysisConfig) -> AnalysisHandle {
    AnalysisRunner::new().spawn(series, config)
}
