//! Analysis configuration
//!
//! The configuration is an immutable value handed to every stage by
//! reference; nothing in the engine keeps configuration state of its own.

use crate::error::{Error, Result};
use crate::events::Confidence;
use serde::{Deserialize, Serialize};

/// Tide and trend removal methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TideRemovalMethod {
    /// Zero-phase FFT low-pass filter
    #[default]
    #[serde(rename = "lowpass")]
    Lowpass,

    /// Least-squares fit of tidal constituents
    #[serde(rename = "harmonic", alias = "harmonicModel")]
    HarmonicModel,
}

impl TideRemovalMethod {
    /// Get the name of this method
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lowpass => "lowpass",
            Self::HarmonicModel => "harmonic",
        }
    }
}

/// Options selected by the caller for one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// Detrending algorithm
    pub tide_removal_method: TideRemovalMethod,

    /// Envelope cutoff in `(0, 100]`: the percentage of the distance from the
    /// envelope median to the envelope maximum. Higher is more conservative.
    pub extreme_threshold: f64,

    /// Minimum confidence kept in the output
    pub confidence_threshold: Confidence,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tide_removal_method: TideRemovalMethod::Lowpass,
            extreme_threshold: 30.0,
            confidence_threshold: Confidence::Medium,
        }
    }
}

impl AnalysisConfig {
    pub const MAX_EXTREME_THRESHOLD: f64 = 100.0;

    /// Parse a configuration from the UI's JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfig(format!("unreadable configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_method(mut self, method: TideRemovalMethod) -> Self {
        self.tide_removal_method = method;
        self
    }

    pub fn with_extreme_threshold(mut self, threshold: f64) -> Self {
        self.extreme_threshold = threshold;
        self
    }

    pub fn with_confidence_threshold(mut self, confidence: Confidence) -> Self {
        self.confidence_threshold = confidence;
        self
    }

    /// Check every option against its domain
    pub fn validate(&self) -> Result<()> {
        validate_extreme_threshold(self.extreme_threshold)
    }
}

/// `threshold` must be finite and in `(0, 100]`
pub fn validate_extreme_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite()
        || threshold <= 0.0
        || threshold > AnalysisConfig::MAX_EXTREME_THRESHOLD
    {
        return Err(Error::InvalidConfig(format!(
            "extreme threshold must be in (0, {}], got {threshold}",
            AnalysisConfig::MAX_EXTREME_THRESHOLD
        )));
    }
    Ok(())
}
