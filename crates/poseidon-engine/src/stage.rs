//! Pipeline stages

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a run in the analysis pipeline
///
/// ```text
/// Idle -> Detrending -> SpectralAnalysis -> ExtremeDetection -> Classification -> Complete
/// ```
///
/// with `Failed` reachable from every non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Idle,
    Detrending,
    SpectralAnalysis,
    ExtremeDetection,
    Classification,
    Complete,
    Failed,
}

impl Stage {
    /// Stages that do work, in execution order
    pub const PIPELINE: [Stage; 4] = [
        Stage::Detrending,
        Stage::SpectralAnalysis,
        Stage::ExtremeDetection,
        Stage::Classification,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Complete | Stage::Failed)
    }

    /// Stage entered after this one succeeds
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Idle => Some(Stage::Detrending),
            Stage::Detrending => Some(Stage::SpectralAnalysis),
            Stage::SpectralAnalysis => Some(Stage::ExtremeDetection),
            Stage::ExtremeDetection => Some(Stage::Classification),
            Stage::Classification => Some(Stage::Complete),
            Stage::Complete | Stage::Failed => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Detrending => "detrending",
            Stage::SpectralAnalysis => "spectral analysis",
            Stage::ExtremeDetection => "extreme detection",
            Stage::Classification => "classification",
            Stage::Complete => "complete",
            Stage::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
