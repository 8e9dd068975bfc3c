//! Run-level failure

use crate::stage::Stage;
use poseidon_core::{Error, ErrorKind};
use thiserror::Error;

/// The first failure of a run, tagged with the stage it happened in
#[derive(Error, Debug, Clone, PartialEq)]
#[error("analysis failed during {stage}: {source}")]
pub struct AnalysisError {
    stage: Stage,
    #[source]
    source: Error,
}

impl AnalysisError {
    pub fn new(stage: Stage, source: Error) -> Self {
        Self { stage, source }
    }

    /// Stage that was running, or about to run, when the failure happened
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }

    pub fn error(&self) -> &Error {
        &self.source
    }

    pub fn into_inner(self) -> Error {
        self.source
    }

    pub fn is_cancelled(&self) -> bool {
        self.source == Error::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_message_and_source() {
        let err = AnalysisError::new(
            Stage::Detrending,
            Error::DegenerateSignal("flat".to_string()),
        );
        assert_eq!(err.stage(), Stage::Detrending);
        assert_eq!(err.kind(), ErrorKind::DegenerateSignal);
        assert_eq!(
            err.to_string(),
            "analysis failed during detrending: Degenerate signal: flat"
        );
        assert!(err.source().is_some());
        assert!(!err.is_cancelled());
    }
}
