//! Hooks for watching a run progress

use crate::error::AnalysisError;
use crate::stage::Stage;
use std::time::Duration;

/// Receives stage transitions of a run
///
/// Called synchronously from the thread executing the run.
pub trait AnalysisObserver: Send + Sync {
    /// A stage is about to start
    fn stage_entered(&self, stage: Stage);

    /// A stage finished successfully
    fn stage_completed(&self, stage: Stage, elapsed: Duration);

    /// The run moved to [`Stage::Failed`]
    fn run_failed(&self, error: &AnalysisError);

    /// Whether this observer records anything
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAnalysisObserver;

impl AnalysisObserver for NullAnalysisObserver {
    fn stage_entered(&self, _stage: Stage) {}

    fn stage_completed(&self, _stage: Stage, _elapsed: Duration) {}

    fn run_failed(&self, _error: &AnalysisError) {}

    fn is_enabled(&self) -> bool {
        false
    }
}

impl<O: AnalysisObserver + ?Sized> AnalysisObserver for std::sync::Arc<O> {
    fn stage_entered(&self, stage: Stage) {
        (**self).stage_entered(stage)
    }

    fn stage_completed(&self, stage: Stage, elapsed: Duration) {
        (**self).stage_completed(stage, elapsed)
    }

    fn run_failed(&self, error: &AnalysisError) {
        (**self).run_failed(error)
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }
}
