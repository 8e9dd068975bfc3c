//! Orchestration of a full sea-level analysis
//!
//! [`run_full_analysis`] is the single entry point: it removes the tide,
//! analyses the tidal spectrum, detects extreme envelope intervals in the
//! residual and classifies them into events. A run either returns the whole
//! [`AnalysisOutput`] or one [`AnalysisError`] naming the failing [`Stage`].
//!
//! For long records the run can go to a background thread with
//! [`spawn_analysis`] and be cancelled between stages.
//!
//! ```rust,no_run
//! use poseidon_core::{AnalysisConfig, TimeSeries};
//! use poseidon_engine::run_full_analysis;
//!
//! # fn load() -> TimeSeries { unimplemented!() }
//! let series = load();
//! match run_full_analysis(&series, &AnalysisConfig::default()) {
//!     Ok(output) => {
//!         for event in &output.events {
//!             println!("{event}");
//!         }
//!     }
//!     Err(err) => eprintln!("{} during {}", err.kind(), err.stage()),
//! }
//! ```

pub mod cancel;
pub mod error;
pub mod observer;
pub mod runner;
pub mod stage;

pub use cancel::CancellationToken;
pub use error::AnalysisError;
pub use observer::{AnalysisObserver, NullAnalysisObserver};
pub use runner::{
    run_full_analysis, spawn_analysis, AnalysisDiagnostics, AnalysisHandle, AnalysisOutput,
    AnalysisRunner, NOISE_FLOOR_FRACTION,
};
pub use stage::Stage;
