//! # Fraudlens Core
//!
//! Shared types, error taxonomy, and configuration for the Fraudlens
//! AML transaction-graph analysis engine.
//!
//! This crate provides:
//! - The validated [`Transaction`](types::Transaction) record consumed by the engine
//! - Report-facing types: suspicious accounts, fraud rings, analysis summary
//! - The [`AnalysisError`](error::AnalysisError) taxonomy and `Result` alias
//! - [`AnalyzerConfig`](config::AnalyzerConfig) with the engine's tunable bounds
//! - Progress reporting for long-running analyses

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod progress;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::AnalyzerConfig;
    pub use crate::error::{AnalysisError, Result};
    pub use crate::progress::{AnalysisStage, ProgressReporter};
    pub use crate::types::{
        AnalysisSummary, FraudReport, FraudRing, RingPatternType, SuspiciousAccount, TimeWindow,
        Transaction,
    };
}

pub use config::AnalyzerConfig;
pub use error::{AnalysisError, Result};
pub use progress::{AnalysisStage, ProgressReporter};
pub use types::{
    AnalysisSummary, FraudReport, FraudRing, RingPatternType, SuspiciousAccount, TimeWindow,
    Transaction,
};
