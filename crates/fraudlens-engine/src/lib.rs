//! # Fraudlens Engine
//!
//! The analysis pipeline: suspicion scoring with legitimacy penalties,
//! fraud ring assembly, report building, and the [`FraudAnalyzer`]
//! entry point that orchestrates the stages:
//!
//! graph -> statistics -> detectors -> Louvain -> scoring -> rings -> report
//!
//! Every `analyze` call is independent and stateless; shared data is
//! write-once per run, detectors scan concurrently, and the report is
//! reproducible for identical input (modulo wall-clock timing).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analyzer;
pub mod legitimacy;
pub mod report;
pub mod rings;
pub mod scoring;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::analyzer::FraudAnalyzer;
    pub use crate::rings::RingAssembler;
    pub use crate::scoring::{ScoredAccount, SuspicionScorer};
}

pub use analyzer::FraudAnalyzer;
pub use rings::RingAssembler;
pub use scoring::{ScoredAccount, SuspicionScorer};
