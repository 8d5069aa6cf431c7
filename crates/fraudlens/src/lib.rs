//! # Fraudlens
//!
//! Batch anti-money-laundering analytics over transaction graphs.
//!
//! Fraudlens ingests a validated batch of transactions and produces a
//! structured fraud report: suspicious accounts ranked by a weighted
//! suspicion score, fraud rings assembled from connectivity and Louvain
//! community evidence, and an aggregate summary.
//!
//! ## Pipeline
//!
//! 1. **Graph** - directed multigraph over accounts ([`TransactionGraph`])
//! 2. **Statistics** - one-pass global aggregates ([`GraphStats`])
//! 3. **Detectors** - 24 independent pattern scans, each emitting a
//!    per-account signal map (cycles, fan-in/out, structuring, velocity,
//!    wash trading, ...)
//! 4. **Communities** - simplified Louvain over a weighted undirected
//!    projection, scored for smurfing shape
//! 5. **Scoring** - weighted multi-signal fusion with legitimacy
//!    penalties for payroll/merchant/utility/business/savings profiles
//! 6. **Rings** - connected components over the suspicious subgraph,
//!    merged with Louvain communities, risk-scored
//! 7. **Report** - stable-shape, reproducible output
//!
//! ## Quick Start
//!
//! ```
//! use fraudlens::prelude::*;
//!
//! let transactions = vec![
//!     Transaction::new("t1", "A", "B", 1_000.0, 0),
//!     Transaction::new("t2", "B", "C", 1_000.0, 3_600_000),
//!     Transaction::new("t3", "C", "A", 1_000.0, 7_200_000),
//! ];
//!
//! let report = FraudAnalyzer::new().analyze(&transactions).unwrap();
//! assert_eq!(report.summary.cycles_detected, 1);
//! assert_eq!(report.fraud_rings.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use fraudlens_core as core;
pub use fraudlens_detect as detect;
pub use fraudlens_engine as engine;
pub use fraudlens_graph as graph;

pub use fraudlens_core::{
    AnalysisError, AnalysisStage, AnalysisSummary, AnalyzerConfig, FraudReport, FraudRing,
    ProgressReporter, Result, RingPatternType, SuspiciousAccount, TimeWindow, Transaction,
};
pub use fraudlens_engine::FraudAnalyzer;

/// Prelude for convenient imports.
pub mod prelude {
    pub use fraudlens_core::prelude::*;
    pub use fraudlens_detect::prelude::*;
    pub use fraudlens_engine::prelude::*;
    pub use fraudlens_graph::prelude::*;
}

/// Detector catalog: enumeration of the engine's pattern scans.
pub mod catalog {
    use fraudlens_core::AnalyzerConfig;
    use fraudlens_detect::{build_registry, DETECTOR_COUNT};

    /// Identity of one detector in the catalog.
    #[derive(Debug, Clone)]
    pub struct DetectorInfo {
        /// Detector id, `family/name`.
        pub id: &'static str,
        /// Pattern label the detector emits.
        pub label: &'static str,
        /// Human-readable description.
        pub description: String,
    }

    /// The full detector catalog, in canonical detection order.
    #[must_use]
    pub fn detectors() -> Vec<DetectorInfo> {
        build_registry(&AnalyzerConfig::default())
            .iter()
            .map(|detector| {
                let meta = detector.metadata();
                DetectorInfo {
                    id: meta.id,
                    label: meta.label,
                    description: meta.description().to_string(),
                }
            })
            .collect()
    }

    /// Number of detectors the engine executes.
    #[must_use]
    pub fn detector_count() -> usize {
        DETECTOR_COUNT
    }

}
