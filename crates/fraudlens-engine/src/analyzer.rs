//! The analysis entry point.

use crate::report::{ReportBuilder, SummaryCounters};
use crate::rings::RingAssembler;
use crate::scoring::SuspicionScorer;
use fraudlens_core::progress::ProgressCallback;
use fraudlens_core::{
    AnalysisError, AnalysisStage, AnalyzerConfig, FraudReport, ProgressReporter, Result,
    Transaction,
};
use fraudlens_detect::{build_registry, Signal, SignalMap};
use fraudlens_graph::{GraphStats, LouvainCommunities, TransactionGraph};
use rayon::prelude::*;
use std::collections::HashSet;
use std::time::Instant;

/// Batch fraud analyzer.
///
/// Each [`analyze`](FraudAnalyzer::analyze) call is independent and
/// stateless: the graph, statistics, and signal maps are built for the
/// run, read concurrently by the detectors, and dropped with the report.
///
/// ```
/// use fraudlens_core::Transaction;
/// use fraudlens_engine::FraudAnalyzer;
///
/// let transactions = vec![
///     Transaction::new("t1", "A", "B", 1_000.0, 0),
///     Transaction::new("t2", "B", "C", 1_000.0, 3_600_000),
///     Transaction::new("t3", "C", "A", 1_000.0, 7_200_000),
/// ];
/// let report = FraudAnalyzer::new().analyze(&transactions).unwrap();
/// assert_eq!(report.summary.cycles_detected, 1);
/// ```
#[derive(Debug, Default)]
pub struct FraudAnalyzer {
    config: AnalyzerConfig,
    progress: ProgressReporter,
}

impl FraudAnalyzer {
    /// Analyzer with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzer with an explicit configuration.
    #[must_use]
    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self {
            config,
            progress: ProgressReporter::disabled(),
        }
    }

    /// Attach a progress callback invoked at stage milestones.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress = ProgressReporter::with_callback(callback);
        self
    }

    /// Run the full pipeline and produce the report.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::EmptyInput`] for an empty batch and
    /// [`AnalysisError::ValidationError`] for a malformed record that
    /// slipped past the ingestor. No partial report is ever returned.
    pub fn analyze(&self, transactions: &[Transaction]) -> Result<FraudReport> {
        let started = Instant::now();
        validate(transactions)?;

        self.progress.report(AnalysisStage::BuildingGraph);
        let graph = TransactionGraph::from_transactions(transactions);
        tracing::info!(
            accounts = graph.account_count(),
            transactions = graph.transaction_count(),
            "graph constructed"
        );

        self.progress.report(AnalysisStage::ComputingStatistics);
        let stats = GraphStats::compute(&graph);

        self.progress.report(AnalysisStage::RunningDetectors);
        let registry = build_registry(&self.config);
        let signal_maps: Vec<SignalMap> = registry
            .par_iter()
            .map(|detector| detector.scan(&graph, &stats))
            .collect();
        let fired: usize = signal_maps.iter().map(SignalMap::len).sum();
        tracing::info!(
            detectors = registry.len(),
            signals = fired,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "detection stage complete"
        );

        self.progress.report(AnalysisStage::DetectingCommunities);
        let communities = LouvainCommunities::detect(&graph);

        self.progress.report(AnalysisStage::ScoringAccounts);
        let scored = SuspicionScorer::score_all(&graph, &signal_maps, &communities);

        self.progress.report(AnalysisStage::AssemblingRings);
        let rings = RingAssembler::assemble(&graph, &scored, &communities);

        self.progress.report(AnalysisStage::BuildingReport);
        let counters = SummaryCounters {
            total_accounts: graph.account_count(),
            cycles_detected: distinct_cycles(&signal_maps),
            louvain_rings: communities.len(),
            processing_seconds: started.elapsed().as_secs_f64(),
        };
        let report = ReportBuilder::build(&scored, rings, counters);
        tracing::info!(
            suspicious = report.summary.suspicious_accounts_flagged,
            rings = report.summary.fraud_rings_detected,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis complete"
        );

        self.progress.report(AnalysisStage::Complete);
        Ok(report)
    }
}

/// Fail fast on records the ingestor should never have let through.
fn validate(transactions: &[Transaction]) -> Result<()> {
    if transactions.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    let mut ids: HashSet<&str> = HashSet::with_capacity(transactions.len());
    for tx in transactions {
        if tx.transaction_id.is_empty() || tx.sender_id.is_empty() || tx.receiver_id.is_empty() {
            return Err(AnalysisError::validation("record with an empty identifier"));
        }
        if !tx.amount.is_finite() || tx.amount < 0.0 {
            return Err(AnalysisError::validation(format!(
                "transaction {} has invalid amount {}",
                tx.transaction_id, tx.amount
            )));
        }
        if !ids.insert(tx.transaction_id.as_str()) {
            return Err(AnalysisError::validation(format!(
                "duplicate transaction id {}",
                tx.transaction_id
            )));
        }
    }
    Ok(())
}

/// Distinct normalized cycles across the cycle detector's signals.
fn distinct_cycles(signal_maps: &[SignalMap]) -> usize {
    let mut seen: HashSet<&Vec<String>> = HashSet::new();
    for map in signal_maps {
        for signal in map.values() {
            if let Signal::Cycle { cycles, .. } = signal {
                seen.extend(cycles.iter());
            }
        }
    }
    seen.len()
}
