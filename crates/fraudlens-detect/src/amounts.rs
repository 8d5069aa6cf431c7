//! Amount-driven detectors: structuring, threshold avoidance, outliers,
//! splitting, progression, and smurfing clusters.

use crate::detector::{
    DetectorMetadata, PatternDetector, ProgressionTrend, Signal, SignalMap,
};
use fraudlens_core::{TimeWindow, Transaction};
use fraudlens_graph::{GraphStats, TransactionGraph};
use std::collections::HashSet;
use std::sync::Arc;

const HOUR_MS: i64 = 3_600_000;

/// Round-amount denominations checked by the structuring scan.
const ROUND_DENOMINATIONS: [f64; 3] = [1_000.0, 500.0, 100.0];
/// Fraction of round amounts above which structuring fires.
const STRUCTURING_FRACTION: f64 = 0.7;

/// Near-threshold band, inclusive on both ends.
const THRESHOLD_BAND: (f64, f64) = (9_000.0, 9_999.0);

/// Outlier fraction above which the amount anomaly fires.
const OUTLIER_FRACTION: f64 = 0.3;

/// Splitting window and minimum group size.
const SPLIT_WINDOW_MS: i64 = 24 * HOUR_MS;
const SPLIT_MIN_GROUP: usize = 3;
/// Relative tolerance around the window mean.
const SPLIT_TOLERANCE: f64 = 0.2;

/// Progression thresholds: step change ratio and trend dominance.
const PROGRESSION_STEP: f64 = 0.2;
const PROGRESSION_RATIO: f64 = 0.6;
const PROGRESSION_MIN_ITEMS: usize = 5;

/// Smurfing cluster shape: amount tolerance, minimum size, minimum
/// distinct receivers, and reported cluster cap.
const SMURF_TOLERANCE: f64 = 0.15;
const SMURF_MIN_CLUSTER: usize = 10;
const SMURF_MIN_RECEIVERS: usize = 8;
const SMURF_MIN_CLUSTERS: usize = 2;
const SMURF_CLUSTER_CAP: usize = 5;

fn is_round_amount(amount: f64) -> bool {
    ROUND_DENOMINATIONS.iter().any(|&d| {
        let rem = amount % d;
        rem.abs() < 1e-6 || (d - rem).abs() < 1e-6
    })
}

// ============================================================================
// Structuring
// ============================================================================

/// Deliberate use of round amounts across an account's activity.
#[derive(Debug)]
pub struct StructuringScan {
    metadata: DetectorMetadata,
}

impl StructuringScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("amounts/structuring", "structuring")
                .with_description("Dominance of round-denomination amounts"),
        }
    }
}

impl Default for StructuringScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for StructuringScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let mut signals = SignalMap::new();
        for account in graph.accounts() {
            let total = graph.degree(account);
            if total == 0 {
                continue;
            }
            let round = graph
                .outgoing(account)
                .iter()
                .chain(graph.incoming(account))
                .filter(|tx| is_round_amount(tx.amount))
                .count();
            let round_fraction = round as f64 / total as f64;
            if round_fraction > STRUCTURING_FRACTION {
                signals.insert(account.clone(), Signal::Structuring { round_fraction });
            }
        }
        signals
    }
}

// ============================================================================
// Threshold Avoidance
// ============================================================================

/// Amounts clustered just below the reporting threshold.
#[derive(Debug)]
pub struct ThresholdAvoidanceScan {
    metadata: DetectorMetadata,
}

impl ThresholdAvoidanceScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("amounts/threshold-avoidance", "threshold_avoidance")
                .with_description("Mean amount parked in the 9000-9999 band"),
        }
    }
}

impl Default for ThresholdAvoidanceScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for ThresholdAvoidanceScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let (lo, hi) = THRESHOLD_BAND;
        let mut signals = SignalMap::new();
        for account in graph.accounts() {
            let total = graph.degree(account);
            if total == 0 {
                continue;
            }
            let amounts = || {
                graph
                    .outgoing(account)
                    .iter()
                    .chain(graph.incoming(account))
                    .map(|tx| tx.amount)
            };
            let mean_amount = amounts().sum::<f64>() / total as f64;
            if !(lo..=hi).contains(&mean_amount) {
                continue;
            }
            let in_band = amounts().filter(|a| (lo..=hi).contains(a)).count();
            signals.insert(
                account.clone(),
                Signal::ThresholdAvoidance {
                    mean_amount,
                    clustering: in_band as f64 / total as f64,
                },
            );
        }
        signals
    }
}

// ============================================================================
// Amount Anomaly (IQR fences)
// ============================================================================

/// Per-account share of amounts outside the global IQR fences.
#[derive(Debug)]
pub struct AmountAnomalyScan {
    metadata: DetectorMetadata,
}

impl AmountAnomalyScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("amounts/amount-anomaly", "amount_anomaly")
                .with_description("Amounts outside the global IQR fences"),
        }
    }
}

impl Default for AmountAnomalyScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for AmountAnomalyScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, stats: &GraphStats) -> SignalMap {
        let (lo, hi) = stats.outlier_fences();
        let mut signals = SignalMap::new();
        for account in graph.accounts() {
            let total = graph.degree(account);
            if total == 0 {
                continue;
            }
            let outliers = graph
                .outgoing(account)
                .iter()
                .chain(graph.incoming(account))
                .filter(|tx| tx.amount < lo || tx.amount > hi)
                .count();
            let outlier_fraction = outliers as f64 / total as f64;
            if outlier_fraction > OUTLIER_FRACTION {
                signals.insert(
                    account.clone(),
                    Signal::AmountAnomaly {
                        outlier_fraction,
                        outliers,
                    },
                );
            }
        }
        signals
    }
}

// ============================================================================
// Amount Splitting
// ============================================================================

/// Similar amounts bunched inside a 24-hour window.
#[derive(Debug)]
pub struct AmountSplittingScan {
    metadata: DetectorMetadata,
}

impl AmountSplittingScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("amounts/amount-splitting", "amount_splitting")
                .with_description("3+ near-equal outgoing amounts inside 24 hours"),
        }
    }
}

impl Default for AmountSplittingScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for AmountSplittingScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let mut signals = SignalMap::new();
        for account in graph.accounts() {
            let txs = graph.outgoing_sorted(account);
            if txs.len() < SPLIT_MIN_GROUP {
                continue;
            }
            let mut best = 0usize;
            let mut best_window = TimeWindow::new(0, 0);
            for (i, anchor) in txs.iter().enumerate() {
                let end = anchor.timestamp_ms + SPLIT_WINDOW_MS;
                let window: Vec<&Arc<Transaction>> = txs[i..]
                    .iter()
                    .take_while(|tx| tx.timestamp_ms <= end)
                    .collect();
                if window.len() < SPLIT_MIN_GROUP {
                    continue;
                }
                let mean =
                    window.iter().map(|tx| tx.amount).sum::<f64>() / window.len() as f64;
                if mean <= 0.0 {
                    continue;
                }
                let group = window
                    .iter()
                    .filter(|tx| (tx.amount - mean).abs() <= SPLIT_TOLERANCE * mean)
                    .count();
                if group >= SPLIT_MIN_GROUP && group > best {
                    best = group;
                    best_window = TimeWindow::new(anchor.timestamp_ms, end);
                }
            }
            if best >= SPLIT_MIN_GROUP {
                signals.insert(
                    account.clone(),
                    Signal::AmountSplitting {
                        group_size: best,
                        window: best_window,
                    },
                );
            }
        }
        signals
    }
}

// ============================================================================
// Amount Progression
// ============================================================================

/// Monotone step-over-step drift in outgoing amounts.
#[derive(Debug)]
pub struct AmountProgressionScan {
    metadata: DetectorMetadata,
}

impl AmountProgressionScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("amounts/amount-progression", "amount_progression")
                .with_description("Escalating or shrinking outgoing amounts"),
        }
    }
}

impl Default for AmountProgressionScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for AmountProgressionScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let mut signals = SignalMap::new();
        for account in graph.accounts() {
            let txs = graph.outgoing_sorted(account);
            if txs.len() < PROGRESSION_MIN_ITEMS {
                continue;
            }
            let steps = txs.len() - 1;
            let mut increasing = 0usize;
            let mut decreasing = 0usize;
            for pair in txs.windows(2) {
                let (prev, next) = (pair[0].amount, pair[1].amount);
                if next > prev * (1.0 + PROGRESSION_STEP) {
                    increasing += 1;
                } else if next < prev * (1.0 - PROGRESSION_STEP) {
                    decreasing += 1;
                }
            }
            let inc_ratio = increasing as f64 / steps as f64;
            let dec_ratio = decreasing as f64 / steps as f64;
            let (trend, step_ratio) = if inc_ratio > PROGRESSION_RATIO {
                (ProgressionTrend::Increasing, inc_ratio)
            } else if dec_ratio > PROGRESSION_RATIO {
                (ProgressionTrend::Decreasing, dec_ratio)
            } else {
                continue;
            };
            let first = txs.first().map(|tx| tx.amount).unwrap_or(0.0);
            let last = txs.last().map(|tx| tx.amount).unwrap_or(0.0);
            let multiplier = if first > 0.0 { last / first } else { 0.0 };
            signals.insert(
                account.clone(),
                Signal::AmountProgression {
                    trend,
                    step_ratio,
                    multiplier,
                },
            );
        }
        signals
    }
}

// ============================================================================
// Smurfing Clusters
// ============================================================================

/// Greedy similar-amount clusters spread across many receivers.
#[derive(Debug)]
pub struct SmurfingClusterScan {
    metadata: DetectorMetadata,
}

impl SmurfingClusterScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("amounts/smurfing-clusters", "smurfing_pattern")
                .with_description("Repeated similar-amount clusters over 8+ receivers"),
        }
    }
}

impl Default for SmurfingClusterScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for SmurfingClusterScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let mut signals = SignalMap::new();
        for account in graph.accounts() {
            let txs = graph.outgoing_sorted(account);
            if txs.len() < SMURF_MIN_CLUSTER * SMURF_MIN_CLUSTERS {
                continue;
            }

            // Greedy assignment against each cluster's running mean.
            let mut clusters: Vec<(f64, Vec<&Arc<Transaction>>)> = Vec::new();
            for tx in &txs {
                let slot = clusters.iter_mut().find(|(sum, members)| {
                    let mean = *sum / members.len() as f64;
                    mean > 0.0 && (tx.amount - mean).abs() <= SMURF_TOLERANCE * mean
                });
                match slot {
                    Some((sum, members)) => {
                        *sum += tx.amount;
                        members.push(tx);
                    }
                    None => clusters.push((tx.amount, vec![tx])),
                }
            }

            let qualifying: Vec<usize> = clusters
                .iter()
                .filter(|(_, members)| {
                    if members.len() < SMURF_MIN_CLUSTER {
                        return false;
                    }
                    let receivers: HashSet<&str> = members
                        .iter()
                        .map(|tx| tx.receiver_id.as_str())
                        .collect();
                    receivers.len() >= SMURF_MIN_RECEIVERS
                })
                .map(|(_, members)| members.len())
                .collect();

            if qualifying.len() >= SMURF_MIN_CLUSTERS {
                signals.insert(
                    account.clone(),
                    Signal::SmurfingPattern {
                        clusters: qualifying.len().min(SMURF_CLUSTER_CAP),
                        largest: qualifying.iter().copied().max().unwrap_or(0),
                    },
                );
            }
        }
        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str, from: &str, to: &str, amount: f64, ts_ms: i64) -> Transaction {
        Transaction::new(id, from, to, amount, ts_ms)
    }

    fn run(detector: &dyn PatternDetector, txs: &[Transaction]) -> SignalMap {
        let graph = TransactionGraph::from_transactions(txs);
        let stats = GraphStats::compute(&graph);
        detector.scan(&graph, &stats)
    }

    #[test]
    fn test_round_amount_check() {
        assert!(is_round_amount(9_500.0));
        assert!(is_round_amount(1_000.0));
        assert!(is_round_amount(700.0));
        assert!(!is_round_amount(1_050.0));
        assert!(!is_round_amount(99.99));
    }

    #[test]
    fn test_structuring_fires_above_seventy_percent() {
        let txs: Vec<Transaction> = (0..10)
            .map(|i| {
                let amount = if i < 8 { 500.0 } else { 333.33 };
                tx(&format!("t{i}"), "A", &format!("B{i}"), amount, i)
            })
            .collect();
        let signals = run(&StructuringScan::new(), &txs);
        match &signals["A"] {
            Signal::Structuring { round_fraction } => {
                assert!((round_fraction - 0.8).abs() < 1e-9);
            }
            other => panic!("unexpected signal {other:?}"),
        }
    }

    #[test]
    fn test_structuring_silent_at_seventy_percent() {
        let txs: Vec<Transaction> = (0..10)
            .map(|i| {
                let amount = if i < 7 { 500.0 } else { 333.33 };
                tx(&format!("t{i}"), "A", &format!("B{i}"), amount, i)
            })
            .collect();
        assert!(!run(&StructuringScan::new(), &txs).contains_key("A"));
    }

    #[test]
    fn test_threshold_avoidance_boundaries() {
        for (mean, fires) in [(9_000.0, true), (9_999.0, true), (8_999.0, false), (10_000.0, false)]
        {
            let txs = vec![
                tx("t1", "A", "B", mean, 0),
                tx("t2", "A", "C", mean, 1),
            ];
            let signals = run(&ThresholdAvoidanceScan::new(), &txs);
            assert_eq!(signals.contains_key("A"), fires, "mean {mean}");
        }
    }

    #[test]
    fn test_threshold_clustering_fraction() {
        let txs = vec![
            tx("t1", "A", "B", 9_500.0, 0),
            tx("t2", "A", "C", 9_500.0, 1),
            tx("t3", "A", "D", 9_500.0, 2),
            tx("t4", "A", "E", 9_500.0, 3),
        ];
        let signals = run(&ThresholdAvoidanceScan::new(), &txs);
        match &signals["A"] {
            Signal::ThresholdAvoidance {
                mean_amount,
                clustering,
            } => {
                assert_eq!(*mean_amount, 9_500.0);
                assert_eq!(*clustering, 1.0);
            }
            other => panic!("unexpected signal {other:?}"),
        }
    }

    #[test]
    fn test_amount_anomaly_outlier_share() {
        // Batch dominated by ~100 amounts; one account deals in extremes.
        let mut txs: Vec<Transaction> = (0..20)
            .map(|i| tx(&format!("b{i}"), "M", &format!("C{i}"), 100.0 + i as f64, i))
            .collect();
        txs.push(tx("x1", "A", "B", 1_000_000.0, 100));
        txs.push(tx("x2", "A", "B", 1_000_000.0, 101));
        let signals = run(&AmountAnomalyScan::new(), &txs);
        match &signals["A"] {
            Signal::AmountAnomaly {
                outlier_fraction,
                outliers,
            } => {
                assert_eq!(*outliers, 2);
                assert_eq!(*outlier_fraction, 1.0);
            }
            other => panic!("unexpected signal {other:?}"),
        }
        assert!(!signals.contains_key("M"));
    }

    #[test]
    fn test_splitting_groups_similar_amounts() {
        let txs = vec![
            tx("t1", "A", "B", 1_000.0, 0),
            tx("t2", "A", "C", 1_050.0, HOUR_MS),
            tx("t3", "A", "D", 980.0, 2 * HOUR_MS),
            tx("t4", "A", "E", 40_000.0, 40 * HOUR_MS),
        ];
        let signals = run(&AmountSplittingScan::new(), &txs);
        match &signals["A"] {
            Signal::AmountSplitting { group_size, .. } => assert_eq!(*group_size, 3),
            other => panic!("unexpected signal {other:?}"),
        }
    }

    #[test]
    fn test_splitting_silent_when_spread_out() {
        let txs = vec![
            tx("t1", "A", "B", 1_000.0, 0),
            tx("t2", "A", "C", 1_000.0, 48 * HOUR_MS),
            tx("t3", "A", "D", 1_000.0, 96 * HOUR_MS),
        ];
        assert!(run(&AmountSplittingScan::new(), &txs).is_empty());
    }

    #[test]
    fn test_progression_increasing() {
        let txs: Vec<Transaction> = (0..6)
            .map(|i| {
                tx(
                    &format!("t{i}"),
                    "A",
                    "B",
                    100.0 * 1.5f64.powi(i),
                    i as i64 * HOUR_MS,
                )
            })
            .collect();
        let signals = run(&AmountProgressionScan::new(), &txs);
        match &signals["A"] {
            Signal::AmountProgression {
                trend,
                step_ratio,
                multiplier,
            } => {
                assert_eq!(*trend, ProgressionTrend::Increasing);
                assert_eq!(*step_ratio, 1.0);
                assert!(*multiplier > 7.0);
            }
            other => panic!("unexpected signal {other:?}"),
        }
    }

    #[test]
    fn test_progression_silent_on_flat_amounts() {
        let txs: Vec<Transaction> = (0..6)
            .map(|i| tx(&format!("t{i}"), "A", "B", 100.0, i as i64 * HOUR_MS))
            .collect();
        assert!(run(&AmountProgressionScan::new(), &txs).is_empty());
    }

    #[test]
    fn test_smurfing_clusters_fire() {
        // Two tight amount bands, each 10 transactions over 10 receivers.
        let mut txs = Vec::new();
        for i in 0..10 {
            txs.push(tx(
                &format!("a{i}"),
                "S",
                &format!("R{i:02}"),
                1_000.0 + i as f64,
                i as i64,
            ));
        }
        for i in 0..10 {
            txs.push(tx(
                &format!("b{i}"),
                "S",
                &format!("Q{i:02}"),
                5_000.0 + i as f64,
                (100 + i) as i64,
            ));
        }
        let signals = run(&SmurfingClusterScan::new(), &txs);
        match &signals["S"] {
            Signal::SmurfingPattern { clusters, largest } => {
                assert_eq!(*clusters, 2);
                assert_eq!(*largest, 10);
            }
            other => panic!("unexpected signal {other:?}"),
        }
    }

    #[test]
    fn test_smurfing_needs_receiver_spread() {
        // Twenty similar amounts but only two receivers.
        let txs: Vec<Transaction> = (0..20)
            .map(|i| {
                tx(
                    &format!("t{i}"),
                    "S",
                    if i % 2 == 0 { "R1" } else { "R2" },
                    1_000.0,
                    i as i64,
                )
            })
            .collect();
        assert!(run(&SmurfingClusterScan::new(), &txs).is_empty());
    }
}
