//! Coordinated behavior across account timelines.

use crate::detector::{DetectorMetadata, PatternDetector, Signal, SignalMap};
use fraudlens_graph::{GraphStats, TransactionGraph};
use std::collections::HashMap;

const HOUR_MS: i64 = 3_600_000;

/// Only busy accounts are compared, and only against their activity
/// neighbors; pairwise timeline comparison is quadratic otherwise.
const MIN_DEGREE: usize = 20;
const TOP_ACCOUNTS: usize = 100;
const COMPARE_AHEAD: usize = 20;

/// Correlation: share of the shorter timeline that must have a matching
/// event within the tolerance.
const MATCH_TOLERANCE_MS: i64 = HOUR_MS;
const MATCH_FRACTION: f64 = 0.7;
/// Correlated partners needed to fire.
const MIN_PARTNERS: usize = 2;

/// Detects accounts whose activity moves in lockstep with other busy
/// accounts: for each of the top accounts by activity, the timeline is
/// compared against the next twenty in activity order.
#[derive(Debug)]
pub struct CoordinatedBehaviorScan {
    metadata: DetectorMetadata,
}

impl CoordinatedBehaviorScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("behavior/coordination", "coordinated_behavior")
                .with_description("Timelines moving in lockstep across accounts"),
        }
    }
}

impl Default for CoordinatedBehaviorScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for CoordinatedBehaviorScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, stats: &GraphStats) -> SignalMap {
        let mut candidates: Vec<&String> = graph
            .accounts()
            .iter()
            .filter(|a| graph.degree(a) >= MIN_DEGREE)
            .collect();
        candidates.sort_by(|a, b| {
            stats
                .activity_of(b)
                .cmp(&stats.activity_of(a))
                .then_with(|| a.cmp(b))
        });
        candidates.truncate(TOP_ACCOUNTS);

        let timelines: Vec<Vec<i64>> = candidates
            .iter()
            .map(|account| {
                graph
                    .merged_timeline(account)
                    .iter()
                    .map(|tx| tx.timestamp_ms)
                    .collect()
            })
            .collect();

        let mut partners: HashMap<usize, usize> = HashMap::new();
        for i in 0..candidates.len() {
            let upper = (i + 1 + COMPARE_AHEAD).min(candidates.len());
            for j in (i + 1)..upper {
                if correlated(&timelines[i], &timelines[j]) {
                    *partners.entry(i).or_default() += 1;
                    *partners.entry(j).or_default() += 1;
                }
            }
        }

        partners
            .into_iter()
            .filter(|(_, count)| *count >= MIN_PARTNERS)
            .map(|(i, count)| {
                (
                    candidates[i].clone(),
                    Signal::CoordinatedBehavior { partners: count },
                )
            })
            .collect()
    }
}

/// Two timelines are correlated when enough of the shorter one has an
/// event in the other within the tolerance.
fn correlated(a: &[i64], b: &[i64]) -> bool {
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if shorter.is_empty() {
        return false;
    }
    let matched = shorter
        .iter()
        .filter(|&&ts| has_event_near(longer, ts))
        .count();
    matched as f64 / shorter.len() as f64 >= MATCH_FRACTION
}

/// Binary search for any event within the tolerance of `ts`.
fn has_event_near(timeline: &[i64], ts: i64) -> bool {
    let idx = timeline.partition_point(|&t| t < ts);
    let after = timeline.get(idx).map_or(false, |&t| t - ts <= MATCH_TOLERANCE_MS);
    let before = idx
        .checked_sub(1)
        .and_then(|i| timeline.get(i))
        .map_or(false, |&t| ts - t <= MATCH_TOLERANCE_MS);
    after || before
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraudlens_core::Transaction;

    fn lockstep_batch() -> Vec<Transaction> {
        // Three busy accounts transacting at the same minutes, plus one
        // busy account on an unrelated cadence.
        let mut txs = Vec::new();
        for (account, offset_ms) in [("A", 0i64), ("B", 5 * 60_000), ("C", 10 * 60_000)] {
            for i in 0..20 {
                txs.push(Transaction::new(
                    format!("{account}-{i}"),
                    account,
                    format!("SINK-{account}-{i}"),
                    250.0,
                    i as i64 * 6 * HOUR_MS + offset_ms,
                ));
            }
        }
        for i in 0..20 {
            txs.push(Transaction::new(
                format!("D-{i}"),
                "D",
                format!("SINK-D-{i}"),
                250.0,
                i as i64 * 6 * HOUR_MS + 3 * HOUR_MS,
            ));
        }
        txs
    }

    #[test]
    fn test_lockstep_accounts_fire() {
        let graph = TransactionGraph::from_transactions(&lockstep_batch());
        let stats = GraphStats::compute(&graph);
        let signals = CoordinatedBehaviorScan::new().scan(&graph, &stats);

        for account in ["A", "B", "C"] {
            match &signals[account] {
                Signal::CoordinatedBehavior { partners } => assert_eq!(*partners, 2),
                other => panic!("unexpected signal {other:?}"),
            }
        }
        // D is two hours away from every other event.
        assert!(!signals.contains_key("D"));
    }

    #[test]
    fn test_quiet_accounts_skipped() {
        let txs = vec![
            Transaction::new("t1", "A", "B", 100.0, 0),
            Transaction::new("t2", "B", "A", 100.0, 1),
        ];
        let graph = TransactionGraph::from_transactions(&txs);
        let stats = GraphStats::compute(&graph);
        assert!(CoordinatedBehaviorScan::new()
            .scan(&graph, &stats)
            .is_empty());
    }

    #[test]
    fn test_correlation_symmetry() {
        let a = vec![0, HOUR_MS, 2 * HOUR_MS];
        let b = vec![30 * 60_000, HOUR_MS + 30 * 60_000, 2 * HOUR_MS + 30 * 60_000];
        assert!(correlated(&a, &b));
        assert!(correlated(&b, &a));

        let far = vec![10 * HOUR_MS, 20 * HOUR_MS, 30 * HOUR_MS];
        assert!(!correlated(&a, &far));
    }
}
