//! Simple directed cycle enumeration.

use crate::detector::{DetectorMetadata, PatternDetector, Signal, SignalMap};
use fraudlens_graph::{GraphStats, TransactionGraph};
use std::collections::{HashMap, HashSet};

/// Cycles shorter than this carry no laundering evidence (self-loops and
/// simple reciprocal pairs are handled by other detectors).
const MIN_CYCLE_LEN: usize = 3;
const MAX_CYCLE_LEN: usize = 5;
/// New cycles recorded per starting account before moving on.
const PER_START_CAP: usize = 100;

/// Enumerates simple directed cycles of length 3-5.
///
/// Iterative DFS with an explicit frame stack and a current-path set; a
/// back-edge into the path closes a cycle. Each cycle is normalized by
/// rotating its smallest account id to the front and deduplicated on that
/// form; reversed orderings are distinct cycles. Depth is bounded to four
/// expansions from each start, and enumeration stops at the global cap.
#[derive(Debug)]
pub struct CycleScan {
    metadata: DetectorMetadata,
    max_cycles: usize,
}

impl CycleScan {
    /// Create the scan with a global enumeration cap.
    #[must_use]
    pub fn new(max_cycles: usize) -> Self {
        Self {
            metadata: DetectorMetadata::new("structural/cycles", "cycle")
                .with_description("Simple directed cycles of length 3-5"),
            max_cycles,
        }
    }

    /// Enumerate normalized, deduplicated cycles.
    #[must_use]
    pub fn enumerate(graph: &TransactionGraph, max_cycles: usize) -> Vec<Vec<String>> {
        let mut seen: HashSet<Vec<String>> = HashSet::new();
        let mut cycles: Vec<Vec<String>> = Vec::new();

        'starts: for start in graph.accounts() {
            let mut recorded_here = 0usize;
            // Frame: (account on the path, next outgoing edge to expand).
            let mut stack: Vec<(String, usize)> = vec![(start.clone(), 0)];
            let mut on_path: HashSet<String> = HashSet::new();
            on_path.insert(start.clone());

            while let Some(frame) = stack.last_mut() {
                let account = frame.0.clone();
                let edges = graph.outgoing(&account);
                if frame.1 >= edges.len() {
                    stack.pop();
                    on_path.remove(&account);
                    continue;
                }
                let next = edges[frame.1].receiver_id.clone();
                frame.1 += 1;

                if on_path.contains(&next) {
                    let pos = stack
                        .iter()
                        .position(|(a, _)| *a == next)
                        .expect("path member present in stack");
                    let len = stack.len() - pos;
                    if (MIN_CYCLE_LEN..=MAX_CYCLE_LEN).contains(&len) {
                        let cycle: Vec<String> =
                            stack[pos..].iter().map(|(a, _)| a.clone()).collect();
                        let normalized = normalize(cycle);
                        if seen.insert(normalized.clone()) {
                            cycles.push(normalized);
                            recorded_here += 1;
                            if cycles.len() >= max_cycles {
                                break 'starts;
                            }
                            if recorded_here >= PER_START_CAP {
                                break;
                            }
                        }
                    }
                } else if stack.len() < MAX_CYCLE_LEN {
                    on_path.insert(next.clone());
                    stack.push((next, 0));
                }
            }
        }
        cycles
    }
}

impl PatternDetector for CycleScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let cycles = Self::enumerate(graph, self.max_cycles);

        let mut membership: HashMap<String, Vec<Vec<String>>> = HashMap::new();
        for cycle in &cycles {
            for account in cycle {
                membership
                    .entry(account.clone())
                    .or_default()
                    .push(cycle.clone());
            }
        }

        membership
            .into_iter()
            .map(|(account, cycles)| {
                let shortest = cycles.iter().map(Vec::len).min().unwrap_or(0);
                (account, Signal::Cycle { cycles, shortest })
            })
            .collect()
    }
}

/// Rotate the cycle so the lexicographically smallest account leads.
/// Order is preserved, so a reversed traversal stays distinct.
fn normalize(mut cycle: Vec<String>) -> Vec<String> {
    let min_pos = cycle
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    cycle.rotate_left(min_pos);
    cycle
}
