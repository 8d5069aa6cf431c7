//! Network detectors: influence, round trips, layering, diversity,
//! laundering chains, and wash trading.

use crate::detector::{DetectorMetadata, PatternDetector, Signal, SignalMap};
use fraudlens_graph::{GraphStats, TransactionGraph};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

const HOUR_MS: i64 = 3_600_000;

/// Influence scan: fixed iteration count, damping, and firing floor.
/// Three iterations is deliberate; outputs must stay reproducible, not
/// converged.
const INFLUENCE_ITERATIONS: usize = 3;
const INFLUENCE_DAMPING: f64 = 0.85;
const INFLUENCE_FLOOR: f64 = 0.5;

/// Round-trip scan: return horizon, per-origin cap, firing floor.
const ROUND_TRIP_WINDOW_MS: i64 = 48 * HOUR_MS;
const ROUND_TRIP_CAP: usize = 10;
const ROUND_TRIP_MIN: usize = 2;

/// Layering scan: BFS depth bound, downstream account cap, firing floor.
const LAYERING_MAX_DEPTH: usize = 6;
const LAYERING_REACH_CAP: usize = 100;
const LAYERING_MIN_DEPTH: usize = 4;

/// Diversity scan: minimum activity and unique-counterparty floor.
const DIVERSITY_MIN_DEGREE: usize = 10;
const DIVERSITY_FLOOR: f64 = 0.3;

/// Chain scan: DFS path bound, recording floor, and a per-start step
/// budget. Simple-path enumeration is exponential on dense graphs; the
/// budget truncates silently like every other resource cap.
const CHAIN_MAX_DEPTH: usize = 8;
const CHAIN_RECORD_MIN: usize = 5;
const CHAIN_STEP_BUDGET: usize = 100_000;

/// Wash trading: amount tolerance, pairing horizon, per-account cap,
/// firing floor.
const WASH_TOLERANCE: f64 = 0.1;
const WASH_WINDOW_MS: i64 = 48 * HOUR_MS;
const WASH_CAP: usize = 10;
const WASH_MIN: usize = 3;

// ============================================================================
// Network Influence
// ============================================================================

/// Weighted power-iteration influence over the most active accounts.
#[derive(Debug)]
pub struct NetworkInfluenceScan {
    metadata: DetectorMetadata,
    sample_size: usize,
}

impl NetworkInfluenceScan {
    /// Create the scan with the centrality sample cap.
    #[must_use]
    pub fn new(sample_size: usize) -> Self {
        Self {
            metadata: DetectorMetadata::new("network/influence", "network_influence")
                .with_description("Damped weighted power iteration, max-normalized"),
            sample_size,
        }
    }
}

impl PatternDetector for NetworkInfluenceScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, stats: &GraphStats) -> SignalMap {
        // Most active accounts first; ties break on the id so the sample
        // is reproducible.
        let mut sample: Vec<&String> = graph.accounts().iter().collect();
        sample.sort_by(|a, b| {
            stats
                .activity_of(b)
                .cmp(&stats.activity_of(a))
                .then_with(|| a.cmp(b))
        });
        sample.truncate(self.sample_size);

        let n = sample.len();
        if n == 0 {
            return SignalMap::new();
        }
        let index: HashMap<&str, usize> = sample
            .iter()
            .enumerate()
            .map(|(i, a)| (a.as_str(), i))
            .collect();

        // Amount-weighted edges within the sample.
        let mut out_edges: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); n];
        let mut out_weight = vec![0.0f64; n];
        for tx in graph.transactions_ordered() {
            if tx.is_self_loop() {
                continue;
            }
            let (Some(&u), Some(&v)) = (
                index.get(tx.sender_id.as_str()),
                index.get(tx.receiver_id.as_str()),
            ) else {
                continue;
            };
            *out_edges[u].entry(v).or_default() += tx.amount;
            out_weight[u] += tx.amount;
        }

        let teleport = (1.0 - INFLUENCE_DAMPING) / n as f64;
        let mut rank = vec![1.0 / n as f64; n];
        for _ in 0..INFLUENCE_ITERATIONS {
            let mut next = vec![teleport; n];
            for u in 0..n {
                if out_weight[u] <= 0.0 {
                    continue;
                }
                let share = INFLUENCE_DAMPING * rank[u] / out_weight[u];
                for (&v, &weight) in &out_edges[u] {
                    next[v] += share * weight;
                }
            }
            rank = next;
        }

        let max = rank.iter().cloned().fold(0.0f64, f64::max);
        if max <= 0.0 {
            return SignalMap::new();
        }
        let mut signals = SignalMap::new();
        for (i, account) in sample.iter().enumerate() {
            let normalized = rank[i] / max;
            if normalized > INFLUENCE_FLOOR {
                signals.insert((*account).clone(), Signal::NetworkInfluence { normalized });
            }
        }
        signals
    }
}

// ============================================================================
// Round Trips
// ============================================================================

/// Funds leaving to a counterparty and returning within 48 hours.
#[derive(Debug)]
pub struct RoundTripScan {
    metadata: DetectorMetadata,
}

impl RoundTripScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("network/round-trip", "round_trip")
                .with_description("Out-and-back transfers inside 48 hours"),
        }
    }
}

impl Default for RoundTripScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for RoundTripScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let mut signals = SignalMap::new();
        for account in graph.accounts() {
            if graph.outgoing(account).is_empty() || graph.incoming(account).is_empty() {
                continue;
            }
            let outgoing = graph.outgoing_sorted(account);
            let incoming = graph.incoming_sorted(account);

            let mut used: HashSet<usize> = HashSet::new();
            let mut count = 0usize;
            'origin: for out_tx in &outgoing {
                for (i, in_tx) in incoming.iter().enumerate() {
                    if used.contains(&i) || in_tx.sender_id != out_tx.receiver_id {
                        continue;
                    }
                    // The outbound leg must precede the return.
                    if in_tx.timestamp_ms < out_tx.timestamp_ms
                        || in_tx.timestamp_ms > out_tx.timestamp_ms + ROUND_TRIP_WINDOW_MS
                    {
                        continue;
                    }
                    used.insert(i);
                    count += 1;
                    if count >= ROUND_TRIP_CAP {
                        break 'origin;
                    }
                    break;
                }
            }
            if count >= ROUND_TRIP_MIN {
                signals.insert(account.clone(), Signal::RoundTrip { count });
            }
        }
        signals
    }
}

// ============================================================================
// Layering Depth
// ============================================================================

/// Depth of downstream forwarding from each origin, bounded BFS.
#[derive(Debug)]
pub struct LayeringScan {
    metadata: DetectorMetadata,
}

impl LayeringScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("network/layering", "layering")
                .with_description("Downstream forwarding depth of 4+ levels"),
        }
    }
}

impl Default for LayeringScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for LayeringScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let mut signals = SignalMap::new();
        for account in graph.accounts() {
            if graph.outgoing(account).is_empty() {
                continue;
            }
            let mut visited: HashSet<&str> = HashSet::new();
            visited.insert(account.as_str());
            let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
            queue.push_back((account.as_str(), 0));

            let mut max_depth = 0usize;
            let mut reach = 0usize;
            'bfs: while let Some((current, depth)) = queue.pop_front() {
                if depth == LAYERING_MAX_DEPTH {
                    continue;
                }
                for tx in graph.outgoing(current) {
                    let next = tx.receiver_id.as_str();
                    if !visited.insert(next) {
                        continue;
                    }
                    reach += 1;
                    max_depth = max_depth.max(depth + 1);
                    if reach >= LAYERING_REACH_CAP {
                        break 'bfs;
                    }
                    queue.push_back((next, depth + 1));
                }
            }

            if max_depth >= LAYERING_MIN_DEPTH {
                signals.insert(account.clone(), Signal::Layering { max_depth, reach });
            }
        }
        signals
    }
}

// ============================================================================
// Counterparty Diversity
// ============================================================================

/// Accounts recycling a tiny set of counterparties.
#[derive(Debug)]
pub struct DiversityScan {
    metadata: DetectorMetadata,
}

impl DiversityScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("network/diversity", "low_diversity")
                .with_description("Unique counterparties below 30% of activity"),
        }
    }
}

impl Default for DiversityScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for DiversityScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let mut signals = SignalMap::new();
        for account in graph.accounts() {
            let total = graph.degree(account);
            if total < DIVERSITY_MIN_DEGREE {
                continue;
            }
            let unique = graph.unique_counterparties(account).len();
            let ratio = unique as f64 / total as f64;
            if ratio >= DIVERSITY_FLOOR {
                continue;
            }
            let top = graph
                .counterparty_counts(account)
                .values()
                .copied()
                .max()
                .unwrap_or(0);
            signals.insert(
                account.clone(),
                Signal::LowDiversity {
                    ratio,
                    top_concentration: top as f64 / total as f64,
                },
            );
        }
        signals
    }
}

// ============================================================================
// Money Laundering Chains
// ============================================================================

/// Deep simple-path enumeration; opt-in because path enumeration is the
/// most expensive scan.
#[derive(Debug)]
pub struct LaunderingChainScan {
    metadata: DetectorMetadata,
    enabled: bool,
}

impl LaunderingChainScan {
    /// Create the scan; a disabled scan fires for no account.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            metadata: DetectorMetadata::new("network/laundering-chains", "money_laundering_chain")
                .with_description("Simple forwarding paths of 5+ accounts"),
            enabled,
        }
    }
}

impl PatternDetector for LaunderingChainScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let mut signals = SignalMap::new();
        if !self.enabled {
            return signals;
        }
        for account in graph.accounts() {
            if graph.outgoing(account).is_empty() {
                continue;
            }
            // Iterative DFS over simple paths, depth-bounded.
            let mut stack: Vec<(String, usize)> = vec![(account.clone(), 0)];
            let mut on_path: HashSet<String> = HashSet::new();
            on_path.insert(account.clone());

            let mut chains_found = 0usize;
            let mut longest = 0usize;
            let mut steps = 0usize;
            while let Some(frame) = stack.last_mut() {
                let current = frame.0.clone();
                let edges = graph.outgoing(&current);
                if frame.1 >= edges.len() {
                    stack.pop();
                    on_path.remove(&current);
                    continue;
                }
                steps += 1;
                if steps > CHAIN_STEP_BUDGET {
                    break;
                }
                let next = edges[frame.1].receiver_id.clone();
                frame.1 += 1;
                if on_path.contains(&next) || stack.len() >= CHAIN_MAX_DEPTH {
                    continue;
                }
                on_path.insert(next.clone());
                stack.push((next, 0));
                let length = stack.len();
                if length >= CHAIN_RECORD_MIN {
                    chains_found += 1;
                    longest = longest.max(length);
                }
            }

            if chains_found > 0 {
                signals.insert(
                    account.clone(),
                    Signal::LaunderingChain {
                        longest,
                        chains_found,
                    },
                );
            }
        }
        signals
    }
}

// ============================================================================
// Wash Trading
// ============================================================================

/// Near-equal bidirectional transfers with the same counterparty.
#[derive(Debug)]
pub struct WashTradingScan {
    metadata: DetectorMetadata,
}

impl WashTradingScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("network/wash-trading", "wash_trading")
                .with_description("Matched bidirectional transfers within 10% and 48 hours"),
        }
    }
}

impl Default for WashTradingScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for WashTradingScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let mut signals = SignalMap::new();
        for account in graph.accounts() {
            if graph.outgoing(account).is_empty() || graph.incoming(account).is_empty() {
                continue;
            }
            let outgoing = graph.outgoing_sorted(account);
            let incoming = graph.incoming_sorted(account);

            let mut used: HashSet<usize> = HashSet::new();
            let mut matches = 0usize;
            'outer: for out_tx in &outgoing {
                for (i, in_tx) in incoming.iter().enumerate() {
                    if used.contains(&i) || in_tx.sender_id != out_tx.receiver_id {
                        continue;
                    }
                    if (in_tx.amount - out_tx.amount).abs() > WASH_TOLERANCE * out_tx.amount {
                        continue;
                    }
                    if (in_tx.timestamp_ms - out_tx.timestamp_ms).abs() > WASH_WINDOW_MS {
                        continue;
                    }
                    used.insert(i);
                    matches += 1;
                    if matches >= WASH_CAP {
                        break 'outer;
                    }
                    break;
                }
            }
            if matches >= WASH_MIN {
                signals.insert(account.clone(), Signal::WashTrading { matches });
            }
        }
        signals
    }
}
