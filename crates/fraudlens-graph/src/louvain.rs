//! Simplified Louvain community detection and smurfing analysis.

use crate::graph::TransactionGraph;
use crate::projection::WeightedProjection;
use fraudlens_core::Transaction;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Maximum local-move sweeps before the partition is accepted as-is.
const MAX_SWEEPS: usize = 10;
/// Communities outside this size band carry no smurfing evidence.
const MIN_COMMUNITY_SIZE: usize = 3;
const MAX_COMMUNITY_SIZE: usize = 100;
/// Minimum smurfing score for a community to be retained.
const SCORE_FLOOR: f64 = 0.25;

/// Smurfing classification of a retained community, by precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmurfingClass {
    /// Near-identical amounts throughout the community.
    StructuredSmurfing,
    /// Tightly time-clustered internal activity.
    CoordinatedBurstSmurfing,
    /// One dominant collector in a dense community.
    SingleBeneficiarySmurfing,
    /// Several collectors in a dense community.
    MultiBeneficiaryRing,
    /// Diffuse coordinated network.
    DistributedSmurfingNetwork,
}

impl SmurfingClass {
    /// Stable uppercase string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SmurfingClass::StructuredSmurfing => "STRUCTURED_SMURFING",
            SmurfingClass::CoordinatedBurstSmurfing => "COORDINATED_BURST_SMURFING",
            SmurfingClass::SingleBeneficiarySmurfing => "SINGLE_BENEFICIARY_SMURFING",
            SmurfingClass::MultiBeneficiaryRing => "MULTI_BENEFICIARY_RING",
            SmurfingClass::DistributedSmurfingNetwork => "DISTRIBUTED_SMURFING_NETWORK",
        }
    }
}

/// Analysis record of one retained community.
#[derive(Debug, Clone)]
pub struct CommunityAnalysis {
    /// Member account ids, sorted ascending.
    pub members: Vec<String>,
    /// Internal directed transaction count over `size * (size - 1)`.
    pub density: f64,
    /// Members whose internal in-degree exceeds twice the community mean.
    pub central_beneficiaries: Vec<String>,
    /// `1 - min(var / mean, 1)` over internal amounts, 0 when the mean is 0.
    pub amount_consistency: f64,
    /// `1 - stddev / mean` over internal inter-arrival gaps, clamped to `[0, 1]`.
    pub temporal_clustering: f64,
    /// Total internal transaction volume.
    pub internal_volume: f64,
    /// Weighted smurfing score in `[0, 1]`.
    pub smurfing_score: f64,
    /// Pattern classification.
    pub classification: SmurfingClass,
}

impl CommunityAnalysis {
    /// True when the account is a central beneficiary of this community.
    #[must_use]
    pub fn is_central(&self, account: &str) -> bool {
        self.central_beneficiaries.iter().any(|c| c == account)
    }

    /// True when the account belongs to this community.
    #[must_use]
    pub fn contains(&self, account: &str) -> bool {
        self.members.binary_search_by(|m| m.as_str().cmp(account)).is_ok()
    }
}

/// Simplified Louvain detector over the weighted undirected projection.
///
/// Each node starts in its own community; local moves chase the largest
/// positive gain `w(node -> target) - 0.5 * w(node -> own)` until a full
/// sweep makes no move or the sweep budget runs out. Nodes are visited in
/// sorted-account order and ties break toward the smallest community id,
/// which keeps the partition reproducible.
#[derive(Debug, Clone, Copy)]
pub struct LouvainCommunities;

impl LouvainCommunities {
    /// Partition the graph and return retained smurfing candidates,
    /// ordered by their smallest member id.
    #[must_use]
    pub fn detect(graph: &TransactionGraph) -> Vec<CommunityAnalysis> {
        let projection = WeightedProjection::build(graph);
        let assignment = Self::partition(&projection);

        let mut by_community: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (node, &community) in assignment.iter().enumerate() {
            by_community.entry(community).or_default().push(node);
        }

        let mut retained: Vec<CommunityAnalysis> = by_community
            .into_values()
            .filter(|members| {
                (MIN_COMMUNITY_SIZE..=MAX_COMMUNITY_SIZE).contains(&members.len())
            })
            .filter_map(|members| {
                let ids: Vec<String> = members
                    .iter()
                    .map(|&i| projection.nodes[i].clone())
                    .collect();
                Self::analyze(graph, ids)
            })
            .filter(|analysis| analysis.smurfing_score > SCORE_FLOOR)
            .collect();

        retained.sort_by(|a, b| a.members[0].cmp(&b.members[0]));
        tracing::debug!(communities = retained.len(), "louvain analysis complete");
        retained
    }

    /// Local-move sweeps; returns the community id per node index.
    fn partition(projection: &WeightedProjection) -> Vec<usize> {
        let n = projection.node_count();
        let mut community: Vec<usize> = (0..n).collect();

        for sweep in 0..MAX_SWEEPS {
            let mut moved = 0usize;
            for node in 0..n {
                let own = community[node];
                // Edge weight from this node into each neighbor community.
                let mut weights: BTreeMap<usize, f64> = BTreeMap::new();
                for &(neighbor, weight) in projection.neighbors(node) {
                    *weights.entry(community[neighbor]).or_default() += weight;
                }
                let to_own = weights.get(&own).copied().unwrap_or(0.0);

                let mut best: Option<(usize, f64)> = None;
                for (&target, &to_target) in &weights {
                    if target == own {
                        continue;
                    }
                    let gain = to_target - 0.5 * to_own;
                    // Strict improvement; BTreeMap order resolves ties
                    // toward the smallest community id.
                    if gain > 0.0 && best.map_or(true, |(_, g)| gain > g) {
                        best = Some((target, gain));
                    }
                }
                if let Some((target, _)) = best {
                    community[node] = target;
                    moved += 1;
                }
            }
            tracing::trace!(sweep, moved, "louvain sweep");
            if moved == 0 {
                break;
            }
        }
        community
    }

    /// Compute the analysis record for one size-qualified community.
    fn analyze(graph: &TransactionGraph, members: Vec<String>) -> Option<CommunityAnalysis> {
        let size = members.len();
        let member_set: HashSet<&str> = members.iter().map(String::as_str).collect();

        // Internal directed transactions, self-loops excluded.
        let mut internal: Vec<Arc<Transaction>> = Vec::new();
        for member in &members {
            for tx in graph.outgoing(member) {
                if !tx.is_self_loop() && member_set.contains(tx.receiver_id.as_str()) {
                    internal.push(Arc::clone(tx));
                }
            }
        }
        if internal.is_empty() {
            return None;
        }

        let density = internal.len() as f64 / (size * (size - 1)) as f64;
        let internal_volume: f64 = internal.iter().map(|tx| tx.amount).sum();

        // Central beneficiaries: internal in-degree above twice the mean.
        let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
        for tx in &internal {
            *in_degree.entry(tx.receiver_id.as_str()).or_default() += 1;
        }
        let mean_in_degree = internal.len() as f64 / size as f64;
        let central_beneficiaries: Vec<String> = in_degree
            .iter()
            .filter(|(_, &count)| count as f64 > 2.0 * mean_in_degree)
            .map(|(&account, _)| account.to_string())
            .collect();

        let amount_consistency = amount_consistency(&internal);
        let temporal_clustering = temporal_clustering(&internal);

        let smurfing_score = 0.25 * (1.5 * density).min(1.0)
            + 0.25 * (central_beneficiaries.len() as f64 / 2.0).min(1.0)
            + 0.30 * amount_consistency
            + 0.20 * temporal_clustering;

        let classification = classify(
            amount_consistency,
            temporal_clustering,
            central_beneficiaries.len(),
            density,
        );

        Some(CommunityAnalysis {
            members,
            density,
            central_beneficiaries,
            amount_consistency,
            temporal_clustering,
            internal_volume,
            smurfing_score,
            classification,
        })
    }
}

/// `1 - min(var / mean, 1)` over internal amounts; 0 when the mean is 0.
fn amount_consistency(internal: &[Arc<Transaction>]) -> f64 {
    let n = internal.len() as f64;
    let mean = internal.iter().map(|tx| tx.amount).sum::<f64>() / n;
    if mean <= 0.0 {
        return 0.0;
    }
    let var = internal
        .iter()
        .map(|tx| (tx.amount - mean).powi(2))
        .sum::<f64>()
        / n;
    1.0 - (var / mean).min(1.0)
}

/// `max(0, min(1, 1 - stddev / mean))` over sorted inter-arrival gaps.
/// A single event, or events at one instant, count as perfectly clustered.
fn temporal_clustering(internal: &[Arc<Transaction>]) -> f64 {
    let mut timestamps: Vec<i64> = internal.iter().map(|tx| tx.timestamp_ms).collect();
    timestamps.sort_unstable();
    if timestamps.len() < 2 {
        return 1.0;
    }
    let gaps: Vec<f64> = timestamps
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) as f64)
        .collect();
    let mean = gaps.iter().sum::<f64>() / gaps.len() as f64;
    if mean == 0.0 {
        return 1.0;
    }
    let var = gaps.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / gaps.len() as f64;
    (1.0 - var.sqrt() / mean).clamp(0.0, 1.0)
}

/// Classification precedence over the community metrics.
fn classify(consistency: f64, clustering: f64, centrals: usize, density: f64) -> SmurfingClass {
    if consistency > 0.85 {
        SmurfingClass::StructuredSmurfing
    } else if clustering > 0.7 {
        SmurfingClass::CoordinatedBurstSmurfing
    } else if centrals == 1 && density > 0.2 {
        SmurfingClass::SingleBeneficiarySmurfing
    } else if centrals >= 2 && density > 0.3 {
        SmurfingClass::MultiBeneficiaryRing
    } else {
        SmurfingClass::DistributedSmurfingNetwork
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR_MS: i64 = 3_600_000;

    /// Eight senders each paying the collector twice within six hours.
    fn smurfing_batch() -> Vec<Transaction> {
        let mut txs = Vec::new();
        for sender in 0..8 {
            for round in 0..2 {
                txs.push(Transaction::new(
                    format!("t{sender}-{round}"),
                    format!("S{sender:02}"),
                    "R00",
                    9_800.0,
                    (sender as i64 * 2 + round) * 20 * 60 * 1000,
                ));
            }
        }
        txs
    }

    #[test]
    fn test_smurfing_community_detected() {
        let graph = TransactionGraph::from_transactions(&smurfing_batch());
        let communities = LouvainCommunities::detect(&graph);
        assert_eq!(communities.len(), 1);

        let community = &communities[0];
        assert_eq!(community.members.len(), 9);
        assert_eq!(community.central_beneficiaries, vec!["R00".to_string()]);
        // 16 internal transactions over 9 * 8 ordered pairs.
        assert!((community.density - 16.0 / 72.0).abs() < 1e-9);
        assert!(community.density > 0.2);
        assert!(community.amount_consistency > 0.85);
        assert!(community.smurfing_score > 0.25);
        assert_eq!(
            community.classification,
            SmurfingClass::StructuredSmurfing
        );
        assert!(community.is_central("R00"));
        assert!(!community.is_central("S00"));
        assert!(community.contains("S05"));
    }

    #[test]
    fn test_small_components_ignored() {
        // A single pair never reaches the minimum community size.
        let graph = TransactionGraph::from_transactions(&[
            Transaction::new("t1", "A", "B", 100.0, 0),
            Transaction::new("t2", "A", "B", 100.0, HOUR_MS),
        ]);
        assert!(LouvainCommunities::detect(&graph).is_empty());
    }

    #[test]
    fn test_disconnected_nodes_stay_apart() {
        // Two unrelated pairs must not merge into one community.
        let graph = TransactionGraph::from_transactions(&[
            Transaction::new("t1", "A", "B", 100.0, 0),
            Transaction::new("t2", "C", "D", 100.0, 0),
        ]);
        let projection = WeightedProjection::build(&graph);
        let assignment = LouvainCommunities::partition(&projection);
        let a = projection.nodes.iter().position(|n| n == "A").unwrap();
        let c = projection.nodes.iter().position(|n| n == "C").unwrap();
        assert_ne!(assignment[a], assignment[c]);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let graph = TransactionGraph::from_transactions(&smurfing_batch());
        let first = LouvainCommunities::detect(&graph);
        let second = LouvainCommunities::detect(&graph);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.members, b.members);
            assert_eq!(a.smurfing_score, b.smurfing_score);
        }
    }

    #[test]
    fn test_classification_precedence() {
        assert_eq!(
            classify(0.9, 0.9, 1, 0.5),
            SmurfingClass::StructuredSmurfing
        );
        assert_eq!(
            classify(0.5, 0.8, 1, 0.5),
            SmurfingClass::CoordinatedBurstSmurfing
        );
        assert_eq!(
            classify(0.5, 0.5, 1, 0.25),
            SmurfingClass::SingleBeneficiarySmurfing
        );
        assert_eq!(
            classify(0.5, 0.5, 2, 0.35),
            SmurfingClass::MultiBeneficiaryRing
        );
        assert_eq!(
            classify(0.5, 0.5, 0, 0.1),
            SmurfingClass::DistributedSmurfingNetwork
        );
    }
}
