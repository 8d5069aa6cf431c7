//! Undirected weighted projection of the transaction graph.

use crate::graph::TransactionGraph;
use std::collections::HashMap;

/// Undirected weighted view used by community detection.
///
/// One edge per unordered account pair with at least one transaction in
/// either direction. The weight is `k * c` where `k` is the transaction
/// count on the pair and `c` is 2 when the pair's amounts are tightly
/// consistent (sample variance below 20% of the mean), else 1. Self-loops
/// carry no community evidence and are skipped.
#[derive(Debug)]
pub struct WeightedProjection {
    /// Node ids, sorted ascending; indices are stable for one analysis.
    pub nodes: Vec<String>,
    /// Adjacency: `adjacency[i]` lists `(neighbor index, weight)`.
    pub adjacency: Vec<Vec<(usize, f64)>>,
}

impl WeightedProjection {
    /// Build the projection from the directed multigraph.
    #[must_use]
    pub fn build(graph: &TransactionGraph) -> Self {
        let nodes: Vec<String> = graph.accounts().to_vec();
        let index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, a)| (a.as_str(), i))
            .collect();

        // Amounts per unordered pair, both directions pooled.
        let mut pair_amounts: HashMap<(usize, usize), Vec<f64>> = HashMap::new();
        for tx in graph.transactions_ordered() {
            if tx.is_self_loop() {
                continue;
            }
            let a = index[tx.sender_id.as_str()];
            let b = index[tx.receiver_id.as_str()];
            let key = (a.min(b), a.max(b));
            pair_amounts.entry(key).or_default().push(tx.amount);
        }

        let mut adjacency = vec![Vec::new(); nodes.len()];
        for ((a, b), amounts) in pair_amounts {
            let weight = amounts.len() as f64 * consistency_factor(&amounts);
            adjacency[a].push((b, weight));
            adjacency[b].push((a, weight));
        }
        for neighbors in &mut adjacency {
            neighbors.sort_unstable_by(|x, y| x.0.cmp(&y.0));
        }

        Self { nodes, adjacency }
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Weighted neighbors of a node.
    #[must_use]
    pub fn neighbors(&self, node: usize) -> &[(usize, f64)] {
        &self.adjacency[node]
    }
}

/// 2.0 when the pair's amounts are consistent, else 1.0.
fn consistency_factor(amounts: &[f64]) -> f64 {
    if amounts.len() < 2 {
        return 2.0;
    }
    let n = amounts.len() as f64;
    let mean = amounts.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return 1.0;
    }
    let sample_var = amounts.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / (n - 1.0);
    if sample_var < 0.2 * mean {
        2.0
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraudlens_core::Transaction;

    fn tx(id: &str, from: &str, to: &str, amount: f64, ts: i64) -> Transaction {
        Transaction::new(id, from, to, amount, ts)
    }

    #[test]
    fn test_pair_pools_both_directions() {
        let graph = TransactionGraph::from_transactions(&[
            tx("t1", "A", "B", 100.0, 0),
            tx("t2", "B", "A", 100.0, 1),
            tx("t3", "A", "B", 100.0, 2),
        ]);
        let projection = WeightedProjection::build(&graph);
        // k = 3, identical amounts so c = 2.
        let a = projection.nodes.iter().position(|n| n == "A").unwrap();
        let b = projection.nodes.iter().position(|n| n == "B").unwrap();
        assert_eq!(projection.neighbors(a), &[(b, 6.0)]);
        assert_eq!(projection.neighbors(b), &[(a, 6.0)]);
    }

    #[test]
    fn test_inconsistent_amounts_single_weight() {
        let graph = TransactionGraph::from_transactions(&[
            tx("t1", "A", "B", 10.0, 0),
            tx("t2", "A", "B", 5000.0, 1),
        ]);
        let projection = WeightedProjection::build(&graph);
        let a = projection.nodes.iter().position(|n| n == "A").unwrap();
        // High variance relative to the mean: c = 1, weight = k = 2.
        assert_eq!(projection.neighbors(a)[0].1, 2.0);
    }

    #[test]
    fn test_self_loops_skipped() {
        let graph = TransactionGraph::from_transactions(&[tx("t1", "A", "A", 10.0, 0)]);
        let projection = WeightedProjection::build(&graph);
        let a = projection.nodes.iter().position(|n| n == "A").unwrap();
        assert!(projection.neighbors(a).is_empty());
    }
}
