//! Fraud ring assembly: connected components over the suspicious
//! subgraph, merged with Louvain community evidence.

use crate::scoring::ScoredAccount;
use fraudlens_core::{FraudRing, RingPatternType};
use fraudlens_graph::{CommunityAnalysis, TransactionGraph};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Louvain ring merge threshold: overlap over the smaller member set.
const MERGE_OVERLAP: f64 = 0.7;
/// Mean member degree at or below which a ring reads as a shell chain.
const SHELL_CHAIN_DEGREE: f64 = 3.0;
/// Mean member degree above which a ring reads as smurfing.
const SMURFING_DEGREE: f64 = 20.0;

struct RingDraft {
    members: BTreeSet<String>,
    /// Louvain metadata when community evidence contributed.
    louvain: Option<LouvainEvidence>,
    /// True when the ring exists only because of a Louvain community.
    louvain_origin: bool,
}

struct LouvainEvidence {
    density: f64,
    central_beneficiaries: Vec<String>,
}

/// Assembles rings from connectivity among suspicious accounts, then
/// folds in Louvain communities: a community merges into a ring sharing
/// more than 70% of the smaller member set, otherwise it becomes a ring
/// of its own with `detection_method = "louvain"`.
#[derive(Debug, Clone, Copy)]
pub struct RingAssembler;

impl RingAssembler {
    /// Assemble and score the rings. `scored` must be in account-id order.
    #[must_use]
    pub fn assemble(
        graph: &TransactionGraph,
        scored: &[ScoredAccount],
        communities: &[CommunityAnalysis],
    ) -> Vec<FraudRing> {
        let scores: HashMap<&str, f64> = scored
            .iter()
            .map(|account| (account.account_id.as_str(), account.score))
            .collect();
        let suspicious: Vec<&str> = scored
            .iter()
            .filter(|account| account.is_suspicious)
            .map(|account| account.account_id.as_str())
            .collect();
        let suspicious_set: HashSet<&str> = suspicious.iter().copied().collect();

        // Connected components over the symmetrized suspicious subgraph,
        // visited in id order so ring ids are reproducible.
        let mut drafts: Vec<RingDraft> = Vec::new();
        let mut assigned: HashSet<&str> = HashSet::new();
        for &start in &suspicious {
            if assigned.contains(start) {
                continue;
            }
            let mut members = BTreeSet::new();
            let mut queue = VecDeque::from([start]);
            assigned.insert(start);
            while let Some(current) = queue.pop_front() {
                members.insert(current.to_string());
                for neighbor in graph.unique_counterparties(current) {
                    if suspicious_set.contains(neighbor) && assigned.insert(neighbor) {
                        queue.push_back(neighbor);
                    }
                }
            }
            // A lone suspicious account is not a ring.
            if members.len() >= 2 {
                drafts.push(RingDraft {
                    members,
                    louvain: None,
                    louvain_origin: false,
                });
            }
        }

        for community in communities {
            let candidate: BTreeSet<String> = community.members.iter().cloned().collect();
            let evidence = LouvainEvidence {
                density: community.density,
                central_beneficiaries: community.central_beneficiaries.clone(),
            };
            match drafts
                .iter_mut()
                .find(|draft| overlap_ratio(&draft.members, &candidate) > MERGE_OVERLAP)
            {
                Some(draft) => {
                    draft.members.extend(candidate);
                    draft.louvain = Some(evidence);
                }
                None => drafts.push(RingDraft {
                    members: candidate,
                    louvain: Some(evidence),
                    louvain_origin: true,
                }),
            }
        }

        drafts
            .into_iter()
            .enumerate()
            .map(|(i, draft)| build_ring(graph, &scores, i, draft))
            .collect()
    }
}

fn overlap_ratio(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let smaller = a.len().min(b.len());
    if smaller == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / smaller as f64
}

fn build_ring(
    graph: &TransactionGraph,
    scores: &HashMap<&str, f64>,
    index: usize,
    draft: RingDraft,
) -> FraudRing {
    let members: Vec<String> = draft.members.into_iter().collect();
    let size = members.len();

    let mean_degree = members
        .iter()
        .map(|m| graph.degree(m) as f64)
        .sum::<f64>()
        / size as f64;
    let pattern_type = if draft.louvain_origin {
        RingPatternType::Smurfing
    } else if size == 3 {
        RingPatternType::Cycle
    } else if mean_degree <= SHELL_CHAIN_DEGREE {
        RingPatternType::ShellChain
    } else if mean_degree > SMURFING_DEGREE {
        RingPatternType::Smurfing
    } else {
        RingPatternType::Hybrid
    };

    let member_scores: Vec<f64> = members
        .iter()
        .map(|m| scores.get(m.as_str()).copied().unwrap_or(0.0))
        .collect();
    let max_score = member_scores.iter().cloned().fold(0.0f64, f64::max);
    let avg_score = member_scores.iter().sum::<f64>() / size as f64;
    let size_multiplier = 1.0 + 0.1 * size.saturating_sub(2).min(8) as f64;
    let risk_score = ((0.6 * max_score + 0.4 * avg_score) * size_multiplier).clamp(0.0, 100.0);
    let risk_score = (risk_score * 10.0).round() / 10.0;

    let (detection_method, density, central_beneficiaries) = match draft.louvain {
        Some(evidence) => (
            draft.louvain_origin.then(|| "louvain".to_string()),
            Some(evidence.density),
            Some(evidence.central_beneficiaries),
        ),
        None => (None, None, None),
    };

    FraudRing {
        ring_id: format!("RING-{:03}", index + 1),
        member_accounts: members,
        pattern_type,
        risk_score,
        detection_method,
        density,
        central_beneficiaries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraudlens_core::Transaction;
    use fraudlens_graph::LouvainCommunities;

    fn scored(id: &str, score: f64, suspicious: bool) -> ScoredAccount {
        ScoredAccount {
            account_id: id.to_string(),
            score,
            patterns: Vec::new(),
            is_suspicious: suspicious,
            cycle_member: false,
        }
    }

    fn cycle_graph() -> TransactionGraph {
        TransactionGraph::from_transactions(&[
            Transaction::new("t1", "A", "B", 1_000.0, 0),
            Transaction::new("t2", "B", "C", 1_000.0, 3_600_000),
            Transaction::new("t3", "C", "A", 1_000.0, 7_200_000),
        ])
    }

    #[test]
    fn test_component_becomes_cycle_ring() {
        let graph = cycle_graph();
        let scored = vec![
            scored("A", 80.0, true),
            scored("B", 75.0, true),
            scored("C", 70.0, true),
        ];
        let rings = RingAssembler::assemble(&graph, &scored, &[]);
        assert_eq!(rings.len(), 1);

        let ring = &rings[0];
        assert_eq!(ring.ring_id, "RING-001");
        assert_eq!(ring.member_accounts, vec!["A", "B", "C"]);
        assert_eq!(ring.pattern_type, RingPatternType::Cycle);
        assert!(ring.detection_method.is_none());
        // (0.6 * 80 + 0.4 * 75) * 1.1 = 85.8
        assert_eq!(ring.risk_score, 85.8);
    }

    #[test]
    fn test_singletons_form_no_ring() {
        let graph = cycle_graph();
        let scored = vec![
            scored("A", 85.0, true),
            scored("B", 10.0, false),
            scored("C", 10.0, false),
        ];
        assert!(RingAssembler::assemble(&graph, &scored, &[]).is_empty());
    }

    #[test]
    fn test_disjoint_components_get_sequential_ids() {
        let graph = TransactionGraph::from_transactions(&[
            Transaction::new("t1", "A", "B", 1_000.0, 0),
            Transaction::new("t2", "X", "Y", 1_000.0, 0),
        ]);
        let scored = vec![
            scored("A", 90.0, true),
            scored("B", 85.0, true),
            scored("X", 82.0, true),
            scored("Y", 81.0, true),
        ];
        let rings = RingAssembler::assemble(&graph, &scored, &[]);
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0].ring_id, "RING-001");
        assert_eq!(rings[0].member_accounts, vec!["A", "B"]);
        assert_eq!(rings[1].ring_id, "RING-002");
        assert_eq!(rings[1].member_accounts, vec!["X", "Y"]);
    }

    #[test]
    fn test_louvain_ring_added_when_no_overlap() {
        // Smurfing batch: no account is suspicious, so the community
        // surfaces as its own louvain ring.
        let mut txs = Vec::new();
        for sender in 0..8 {
            for round in 0..2 {
                txs.push(Transaction::new(
                    format!("t{sender}-{round}"),
                    format!("S{sender:02}"),
                    "R00",
                    9_800.0,
                    (sender * 2 + round) as i64 * 1_200_000,
                ));
            }
        }
        let graph = TransactionGraph::from_transactions(&txs);
        let communities = LouvainCommunities::detect(&graph);
        assert_eq!(communities.len(), 1);

        let scored: Vec<ScoredAccount> = graph
            .accounts()
            .iter()
            .map(|a| scored(a, 40.0, false))
            .collect();
        let rings = RingAssembler::assemble(&graph, &scored, &communities);
        assert_eq!(rings.len(), 1);

        let ring = &rings[0];
        assert_eq!(ring.detection_method.as_deref(), Some("louvain"));
        assert_eq!(ring.pattern_type, RingPatternType::Smurfing);
        assert_eq!(ring.member_accounts.len(), 9);
        assert_eq!(
            ring.central_beneficiaries.as_deref(),
            Some(&["R00".to_string()][..])
        );
    }

    #[test]
    fn test_louvain_merges_into_overlapping_ring() {
        // Dense suspicious component that Louvain also finds: one ring.
        let mut txs = Vec::new();
        let mut n = 0;
        for a in ["A", "B", "C", "D"] {
            for b in ["A", "B", "C", "D"] {
                if a != b {
                    txs.push(Transaction::new(
                        format!("t{n}"),
                        a,
                        b,
                        1_000.0,
                        n * 600_000,
                    ));
                    n += 1;
                }
            }
        }
        let graph = TransactionGraph::from_transactions(&txs);
        let communities = LouvainCommunities::detect(&graph);

        let scored: Vec<ScoredAccount> = graph
            .accounts()
            .iter()
            .map(|a| scored(a, 85.0, true))
            .collect();
        let rings = RingAssembler::assemble(&graph, &scored, &communities);
        assert_eq!(rings.len(), 1);
        if !communities.is_empty() {
            assert!(rings[0].density.is_some());
            assert!(rings[0].detection_method.is_none());
        }
    }

    #[test]
    fn test_shell_chain_classification() {
        let graph = TransactionGraph::from_transactions(&[
            Transaction::new("t1", "A", "B", 1_000.0, 0),
            Transaction::new("t2", "B", "C", 1_000.0, 1),
            Transaction::new("t3", "C", "D", 1_000.0, 2),
            Transaction::new("t4", "D", "E", 1_000.0, 3),
        ]);
        let scored: Vec<ScoredAccount> = graph
            .accounts()
            .iter()
            .map(|a| scored(a, 75.0, true))
            .collect();
        let rings = RingAssembler::assemble(&graph, &scored, &[]);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].pattern_type, RingPatternType::ShellChain);
    }

    #[test]
    fn test_size_multiplier_saturates() {
        // Twelve-member star: multiplier caps at 1.8.
        let txs: Vec<Transaction> = (0..11)
            .map(|i| {
                Transaction::new(format!("t{i}"), format!("N{i:02}"), "HUB", 100.0, i as i64)
            })
            .collect();
        let graph = TransactionGraph::from_transactions(&txs);
        let scored: Vec<ScoredAccount> = graph
            .accounts()
            .iter()
            .map(|a| scored(a, 50.0, true))
            .collect();
        let rings = RingAssembler::assemble(&graph, &scored, &[]);
        assert_eq!(rings.len(), 1);
        // (0.6 * 50 + 0.4 * 50) * 1.8 = 90
        assert_eq!(rings[0].risk_score, 90.0);
    }
}
