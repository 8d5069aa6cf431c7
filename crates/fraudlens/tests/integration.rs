//! End-to-end scenarios over the full analysis pipeline.

use fraudlens::prelude::*;
use fraudlens::catalog;

const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 24 * HOUR_MS;
/// 2024-01-01 00:00:00 UTC, a Monday.
const MONDAY_MS: i64 = 1_704_067_200_000;

fn tx(id: &str, from: &str, to: &str, amount: f64, ts_ms: i64) -> Transaction {
    Transaction::new(id, from, to, amount, ts_ms)
}

fn analyze(txs: &[Transaction]) -> FraudReport {
    FraudAnalyzer::new().analyze(txs).expect("analysis succeeds")
}

// ============================================================================
// Scenario: three-account cycle
// ============================================================================

fn cycle_batch() -> Vec<Transaction> {
    vec![
        tx("t1", "A", "B", 1_000.0, MONDAY_MS),
        tx("t2", "B", "C", 1_000.0, MONDAY_MS + HOUR_MS),
        tx("t3", "C", "A", 1_000.0, MONDAY_MS + 2 * HOUR_MS),
    ]
}

#[test]
fn test_three_cycle_detected_and_ringed() {
    let report = analyze(&cycle_batch());

    assert_eq!(report.summary.cycles_detected, 1);
    assert_eq!(report.summary.total_accounts_analyzed, 3);
    assert_eq!(report.suspicious_accounts.len(), 3);

    for account in &report.suspicious_accounts {
        assert_eq!(account.detected_patterns.first().map(String::as_str), Some("cycle"));
        assert!(
            account.suspicion_score >= 35.0,
            "{} scored {}",
            account.account_id,
            account.suspicion_score
        );
    }

    assert_eq!(report.fraud_rings.len(), 1);
    let ring = &report.fraud_rings[0];
    assert_eq!(ring.ring_id, "RING-001");
    assert_eq!(ring.pattern_type, RingPatternType::Cycle);
    assert_eq!(ring.member_accounts, vec!["A", "B", "C"]);
    for account in &report.suspicious_accounts {
        assert_eq!(account.ring_id.as_deref(), Some("RING-001"));
    }
}

// ============================================================================
// Scenario: fan-out without corroboration
// ============================================================================

fn fan_out_batch(receivers: usize) -> Vec<Transaction> {
    (0..receivers)
        .map(|i| {
            tx(
                &format!("t{i}"),
                "S",
                &format!("R{i:02}"),
                1_234.56,
                MONDAY_MS + i as i64 * 3 * HOUR_MS,
            )
        })
        .collect()
}

#[test]
fn test_fan_out_alone_is_not_suspicious() {
    let report = analyze(&fan_out_batch(16));

    // The spray fires fan_out for S, but one pattern plus a low score
    // never crosses the classification ladder.
    assert!(report.suspicious_accounts.is_empty());
    assert!(report.fraud_rings.is_empty());
    assert_eq!(report.summary.cycles_detected, 0);
}

#[test]
fn test_fan_out_boundary_fifteen_vs_fourteen() {
    use fraudlens::detect::flow::FanOutScan;
    use fraudlens::graph::{GraphStats, TransactionGraph};

    let graph = TransactionGraph::from_transactions(&fan_out_batch(15));
    let stats = GraphStats::compute(&graph);
    let signals = FanOutScan::new().scan(&graph, &stats);
    assert!(signals.contains_key("S"));

    let graph = TransactionGraph::from_transactions(&fan_out_batch(14));
    let stats = GraphStats::compute(&graph);
    assert!(FanOutScan::new().scan(&graph, &stats).is_empty());
}

// ============================================================================
// Scenario: threshold avoidance with round numbers
// ============================================================================

#[test]
fn test_threshold_avoidance_with_round_amounts() {
    use fraudlens::detect::amounts::{StructuringScan, ThresholdAvoidanceScan};
    use fraudlens::graph::{GraphStats, TransactionGraph};

    let txs: Vec<Transaction> = (0..10)
        .map(|i| {
            tx(
                &format!("t{i}"),
                "A",
                &format!("B{i}"),
                9_500.0,
                MONDAY_MS + i as i64 * 7 * DAY_MS,
            )
        })
        .collect();
    let graph = TransactionGraph::from_transactions(&txs);
    let stats = GraphStats::compute(&graph);

    match &ThresholdAvoidanceScan::new().scan(&graph, &stats)["A"] {
        Signal::ThresholdAvoidance {
            mean_amount,
            clustering,
        } => {
            assert_eq!(*mean_amount, 9_500.0);
            assert_eq!(*clustering, 1.0);
        }
        other => panic!("unexpected signal {other:?}"),
    }
    // 9500 is a multiple of 500, so structuring corroborates.
    match &StructuringScan::new().scan(&graph, &stats)["A"] {
        Signal::Structuring { round_fraction } => assert_eq!(*round_fraction, 1.0),
        other => panic!("unexpected signal {other:?}"),
    }
}

// ============================================================================
// Scenario: passthrough relay
// ============================================================================

#[test]
fn test_passthrough_relay_pair() {
    use fraudlens::detect::flow::PassthroughScan;
    use fraudlens::graph::{GraphStats, TransactionGraph};

    let txs = vec![
        tx("in", "X", "Y", 500.0, MONDAY_MS + 10 * HOUR_MS),
        tx("out", "Y", "Z", 490.0, MONDAY_MS + 13 * HOUR_MS),
    ];
    let graph = TransactionGraph::from_transactions(&txs);
    let stats = GraphStats::compute(&graph);
    match &PassthroughScan::new().scan(&graph, &stats)["Y"] {
        Signal::Passthrough {
            pair_count,
            min_gap_ms,
        } => {
            assert_eq!(*pair_count, 1);
            assert_eq!(*min_gap_ms, 3 * HOUR_MS);
        }
        other => panic!("unexpected signal {other:?}"),
    }
}

// ============================================================================
// Scenario: Louvain smurfing ring
// ============================================================================

fn smurfing_batch() -> Vec<Transaction> {
    let mut txs = Vec::new();
    for sender in 0..8 {
        for round in 0..2 {
            txs.push(tx(
                &format!("s{sender}-{round}"),
                &format!("S{sender:02}"),
                "R00",
                9_800.0,
                MONDAY_MS + (sender as i64 * 2 + round) * 20 * 60_000,
            ));
        }
    }
    txs
}

#[test]
fn test_smurfing_ring_via_louvain() {
    let report = analyze(&smurfing_batch());

    assert_eq!(report.summary.louvain_smurfing_rings_detected, 1);
    assert_eq!(report.fraud_rings.len(), 1);

    let ring = &report.fraud_rings[0];
    assert_eq!(ring.detection_method.as_deref(), Some("louvain"));
    assert_eq!(ring.pattern_type, RingPatternType::Smurfing);
    assert_eq!(ring.member_accounts.len(), 9);
    assert!(ring.member_accounts.contains(&"R00".to_string()));
    assert_eq!(
        ring.central_beneficiaries.as_deref(),
        Some(&["R00".to_string()][..])
    );
    assert!(ring.density.unwrap() > 0.2);
    assert!(ring.risk_score > 0.0 && ring.risk_score <= 100.0);
}

#[test]
fn test_smurfing_community_classification() {
    use fraudlens::graph::{LouvainCommunities, SmurfingClass, TransactionGraph};

    let graph = TransactionGraph::from_transactions(&smurfing_batch());
    let communities = LouvainCommunities::detect(&graph);
    assert_eq!(communities.len(), 1);
    assert_eq!(
        communities[0].classification,
        SmurfingClass::StructuredSmurfing
    );
    assert!(communities[0].amount_consistency > 0.85);
    assert!(communities[0].smurfing_score > 0.25);
}

// ============================================================================
// Scenario: legitimate merchant stays clean
// ============================================================================

#[test]
fn test_merchant_shielded_by_penalty() {
    let txs: Vec<Transaction> = (0..50)
        .map(|i| {
            tx(
                &format!("t{i}"),
                &format!("CUST{:02}", i % 45),
                "M",
                42.0,
                MONDAY_MS + i as i64 * 90 * 60_000,
            )
        })
        .collect();
    let report = analyze(&txs);

    // fan_in fires for M, but the merchant penalty keeps the score low.
    assert!(report.suspicious_accounts.is_empty());
    assert!(report.fraud_rings.is_empty());
}

// ============================================================================
// Universal invariants
// ============================================================================

fn mixed_batch() -> Vec<Transaction> {
    let mut txs = cycle_batch();
    txs.extend(smurfing_batch());
    txs.extend(fan_out_batch(16));
    // Bridge the cycle and the spray so components can merge.
    txs.push(tx("bridge", "A", "S", 765.43, MONDAY_MS + 5 * HOUR_MS));
    txs
}

#[test]
fn test_report_invariants() {
    let report = analyze(&mixed_batch());
    let summary = &report.summary;

    assert_eq!(
        summary.suspicious_accounts_flagged,
        report.suspicious_accounts.len()
    );
    assert_eq!(summary.fraud_rings_detected, report.fraud_rings.len());
    assert_eq!(summary.patterns_analyzed, catalog::detector_count());
    assert!(summary.processing_time_seconds >= 0.0);

    // Scores in range, ranking sorted, ties by id.
    for pair in report.suspicious_accounts.windows(2) {
        assert!(pair[0].suspicion_score >= pair[1].suspicion_score);
        if pair[0].suspicion_score == pair[1].suspicion_score {
            assert!(pair[0].account_id < pair[1].account_id);
        }
    }
    for account in &report.suspicious_accounts {
        assert!((0.0..=100.0).contains(&account.suspicion_score));
        assert!(!account.detected_patterns.is_empty());
    }

    // Ring ids unique; members sorted, deduplicated, non-empty.
    let mut ring_ids: Vec<&str> = report
        .fraud_rings
        .iter()
        .map(|r| r.ring_id.as_str())
        .collect();
    ring_ids.sort_unstable();
    let before = ring_ids.len();
    ring_ids.dedup();
    assert_eq!(ring_ids.len(), before);
    for ring in &report.fraud_rings {
        assert!(!ring.member_accounts.is_empty());
        let mut sorted = ring.member_accounts.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, ring.member_accounts);
        assert!((0.0..=100.0).contains(&ring.risk_score));
    }

    // Every referenced ring id resolves to exactly one ring.
    for account in &report.suspicious_accounts {
        if let Some(ring_id) = &account.ring_id {
            let hits = report
                .fraud_rings
                .iter()
                .filter(|r| &r.ring_id == ring_id)
                .count();
            assert_eq!(hits, 1, "dangling ring id {ring_id}");
        }
    }
}

#[test]
fn test_pattern_labels_within_vocabulary() {
    let fixed: Vec<String> = catalog::detectors()
        .iter()
        .map(|d| d.label.to_string())
        .collect();
    let report = analyze(&mixed_batch());
    for account in &report.suspicious_accounts {
        for label in &account.detected_patterns {
            let known = fixed.iter().any(|l| l == label)
                || label == "louvain_smurfing_ring"
                || label.starts_with("louvain_");
            assert!(known, "unknown pattern label {label}");
        }
    }
}

#[test]
fn test_reruns_are_identical() {
    let txs = mixed_batch();
    let mut first = analyze(&txs);
    let mut second = analyze(&txs);
    first.summary.processing_time_seconds = 0.0;
    second.summary.processing_time_seconds = 0.0;

    let first_json = serde_json::to_string(&first).unwrap();
    let second_json = serde_json::to_string(&second).unwrap();
    assert_eq!(first_json, second_json);
}

// ============================================================================
// Report shape
// ============================================================================

#[test]
fn test_outbound_report_shape() {
    let report = analyze(&cycle_batch());
    let json = serde_json::to_value(&report).unwrap();

    let root = json.as_object().unwrap();
    assert_eq!(root.len(), 3);
    assert!(root.contains_key("suspicious_accounts"));
    assert!(root.contains_key("fraud_rings"));
    assert!(root.contains_key("summary"));

    let account = &json["suspicious_accounts"][0];
    for key in [
        "account_id",
        "suspicion_score",
        "detected_patterns",
        "ring_id",
    ] {
        assert!(account.get(key).is_some(), "missing account key {key}");
    }

    let ring = &json["fraud_rings"][0];
    for key in ["ring_id", "member_accounts", "pattern_type", "risk_score"] {
        assert!(ring.get(key).is_some(), "missing ring key {key}");
    }
    assert_eq!(ring["pattern_type"], "cycle");

    let summary = json["summary"].as_object().unwrap();
    for key in [
        "total_accounts_analyzed",
        "suspicious_accounts_flagged",
        "fraud_rings_detected",
        "processing_time_seconds",
        "cycles_detected",
        "louvain_smurfing_rings_detected",
        "patterns_analyzed",
    ] {
        assert!(summary.contains_key(key), "missing summary key {key}");
    }

    // Scores carry at most one decimal.
    let score = json["suspicious_accounts"][0]["suspicion_score"]
        .as_f64()
        .unwrap();
    assert_eq!((score * 10.0).round() / 10.0, score);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_deep_chain_analysis_opt_in() {
    // Six-account relay chain: only the deep scan sees it.
    let names = ["C1", "C2", "C3", "C4", "C5", "C6"];
    let txs: Vec<Transaction> = names
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            tx(
                &format!("t{i}"),
                pair[0],
                pair[1],
                777.7,
                MONDAY_MS + i as i64 * HOUR_MS,
            )
        })
        .collect();

    let default_report = analyze(&txs);
    let deep_report = FraudAnalyzer::with_config(
        AnalyzerConfig::new().with_deep_chain_analysis(true),
    )
    .analyze(&txs)
    .unwrap();

    // The constant detector count does not change with the toggle.
    assert_eq!(
        default_report.summary.patterns_analyzed,
        deep_report.summary.patterns_analyzed
    );
}

#[test]
fn test_cycle_cap_bounds_enumeration() {
    let mut txs = cycle_batch();
    txs.extend([
        tx("u1", "X", "Y", 1_000.0, MONDAY_MS),
        tx("u2", "Y", "Z", 1_000.0, MONDAY_MS + HOUR_MS),
        tx("u3", "Z", "X", 1_000.0, MONDAY_MS + 2 * HOUR_MS),
    ]);
    let report = FraudAnalyzer::with_config(AnalyzerConfig::new().with_max_cycles(1))
        .analyze(&txs)
        .unwrap();
    assert_eq!(report.summary.cycles_detected, 1);
}
