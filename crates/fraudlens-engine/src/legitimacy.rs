//! Legitimacy penalties: score subtractions for behavior consistent with
//! lawful activity. The main false-positive control of the engine.

use fraudlens_core::Transaction;
use fraudlens_graph::TransactionGraph;
use std::collections::HashSet;
use std::sync::Arc;

const DAY_MS: f64 = 86_400_000.0;

/// Total penalty for an account: the sum of every matching profile.
#[must_use]
pub fn penalty(graph: &TransactionGraph, account: &str) -> f64 {
    payroll(graph, account)
        + merchant(graph, account)
        + utility(graph, account)
        + business(graph, account)
        + savings(graph, account)
}

/// Payroll: many outgoing payments from a tiny amount set on a roughly
/// monthly or fortnightly cadence.
fn payroll(graph: &TransactionGraph, account: &str) -> f64 {
    let outgoing = graph.outgoing_sorted(account);
    if outgoing.len() < 10 || unique_amounts(&outgoing) > 3 {
        return 0.0;
    }
    let intervals = intervals_days(&outgoing);
    let mean = mean_of(&intervals);
    if (6.0..=31.0).contains(&mean) {
        25.0
    } else {
        15.0
    }
}

/// Merchant: a stream of small payments from a broad customer base.
fn merchant(graph: &TransactionGraph, account: &str) -> f64 {
    let incoming = graph.incoming(account);
    if incoming.len() < 20 {
        return 0.0;
    }
    let mean_amount =
        incoming.iter().map(|tx| tx.amount).sum::<f64>() / incoming.len() as f64;
    if mean_amount >= 100.0 {
        return 0.0;
    }
    let senders: HashSet<&str> = incoming.iter().map(|tx| tx.sender_id.as_str()).collect();
    let diversity = senders.len() as f64 / incoming.len() as f64;
    if diversity > 0.5 {
        20.0
    } else {
        10.0
    }
}

/// Utility: recurring payments to a single receiver on a steady cadence.
fn utility(graph: &TransactionGraph, account: &str) -> f64 {
    let outgoing = graph.outgoing_sorted(account);
    if outgoing.len() < 5 || !single_receiver(&outgoing) {
        return 0.0;
    }
    let intervals = intervals_days(&outgoing);
    let mean = mean_of(&intervals);
    if mean > 0.0 && stddev_of(&intervals, mean) / mean < 0.5 {
        15.0
    } else {
        8.0
    }
}

/// Business: heavy, balanced two-way traffic over many counterparties.
fn business(graph: &TransactionGraph, account: &str) -> f64 {
    let incoming = graph.incoming(account).len();
    let outgoing = graph.outgoing(account).len();
    let total = incoming + outgoing;
    if total <= 50 || outgoing == 0 {
        return 0.0;
    }
    let ratio = incoming as f64 / outgoing as f64;
    if !(0.5..=2.0).contains(&ratio) {
        return 0.0;
    }
    let diversity = graph.unique_counterparties(account).len() as f64 / total as f64;
    if diversity > 0.3 {
        20.0
    } else {
        0.0
    }
}

/// Savings: a handful of consistent transfers to one destination.
fn savings(graph: &TransactionGraph, account: &str) -> f64 {
    let outgoing = graph.outgoing_sorted(account);
    if !(3..=20).contains(&outgoing.len()) || !single_receiver(&outgoing) {
        return 0.0;
    }
    let amounts: Vec<f64> = outgoing.iter().map(|tx| tx.amount).collect();
    let mean = mean_of(&amounts);
    if mean <= 0.0 {
        return 0.0;
    }
    let var = amounts.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / amounts.len() as f64;
    // Squared coefficient of variation.
    if var / (mean * mean) < 0.1 {
        15.0
    } else {
        0.0
    }
}

fn unique_amounts(txs: &[Arc<Transaction>]) -> usize {
    // Cent-resolution equality; payroll amounts are fixed to the cent.
    let cents: HashSet<i64> = txs
        .iter()
        .map(|tx| (tx.amount * 100.0).round() as i64)
        .collect();
    cents.len()
}

fn single_receiver(txs: &[Arc<Transaction>]) -> bool {
    let mut receivers = txs.iter().map(|tx| tx.receiver_id.as_str());
    match receivers.next() {
        Some(first) => receivers.all(|r| r == first),
        None => false,
    }
}

fn intervals_days(txs: &[Arc<Transaction>]) -> Vec<f64> {
    txs.windows(2)
        .map(|pair| (pair[1].timestamp_ms - pair[0].timestamp_ms) as f64 / DAY_MS)
        .collect()
}

fn mean_of(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn stddev_of(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}
