//! Flow-shape detectors: fan-out, fan-in, shell accounts, passthrough.

use crate::detector::{DetectorMetadata, PatternDetector, Signal, SignalMap};
use fraudlens_core::{TimeWindow, Transaction};
use fraudlens_graph::{GraphStats, TransactionGraph};
use std::collections::HashSet;
use std::sync::Arc;

const HOUR_MS: i64 = 3_600_000;

/// Minimum transactions, and minimum distinct counterparties in one
/// window, for a fan signal.
const MIN_FAN: usize = 15;
const FAN_WINDOW_MS: i64 = 72 * HOUR_MS;

/// Forwarding horizon for passthrough pairing.
const PASSTHROUGH_WINDOW_MS: i64 = 6 * HOUR_MS;
/// Matched pairs retained per account.
const PASSTHROUGH_PAIR_CAP: usize = 100;

/// Slide a left-anchored window over `txs` (sorted by timestamp) and
/// return the maximum distinct-counterparty count with its window.
fn max_windowed_counterparties(
    txs: &[Arc<Transaction>],
    counterparty: impl Fn(&Arc<Transaction>) -> &str,
) -> (usize, TimeWindow) {
    let mut best = 0usize;
    let mut best_window = TimeWindow::new(0, 0);
    for (i, anchor) in txs.iter().enumerate() {
        let end = anchor.timestamp_ms + FAN_WINDOW_MS;
        let mut distinct: HashSet<&str> = HashSet::new();
        for tx in &txs[i..] {
            if tx.timestamp_ms >= end {
                break;
            }
            distinct.insert(counterparty(tx));
        }
        if distinct.len() > best {
            best = distinct.len();
            best_window = TimeWindow::new(anchor.timestamp_ms, end);
        }
    }
    (best, best_window)
}

// ============================================================================
// Fan-Out / Fan-In
// ============================================================================

/// One sender spraying funds across many receivers inside 72 hours.
#[derive(Debug)]
pub struct FanOutScan {
    metadata: DetectorMetadata,
}

impl FanOutScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("structural/fan-out", "fan_out")
                .with_description("15+ distinct receivers inside a 72-hour window"),
        }
    }
}

impl Default for FanOutScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for FanOutScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let mut signals = SignalMap::new();
        for account in graph.accounts() {
            if graph.outgoing(account).len() < MIN_FAN {
                continue;
            }
            let txs = graph.outgoing_sorted(account);
            let (counterparties, window) =
                max_windowed_counterparties(&txs, |tx| tx.receiver_id.as_str());
            if counterparties >= MIN_FAN {
                signals.insert(
                    account.clone(),
                    Signal::FanOut {
                        counterparties,
                        window,
                    },
                );
            }
        }
        signals
    }
}

/// Many senders funneling into one receiver inside 72 hours.
#[derive(Debug)]
pub struct FanInScan {
    metadata: DetectorMetadata,
}

impl FanInScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("structural/fan-in", "fan_in")
                .with_description("15+ distinct senders inside a 72-hour window"),
        }
    }
}

impl Default for FanInScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for FanInScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let mut signals = SignalMap::new();
        for account in graph.accounts() {
            if graph.incoming(account).len() < MIN_FAN {
                continue;
            }
            let txs = graph.incoming_sorted(account);
            let (counterparties, window) =
                max_windowed_counterparties(&txs, |tx| tx.sender_id.as_str());
            if counterparties >= MIN_FAN {
                signals.insert(
                    account.clone(),
                    Signal::FanIn {
                        counterparties,
                        window,
                    },
                );
            }
        }
        signals
    }
}

// ============================================================================
// Shell Accounts
// ============================================================================

/// Near-dormant accounts that still relay funds: total degree 1-3 with
/// at least one transaction in each direction.
#[derive(Debug)]
pub struct ShellAccountScan {
    metadata: DetectorMetadata,
}

impl ShellAccountScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("structural/shell-account", "shell_account")
                .with_description("Low-degree relay accounts"),
        }
    }
}

impl Default for ShellAccountScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for ShellAccountScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let mut signals = SignalMap::new();
        for account in graph.accounts() {
            let incoming = graph.incoming(account).len();
            let outgoing = graph.outgoing(account).len();
            let degree = incoming + outgoing;
            if (1..=3).contains(&degree) && incoming >= 1 && outgoing >= 1 {
                signals.insert(account.clone(), Signal::ShellAccount { incoming, outgoing });
            }
        }
        signals
    }
}

// ============================================================================
// Passthrough
// ============================================================================

/// Incoming funds forwarded within six hours.
#[derive(Debug)]
pub struct PassthroughScan {
    metadata: DetectorMetadata,
}

impl PassthroughScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("structural/passthrough", "passthrough")
                .with_description("Funds forwarded within six hours of arrival"),
        }
    }
}

impl Default for PassthroughScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for PassthroughScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let mut signals = SignalMap::new();
        for account in graph.accounts() {
            if graph.incoming(account).is_empty() || graph.outgoing(account).is_empty() {
                continue;
            }
            let incoming = graph.incoming_sorted(account);
            let outgoing = graph.outgoing_sorted(account);

            let mut pair_count = 0usize;
            let mut min_gap_ms = i64::MAX;
            'pairs: for in_tx in &incoming {
                let start =
                    outgoing.partition_point(|out| out.timestamp_ms < in_tx.timestamp_ms);
                for out_tx in &outgoing[start..] {
                    if out_tx.timestamp_ms > in_tx.timestamp_ms + PASSTHROUGH_WINDOW_MS {
                        break;
                    }
                    pair_count += 1;
                    min_gap_ms = min_gap_ms.min(out_tx.timestamp_ms - in_tx.timestamp_ms);
                    if pair_count >= PASSTHROUGH_PAIR_CAP {
                        break 'pairs;
                    }
                }
            }
            if pair_count > 0 {
                signals.insert(
                    account.clone(),
                    Signal::Passthrough {
                        pair_count,
                        min_gap_ms,
                    },
                );
            }
        }
        signals
    }
}
