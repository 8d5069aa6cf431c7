//! Engine data types and the stable report shape.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Transaction Types
// ============================================================================

/// A validated financial transaction.
///
/// Produced by the out-of-scope CSV ingestor; the engine assumes every
/// field is present, the amount is non-negative and finite, and the
/// timestamp is epoch milliseconds. Self-loops and multi-edges are legal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier.
    pub transaction_id: String,
    /// Sending account identifier.
    pub sender_id: String,
    /// Receiving account identifier.
    pub receiver_id: String,
    /// Transaction amount (non-negative).
    pub amount: f64,
    /// Timestamp, epoch milliseconds.
    pub timestamp_ms: i64,
}

impl Transaction {
    /// Create a new transaction record.
    #[must_use]
    pub fn new(
        transaction_id: impl Into<String>,
        sender_id: impl Into<String>,
        receiver_id: impl Into<String>,
        amount: f64,
        timestamp_ms: i64,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
            amount,
            timestamp_ms,
        }
    }

    /// True when sender and receiver are the same account.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.sender_id == self.receiver_id
    }
}

/// Half-open time window `[start, end)` in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start timestamp (inclusive), epoch milliseconds.
    pub start_ms: i64,
    /// End timestamp (exclusive), epoch milliseconds.
    pub end_ms: i64,
}

impl TimeWindow {
    /// Create a new time window.
    #[must_use]
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    /// Check whether a timestamp falls inside the window.
    #[must_use]
    pub fn contains(&self, timestamp_ms: i64) -> bool {
        timestamp_ms >= self.start_ms && timestamp_ms < self.end_ms
    }

    /// Window duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

// ============================================================================
// Report Types
// ============================================================================

/// A flagged account in the final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousAccount {
    /// Account identifier.
    pub account_id: String,
    /// Final suspicion score, one decimal, in `[0, 100]`.
    pub suspicion_score: f64,
    /// Fired pattern labels, in detection order.
    pub detected_patterns: Vec<String>,
    /// Ring the account belongs to, if any.
    pub ring_id: Option<String>,
}

/// Classification of an assembled fraud ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RingPatternType {
    /// Closed loop of exactly three members.
    Cycle,
    /// Many coordinated low-degree feeders around central beneficiaries.
    Smurfing,
    /// Chain of near-dormant relay accounts.
    ShellChain,
    /// Mixed evidence.
    Hybrid,
}

impl RingPatternType {
    /// Stable string form used in the report.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            RingPatternType::Cycle => "cycle",
            RingPatternType::Smurfing => "smurfing",
            RingPatternType::ShellChain => "shell_chain",
            RingPatternType::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for RingPatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An assembled ring of related accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudRing {
    /// Ring identifier, `RING-001`, `RING-002`, ... in discovery order.
    pub ring_id: String,
    /// Member account ids, sorted ascending, no duplicates.
    pub member_accounts: Vec<String>,
    /// Dominant pattern classification.
    pub pattern_type: RingPatternType,
    /// Ring risk score, one decimal, in `[0, 100]`.
    pub risk_score: f64,
    /// How the ring was discovered (`"louvain"` for community-derived rings).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_method: Option<String>,
    /// Internal edge density of the originating community.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
    /// Central beneficiaries of the originating community.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub central_beneficiaries: Option<Vec<String>>,
}

/// Aggregate counters for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Distinct accounts seen in the batch.
    pub total_accounts_analyzed: usize,
    /// Accounts classified suspicious.
    pub suspicious_accounts_flagged: usize,
    /// Rings in the report.
    pub fraud_rings_detected: usize,
    /// Wall-clock duration of the run, seconds.
    pub processing_time_seconds: f64,
    /// Distinct simple cycles found (length 3-5, deduplicated).
    pub cycles_detected: usize,
    /// Louvain communities retained as smurfing candidates.
    pub louvain_smurfing_rings_detected: usize,
    /// Detectors executed (constant per engine version).
    pub patterns_analyzed: usize,
}

/// The complete, stable-shape analysis report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudReport {
    /// Ranked suspicious accounts, score descending.
    pub suspicious_accounts: Vec<SuspiciousAccount>,
    /// Assembled fraud rings.
    pub fraud_rings: Vec<FraudRing>,
    /// Aggregate summary.
    pub summary: AnalysisSummary,
}
