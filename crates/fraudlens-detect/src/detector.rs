//! Detector trait, metadata, and tagged signal payloads.

use fraudlens_core::{AnalyzerConfig, TimeWindow};
use fraudlens_graph::{GraphStats, TransactionGraph};
use serde::Serialize;
use std::collections::HashMap;

/// Number of detectors the engine executes. Constant per engine version
/// and reported in the summary even when the deep chain scan is disabled.
pub const DETECTOR_COUNT: usize = 24;

/// Direction of a detected amount progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionTrend {
    /// Amounts escalate step over step.
    Increasing,
    /// Amounts shrink step over step.
    Decreasing,
}

/// One fired signal: a fixed-shape payload tagged by detector.
///
/// The scorer dispatches on the tag; every field a contribution rule
/// reads is present here, so a fired signal is always scoreable.
#[derive(Debug, Clone, Serialize)]
pub enum Signal {
    /// Member of at least one simple directed cycle.
    Cycle {
        /// Normalized cycles this account participates in.
        cycles: Vec<Vec<String>>,
        /// Smallest cycle length the account participates in.
        shortest: usize,
    },
    /// Many distinct receivers inside one 72-hour window.
    FanOut {
        /// Maximum distinct receivers observed in a window.
        counterparties: usize,
        /// The window achieving the maximum.
        window: TimeWindow,
    },
    /// Many distinct senders inside one 72-hour window.
    FanIn {
        /// Maximum distinct senders observed in a window.
        counterparties: usize,
        /// The window achieving the maximum.
        window: TimeWindow,
    },
    /// Low-degree account that both receives and forwards.
    ShellAccount {
        /// Incoming transaction count.
        incoming: usize,
        /// Outgoing transaction count.
        outgoing: usize,
    },
    /// Incoming funds forwarded within six hours.
    Passthrough {
        /// Matched in/out pairs (capped at 100).
        pair_count: usize,
        /// Smallest forwarding delay seen, milliseconds.
        min_gap_ms: i64,
    },
    /// Dominance of round amounts.
    Structuring {
        /// Fraction of transactions with amounts on a round multiple.
        round_fraction: f64,
    },
    /// Amounts clustered just below the reporting threshold.
    ThresholdAvoidance {
        /// Mean transaction amount.
        mean_amount: f64,
        /// Fraction of amounts inside the near-threshold band.
        clustering: f64,
    },
    /// Sustained transaction rate above the velocity ceiling.
    VelocityAnomaly {
        /// Peak transactions per hour over all window sizes.
        peak_rate: f64,
        /// Window size (hours) achieving the peak.
        window_hours: u32,
    },
    /// Amounts outside the global IQR fences.
    AmountAnomaly {
        /// Fraction of the account's amounts outside the fences.
        outlier_fraction: f64,
        /// Absolute outlier count.
        outliers: usize,
    },
    /// Night or weekend concentration.
    UnusualTiming {
        /// Fraction of events in hours 23:00-05:00.
        night_fraction: f64,
        /// Fraction of events on Saturday or Sunday.
        weekend_fraction: f64,
    },
    /// Runs of abnormally short inter-arrival gaps.
    BurstActivity {
        /// Longest run of consecutive short gaps.
        max_run: usize,
        /// Number of qualifying runs.
        runs: usize,
    },
    /// Long silence followed by sustained activity.
    DormancyReactivation {
        /// Longest gap between consecutive events, days.
        gap_days: f64,
        /// Events after the gap.
        post_events: usize,
    },
    /// Similar amounts bunched inside one day.
    AmountSplitting {
        /// Size of the largest similar-amount group.
        group_size: usize,
        /// Window holding the largest group.
        window: TimeWindow,
    },
    /// Daily transaction rate above the frequency ceiling.
    FrequencyAnomaly {
        /// Mean transactions per day over the observed span.
        per_day: f64,
    },
    /// High normalized influence in the weighted flow network.
    NetworkInfluence {
        /// Influence score normalized by the sample maximum.
        normalized: f64,
    },
    /// Funds leaving and returning via the same counterparty.
    RoundTrip {
        /// Round trips found (capped at 10).
        count: usize,
    },
    /// Deep downstream layering from this origin.
    Layering {
        /// Deepest downstream level reached (bounded BFS).
        max_depth: usize,
        /// Distinct downstream accounts reached (capped at 100).
        reach: usize,
    },
    /// Few counterparties relative to activity.
    LowDiversity {
        /// Unique counterparties over total transactions.
        ratio: f64,
        /// Share of activity with the single busiest counterparty.
        top_concentration: f64,
    },
    /// Monotone step-over-step amount drift.
    AmountProgression {
        /// Direction of the drift.
        trend: ProgressionTrend,
        /// Fraction of steps moving in the trend direction.
        step_ratio: f64,
        /// Last amount over first amount (0 when the first is 0).
        multiplier: f64,
    },
    /// Activity concentrated into a few hours of the day.
    TemporalClustering {
        /// Hours within 80% of the peak bin, ascending.
        peak_hours: Vec<u32>,
        /// Fraction of all events inside those hours.
        concentration: f64,
    },
    /// Long simple forwarding path from this origin.
    LaunderingChain {
        /// Longest recorded path length in accounts.
        longest: usize,
        /// Paths of length >= 5 recorded during the walk.
        chains_found: usize,
    },
    /// Timeline correlated with other busy accounts.
    CoordinatedBehavior {
        /// Correlated partner count.
        partners: usize,
    },
    /// Repeated similar-amount clusters spread over many receivers.
    SmurfingPattern {
        /// Qualifying clusters (capped at 5).
        clusters: usize,
        /// Size of the largest qualifying cluster.
        largest: usize,
    },
    /// Bidirectional near-equal transfers with one counterparty.
    WashTrading {
        /// Matched out/in pairs (capped at 10).
        matches: usize,
    },
}

impl Signal {
    /// Stable pattern label from the fixed report vocabulary.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Signal::Cycle { .. } => "cycle",
            Signal::FanOut { .. } => "fan_out",
            Signal::FanIn { .. } => "fan_in",
            Signal::ShellAccount { .. } => "shell_account",
            Signal::Passthrough { .. } => "passthrough",
            Signal::Structuring { .. } => "structuring",
            Signal::ThresholdAvoidance { .. } => "threshold_avoidance",
            Signal::VelocityAnomaly { .. } => "velocity_anomaly",
            Signal::AmountAnomaly { .. } => "amount_anomaly",
            Signal::UnusualTiming { .. } => "unusual_timing",
            Signal::BurstActivity { .. } => "burst_activity",
            Signal::DormancyReactivation { .. } => "dormancy_reactivation",
            Signal::AmountSplitting { .. } => "amount_splitting",
            Signal::FrequencyAnomaly { .. } => "frequency_anomaly",
            Signal::NetworkInfluence { .. } => "network_influence",
            Signal::RoundTrip { .. } => "round_trip",
            Signal::Layering { .. } => "layering",
            Signal::LowDiversity { .. } => "low_diversity",
            Signal::AmountProgression { .. } => "amount_progression",
            Signal::TemporalClustering { .. } => "temporal_clustering",
            Signal::LaunderingChain { .. } => "money_laundering_chain",
            Signal::CoordinatedBehavior { .. } => "coordinated_behavior",
            Signal::SmurfingPattern { .. } => "smurfing_pattern",
            Signal::WashTrading { .. } => "wash_trading",
        }
    }
}

/// Per-detector output: account id to fired payload. Absence means the
/// signal did not fire; no account maps to an empty payload.
pub type SignalMap = HashMap<String, Signal>;

/// Identity and description of a detector.
#[derive(Debug, Clone)]
pub struct DetectorMetadata {
    /// Unique detector id, `family/name`.
    pub id: &'static str,
    /// Pattern label the detector emits.
    pub label: &'static str,
    description: String,
}

impl DetectorMetadata {
    /// Create metadata for a detector.
    #[must_use]
    pub fn new(id: &'static str, label: &'static str) -> Self {
        Self {
            id,
            label,
            description: String::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A pattern detector: one independent scan over the immutable inputs.
///
/// Implementations read only the graph and the statistics cache and write
/// only their own signal map, so the detection stage can run them
/// concurrently.
pub trait PatternDetector: Send + Sync {
    /// Detector identity.
    fn metadata(&self) -> &DetectorMetadata;

    /// Run the scan and return the fired signals.
    fn scan(&self, graph: &TransactionGraph, stats: &GraphStats) -> SignalMap;
}

/// Assemble the full detector family for one run.
///
/// The order here is the canonical detection order: it fixes the pattern
/// label order on every account and must stay stable across versions.
#[must_use]
pub fn build_registry(config: &AnalyzerConfig) -> Vec<Box<dyn PatternDetector>> {
    vec![
        Box::new(crate::cycles::CycleScan::new(config.max_cycles)),
        Box::new(crate::flow::FanOutScan::new()),
        Box::new(crate::flow::FanInScan::new()),
        Box::new(crate::flow::ShellAccountScan::new()),
        Box::new(crate::flow::PassthroughScan::new()),
        Box::new(crate::amounts::StructuringScan::new()),
        Box::new(crate::amounts::ThresholdAvoidanceScan::new()),
        Box::new(crate::timing::VelocityScan::new()),
        Box::new(crate::amounts::AmountAnomalyScan::new()),
        Box::new(crate::timing::UnusualTimingScan::new()),
        Box::new(crate::timing::BurstScan::new()),
        Box::new(crate::timing::DormancyScan::new()),
        Box::new(crate::amounts::AmountSplittingScan::new()),
        Box::new(crate::timing::FrequencyScan::new()),
        Box::new(crate::network::NetworkInfluenceScan::new(
            config.centrality_sample_size,
        )),
        Box::new(crate::network::RoundTripScan::new()),
        Box::new(crate::network::LayeringScan::new()),
        Box::new(crate::network::DiversityScan::new()),
        Box::new(crate::amounts::AmountProgressionScan::new()),
        Box::new(crate::timing::TemporalClusteringScan::new()),
        Box::new(crate::network::LaunderingChainScan::new(
            config.enable_deep_chain_analysis,
        )),
        Box::new(crate::coordination::CoordinatedBehaviorScan::new()),
        Box::new(crate::amounts::SmurfingClusterScan::new()),
        Box::new(crate::network::WashTradingScan::new()),
    ]
}
