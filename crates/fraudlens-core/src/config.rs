//! Analyzer configuration.

use serde::{Deserialize, Serialize};

/// Tunable bounds for one analysis run.
///
/// Defaults match the documented engine contract; raising the caps trades
/// running time for coverage, it never changes the semantics of a signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Upper bound on enumerated simple cycles across the whole graph.
    pub max_cycles: usize,
    /// Account cap for the network-influence computation; the sample is
    /// the most active accounts.
    pub centrality_sample_size: usize,
    /// Enable the deep money-laundering chain detector. Off by default
    /// because path enumeration is the most expensive scan.
    pub enable_deep_chain_analysis: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_cycles: 1000,
            centrality_sample_size: 500,
            enable_deep_chain_analysis: false,
        }
    }
}

impl AnalyzerConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the global cycle enumeration cap.
    #[must_use]
    pub fn with_max_cycles(mut self, max_cycles: usize) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Set the network-influence sample cap.
    #[must_use]
    pub fn with_centrality_sample_size(mut self, sample_size: usize) -> Self {
        self.centrality_sample_size = sample_size;
        self
    }

    /// Enable or disable deep chain analysis.
    #[must_use]
    pub fn with_deep_chain_analysis(mut self, enabled: bool) -> Self {
        self.enable_deep_chain_analysis = enabled;
        self
    }
}
