//! Progress reporting for long-running analyses.

use std::fmt;

/// Named milestones of one analysis run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    /// Adjacency construction from the validated batch.
    BuildingGraph,
    /// One-pass global statistics.
    ComputingStatistics,
    /// Pattern detector scans.
    RunningDetectors,
    /// Louvain community detection.
    DetectingCommunities,
    /// Suspicion scoring and classification.
    ScoringAccounts,
    /// Ring assembly.
    AssemblingRings,
    /// Final report packaging.
    BuildingReport,
    /// Run finished.
    Complete,
}

impl AnalysisStage {
    /// Human-readable milestone message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            AnalysisStage::BuildingGraph => "Building transaction graph",
            AnalysisStage::ComputingStatistics => "Computing global statistics",
            AnalysisStage::RunningDetectors => "Running pattern detectors",
            AnalysisStage::DetectingCommunities => "Detecting communities",
            AnalysisStage::ScoringAccounts => "Scoring accounts",
            AnalysisStage::AssemblingRings => "Assembling fraud rings",
            AnalysisStage::BuildingReport => "Building report",
            AnalysisStage::Complete => "Analysis complete",
        }
    }

    /// Nominal completion percentage at this milestone.
    #[must_use]
    pub const fn percent(&self) -> u8 {
        match self {
            AnalysisStage::BuildingGraph => 5,
            AnalysisStage::ComputingStatistics => 10,
            AnalysisStage::RunningDetectors => 20,
            AnalysisStage::DetectingCommunities => 60,
            AnalysisStage::ScoringAccounts => 75,
            AnalysisStage::AssemblingRings => 85,
            AnalysisStage::BuildingReport => 95,
            AnalysisStage::Complete => 100,
        }
    }
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Callback signature: milestone, message, percentage.
///
/// Invoked synchronously between stages; must not mutate engine state.
pub type ProgressCallback = Box<dyn Fn(AnalysisStage, &str, u8) + Send + Sync>;

/// Optional progress sink handed to the analyzer.
#[derive(Default)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
}

impl ProgressReporter {
    /// A reporter that drops every milestone.
    #[must_use]
    pub fn disabled() -> Self {
        Self { callback: None }
    }

    /// A reporter forwarding milestones to `callback`.
    #[must_use]
    pub fn with_callback(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    /// Report a milestone.
    pub fn report(&self, stage: AnalysisStage) {
        if let Some(cb) = &self.callback {
            cb(stage, stage.message(), stage.percent());
        }
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("enabled", &self.callback.is_some())
            .finish()
    }
}
