//! Final report assembly: ordering, rounding, and the summary block.

use crate::scoring::ScoredAccount;
use fraudlens_core::{AnalysisSummary, FraudReport, FraudRing, SuspiciousAccount};
use fraudlens_detect::DETECTOR_COUNT;

/// Counters the analyzer hands over for the summary.
#[derive(Debug, Clone, Copy)]
pub struct SummaryCounters {
    /// Distinct accounts in the graph.
    pub total_accounts: usize,
    /// Distinct normalized cycles found.
    pub cycles_detected: usize,
    /// Retained Louvain communities.
    pub louvain_rings: usize,
    /// Wall-clock seconds for the run.
    pub processing_seconds: f64,
}

/// Packages scored accounts and rings into the stable report shape.
#[derive(Debug, Clone, Copy)]
pub struct ReportBuilder;

impl ReportBuilder {
    /// Build the report: suspicious accounts sorted by score descending
    /// (ties by id ascending), scores rounded to one decimal, ring ids
    /// attached by membership.
    #[must_use]
    pub fn build(
        scored: &[ScoredAccount],
        rings: Vec<FraudRing>,
        counters: SummaryCounters,
    ) -> FraudReport {
        let mut suspicious_accounts: Vec<SuspiciousAccount> = scored
            .iter()
            .filter(|account| account.is_suspicious)
            .map(|account| SuspiciousAccount {
                account_id: account.account_id.clone(),
                suspicion_score: round1(account.score),
                detected_patterns: account.patterns.clone(),
                ring_id: rings
                    .iter()
                    .find(|ring| {
                        ring.member_accounts
                            .binary_search(&account.account_id)
                            .is_ok()
                    })
                    .map(|ring| ring.ring_id.clone()),
            })
            .collect();

        suspicious_accounts.sort_by(|a, b| {
            b.suspicion_score
                .partial_cmp(&a.suspicion_score)
                .expect("scores are finite")
                .then_with(|| a.account_id.cmp(&b.account_id))
        });

        let summary = AnalysisSummary {
            total_accounts_analyzed: counters.total_accounts,
            suspicious_accounts_flagged: suspicious_accounts.len(),
            fraud_rings_detected: rings.len(),
            processing_time_seconds: counters.processing_seconds,
            cycles_detected: counters.cycles_detected,
            louvain_smurfing_rings_detected: counters.louvain_rings,
            patterns_analyzed: DETECTOR_COUNT,
        };

        FraudReport {
            suspicious_accounts,
            fraud_rings: rings,
            summary,
        }
    }
}

/// Round to one decimal place.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
