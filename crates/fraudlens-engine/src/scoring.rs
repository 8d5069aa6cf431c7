//! Suspicion scoring: weighted signal contributions, the Louvain bonus,
//! legitimacy penalties, and the is-suspicious classification.

use crate::legitimacy;
use fraudlens_detect::{ProgressionTrend, Signal, SignalMap};
use fraudlens_graph::{CommunityAnalysis, SmurfingClass, TransactionGraph};

/// Cap on the Louvain smurfing bonus.
const LOUVAIN_BONUS_CAP: f64 = 40.0;

/// One fully scored account, suspicious or not. Ring risk scoring needs
/// scores for every member, so nothing is filtered here.
#[derive(Debug, Clone)]
pub struct ScoredAccount {
    /// Account id.
    pub account_id: String,
    /// Final score after penalties, clamped to `[0, 100]`, unrounded.
    pub score: f64,
    /// Fired pattern labels in detection order.
    pub patterns: Vec<String>,
    /// Classification verdict.
    pub is_suspicious: bool,
    /// Whether the account sits on at least one cycle.
    pub cycle_member: bool,
}

/// Weighted multi-signal scorer.
///
/// The score is the sum of per-signal contributions plus the Louvain
/// bonus, minus legitimacy penalties, clamped to `[0, 100]`. Each signal
/// contributes the maximum applicable sub-case.
#[derive(Debug, Clone, Copy)]
pub struct SuspicionScorer;

impl SuspicionScorer {
    /// Score every account in the graph.
    ///
    /// `signal_maps` must be in canonical detection order; it fixes the
    /// label order on each account. Returns accounts in id order.
    #[must_use]
    pub fn score_all(
        graph: &TransactionGraph,
        signal_maps: &[SignalMap],
        communities: &[CommunityAnalysis],
    ) -> Vec<ScoredAccount> {
        graph
            .accounts()
            .iter()
            .map(|account| Self::score_account(graph, account, signal_maps, communities))
            .collect()
    }

    fn score_account(
        graph: &TransactionGraph,
        account: &str,
        signal_maps: &[SignalMap],
        communities: &[CommunityAnalysis],
    ) -> ScoredAccount {
        let fired: Vec<&Signal> = signal_maps
            .iter()
            .filter_map(|map| map.get(account))
            .collect();

        let mut score: f64 = fired.iter().map(|s| contribution(s)).sum();
        let mut patterns: Vec<String> = fired.iter().map(|s| s.label().to_string()).collect();
        let cycle_member = fired.iter().any(|s| matches!(s, Signal::Cycle { .. }));

        // Louvain communities partition the accounts, so at most one hit.
        let mut pattern_count = fired.len();
        if let Some(community) = communities.iter().find(|c| c.contains(account)) {
            score += louvain_bonus(community, account);
            patterns.push("louvain_smurfing_ring".to_string());
            patterns.push(format!(
                "louvain_{}",
                community.classification.as_str().to_lowercase()
            ));
            // The class label qualifies the ring label; it is not an
            // independent pattern for classification purposes.
            pattern_count += 1;
        }

        score -= legitimacy::penalty(graph, account);
        let score = score.clamp(0.0, 100.0);

        ScoredAccount {
            account_id: account.to_string(),
            score,
            is_suspicious: classify(score, pattern_count, cycle_member),
            patterns,
            cycle_member,
        }
    }
}

/// Contribution of one fired signal, maximum applicable sub-case.
fn contribution(signal: &Signal) -> f64 {
    match signal {
        Signal::Cycle { shortest, .. } => match shortest {
            3 => 35.0,
            4 => 28.0,
            _ => 22.0,
        },
        Signal::FanOut { counterparties, .. } | Signal::FanIn { counterparties, .. } => {
            fan_points(*counterparties)
        }
        Signal::ShellAccount { .. } => 12.0,
        Signal::Passthrough { pair_count, .. } => match pair_count {
            n if *n >= 10 => 8.0,
            n if *n >= 5 => 6.0,
            _ => 4.0,
        },
        Signal::Structuring { round_fraction } => match round_fraction {
            f if *f >= 0.9 => 8.0,
            f if *f >= 0.8 => 6.0,
            _ => 5.0,
        },
        Signal::ThresholdAvoidance { clustering, .. } => match clustering {
            c if *c >= 0.8 => 8.0,
            c if *c >= 0.6 => 6.0,
            _ => 5.0,
        },
        Signal::VelocityAnomaly { peak_rate, .. } => match peak_rate {
            r if *r > 15.0 => 10.0,
            r if *r > 10.0 => 7.0,
            _ => 4.0,
        },
        Signal::AmountAnomaly {
            outlier_fraction, ..
        } => match outlier_fraction {
            f if *f > 0.7 => 8.0,
            f if *f > 0.5 => 6.0,
            _ => 4.0,
        },
        Signal::UnusualTiming {
            night_fraction,
            weekend_fraction,
        } => {
            let mut points: f64 = 0.0;
            if *night_fraction > 0.5 {
                points += 4.0;
            }
            if *weekend_fraction > 0.7 {
                points += 3.0;
            }
            points.min(7.0)
        }
        Signal::BurstActivity { max_run, .. } => match max_run {
            r if *r >= 10 => 8.0,
            r if *r >= 5 => 6.0,
            _ => 4.0,
        },
        Signal::DormancyReactivation {
            gap_days,
            post_events,
        } => {
            if *gap_days > 180.0 && *post_events > 10 {
                10.0
            } else if *gap_days > 90.0 && *post_events > 5 {
                7.0
            } else {
                4.0
            }
        }
        Signal::AmountSplitting { group_size, .. } => match group_size {
            n if *n >= 10 => 8.0,
            n if *n >= 5 => 6.0,
            _ => 4.0,
        },
        Signal::FrequencyAnomaly { per_day } => match per_day {
            r if *r > 50.0 => 8.0,
            r if *r > 20.0 => 6.0,
            _ => 4.0,
        },
        Signal::NetworkInfluence { normalized } => match normalized {
            s if *s > 0.8 => 6.0,
            s if *s > 0.6 => 4.0,
            _ => 2.0,
        },
        Signal::RoundTrip { count } => match count {
            n if *n >= 5 => 8.0,
            n if *n >= 3 => 5.0,
            _ => 3.0,
        },
        Signal::Layering { max_depth, reach } => {
            let base = match max_depth {
                d if *d >= 6 => 5.0,
                d if *d >= 5 => 3.0,
                _ => 2.0,
            };
            if *reach > 50 {
                base + 2.0
            } else {
                base
            }
        }
        Signal::LowDiversity {
            ratio,
            top_concentration,
        } => {
            let mut points = 2.0;
            if *ratio < 0.2 {
                points += 2.0;
            }
            if *top_concentration > 0.7 {
                points += 2.0;
            }
            points
        }
        Signal::AmountProgression {
            trend,
            step_ratio,
            multiplier,
        } => {
            if *trend == ProgressionTrend::Increasing && *multiplier > 10.0 {
                6.0
            } else if *trend == ProgressionTrend::Increasing && *multiplier > 5.0 {
                4.0
            } else if *step_ratio > 0.8 {
                3.0
            } else {
                2.0
            }
        }
        Signal::TemporalClustering {
            peak_hours,
            concentration,
        } => {
            if peak_hours.len() == 1 && *concentration > 0.7 {
                5.0
            } else if *concentration > 0.6 {
                3.0
            } else {
                2.0
            }
        }
        Signal::LaunderingChain {
            longest,
            chains_found,
        } => {
            let base: f64 = match longest {
                l if *l >= 7 => 12.0,
                l if *l >= 6 => 8.0,
                _ => 5.0,
            };
            let bonus = if *chains_found >= 10 { 3.0 } else { 0.0 };
            (base + bonus).min(15.0)
        }
        Signal::CoordinatedBehavior { partners } => match partners {
            n if *n >= 5 => 10.0,
            n if *n >= 3 => 7.0,
            _ => 5.0,
        },
        Signal::SmurfingPattern { clusters, .. } => match clusters {
            n if *n >= 5 => 10.0,
            n if *n >= 3 => 7.0,
            _ => 5.0,
        },
        Signal::WashTrading { matches } => match matches {
            n if *n >= 10 => 10.0,
            n if *n >= 5 => 7.0,
            _ => 5.0,
        },
    }
}

/// `min(18, 12 + floor(0.6 * (count - 15)))`, shared by fan-out and fan-in.
fn fan_points(count: usize) -> f64 {
    let extra = (0.6 * (count.saturating_sub(15)) as f64).floor();
    (12.0 + extra).min(18.0)
}

/// Louvain smurfing bonus, capped at 40.
fn louvain_bonus(community: &CommunityAnalysis, account: &str) -> f64 {
    let membership = if community.is_central(account) {
        15.0
    } else {
        10.0
    };
    let pattern_bonus = match community.classification {
        SmurfingClass::StructuredSmurfing => 5.0,
        SmurfingClass::CoordinatedBurstSmurfing => 4.0,
        SmurfingClass::SingleBeneficiarySmurfing | SmurfingClass::MultiBeneficiaryRing => 3.0,
        SmurfingClass::DistributedSmurfingNetwork => 2.0,
    };
    let density_bonus = match community.density {
        d if d > 0.5 => 3.0,
        d if d > 0.3 => 2.0,
        d if d > 0.15 => 1.0,
        _ => 0.0,
    };
    let consistency_bonus = match community.amount_consistency {
        c if c > 0.9 => 3.0,
        c if c > 0.7 => 2.0,
        c if c > 0.5 => 1.0,
        _ => 0.0,
    };
    (20.0 * community.smurfing_score + membership + pattern_bonus + density_bonus
        + consistency_bonus)
        .min(LOUVAIN_BONUS_CAP)
}

/// The is-suspicious ladder: a high score alone, or a lower score
/// corroborated by multiple patterns (and cycle membership further down).
fn classify(score: f64, pattern_count: usize, cycle_member: bool) -> bool {
    if score >= 80.0 {
        true
    } else if score >= 70.0 && pattern_count >= 3 {
        true
    } else if score >= 60.0 && cycle_member && pattern_count >= 3 {
        true
    } else {
        score >= 50.0 && cycle_member && pattern_count >= 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraudlens_core::TimeWindow;

    #[test]
    fn test_cycle_contribution_by_length() {
        for (len, expected) in [(3usize, 35.0), (4, 28.0), (5, 22.0)] {
            let signal = Signal::Cycle {
                cycles: vec![],
                shortest: len,
            };
            assert_eq!(contribution(&signal), expected);
        }
    }

    #[test]
    fn test_fan_points_ramp() {
        assert_eq!(fan_points(15), 12.0);
        assert_eq!(fan_points(16), 12.0); // floor(0.6) = 0
        assert_eq!(fan_points(17), 13.0);
        assert_eq!(fan_points(25), 18.0);
        assert_eq!(fan_points(100), 18.0);
    }

    #[test]
    fn test_fan_out_sixteen_receivers() {
        let signal = Signal::FanOut {
            counterparties: 16,
            window: TimeWindow::new(0, 1),
        };
        assert_eq!(contribution(&signal), 12.0);
    }

    #[test]
    fn test_threshold_ladder() {
        for (clustering, expected) in [(1.0, 8.0), (0.7, 6.0), (0.3, 5.0)] {
            let signal = Signal::ThresholdAvoidance {
                mean_amount: 9_500.0,
                clustering,
            };
            assert_eq!(contribution(&signal), expected);
        }
    }

    #[test]
    fn test_timing_combines_night_and_weekend() {
        let both = Signal::UnusualTiming {
            night_fraction: 0.9,
            weekend_fraction: 0.9,
        };
        assert_eq!(contribution(&both), 7.0);
        let night_only = Signal::UnusualTiming {
            night_fraction: 0.9,
            weekend_fraction: 0.0,
        };
        assert_eq!(contribution(&night_only), 4.0);
    }

    #[test]
    fn test_chain_contribution_capped() {
        let signal = Signal::LaunderingChain {
            longest: 8,
            chains_found: 50,
        };
        assert_eq!(contribution(&signal), 15.0);
    }

    #[test]
    fn test_classification_ladder() {
        assert!(classify(80.0, 0, false));
        assert!(classify(70.0, 3, false));
        assert!(!classify(70.0, 2, false));
        assert!(classify(60.0, 3, true));
        assert!(!classify(60.0, 3, false));
        assert!(classify(50.0, 4, true));
        assert!(!classify(50.0, 3, true));
        assert!(!classify(49.9, 8, true));
    }
}
