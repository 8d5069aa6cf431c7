//! Temporal detectors: velocity, unusual timing, bursts, dormancy,
//! frequency, and hour-of-day clustering.
//!
//! Hours and weekdays are taken from the timestamp's native calendar; the
//! engine deliberately performs no time-zone conversion.

use crate::detector::{DetectorMetadata, PatternDetector, Signal, SignalMap};
use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use fraudlens_graph::{GraphStats, TransactionGraph};

const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Velocity scan: minimum activity, window sizes, and rate ceiling.
const VELOCITY_MIN_DEGREE: usize = 10;
const VELOCITY_WINDOWS_HOURS: [u32; 4] = [1, 6, 24, 72];
const VELOCITY_CEILING: f64 = 5.0;

/// Unusual timing: minimum activity and concentration thresholds.
const TIMING_MIN_DEGREE: usize = 5;
const NIGHT_FRACTION: f64 = 0.5;
const WEEKEND_FRACTION: f64 = 0.7;

/// Burst scan: minimum activity, gap ratio, and run floor.
const BURST_MIN_DEGREE: usize = 10;
const BURST_GAP_RATIO: f64 = 0.2;
const BURST_MIN_RUN: usize = 3;

/// Dormancy: gap floor and minimum follow-up activity.
const DORMANCY_GAP_DAYS: f64 = 30.0;
const DORMANCY_MIN_POST: usize = 3;

/// Frequency: minimum activity and daily-rate ceiling.
const FREQUENCY_MIN_DEGREE: usize = 20;
const FREQUENCY_CEILING: f64 = 20.0;

/// Hour clustering: bin share of the peak, bin-set cap, and total share.
const CLUSTER_PEAK_SHARE: f64 = 0.8;
const CLUSTER_MAX_HOURS: usize = 3;
const CLUSTER_MIN_SHARE: f64 = 0.5;

fn hour_of(ts_ms: i64) -> u32 {
    DateTime::<Utc>::from_timestamp_millis(ts_ms)
        .map(|dt| dt.hour())
        .unwrap_or(0)
}

fn is_night(ts_ms: i64) -> bool {
    let hour = hour_of(ts_ms);
    hour >= 23 || hour < 5
}

fn is_weekend(ts_ms: i64) -> bool {
    DateTime::<Utc>::from_timestamp_millis(ts_ms)
        .map(|dt| matches!(dt.weekday(), Weekday::Sat | Weekday::Sun))
        .unwrap_or(false)
}

/// Sorted inter-arrival gaps of a timeline, milliseconds.
fn gaps_of(timestamps: &[i64]) -> Vec<i64> {
    timestamps.windows(2).map(|p| p[1] - p[0]).collect()
}

// ============================================================================
// Velocity Anomaly
// ============================================================================

/// Peak per-hour transaction rate over sliding windows of several sizes.
#[derive(Debug)]
pub struct VelocityScan {
    metadata: DetectorMetadata,
}

impl VelocityScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("timing/velocity", "velocity_anomaly")
                .with_description("Peak transaction rate above 5 per hour"),
        }
    }
}

impl Default for VelocityScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for VelocityScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let mut signals = SignalMap::new();
        for account in graph.accounts() {
            if graph.degree(account) < VELOCITY_MIN_DEGREE {
                continue;
            }
            let timestamps: Vec<i64> = graph
                .merged_timeline(account)
                .iter()
                .map(|tx| tx.timestamp_ms)
                .collect();

            let mut peak_rate = 0.0f64;
            let mut peak_window = VELOCITY_WINDOWS_HOURS[0];
            for &hours in &VELOCITY_WINDOWS_HOURS {
                let window_ms = i64::from(hours) * HOUR_MS;
                for (i, &anchor) in timestamps.iter().enumerate() {
                    let count = timestamps[i..]
                        .iter()
                        .take_while(|&&ts| ts < anchor + window_ms)
                        .count();
                    let rate = count as f64 / f64::from(hours);
                    if rate > peak_rate {
                        peak_rate = rate;
                        peak_window = hours;
                    }
                }
            }
            if peak_rate > VELOCITY_CEILING {
                signals.insert(
                    account.clone(),
                    Signal::VelocityAnomaly {
                        peak_rate,
                        window_hours: peak_window,
                    },
                );
            }
        }
        signals
    }
}

// ============================================================================
// Unusual Timing
// ============================================================================

/// Night-hour or weekend concentration of activity.
#[derive(Debug)]
pub struct UnusualTimingScan {
    metadata: DetectorMetadata,
}

impl UnusualTimingScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("timing/unusual-timing", "unusual_timing")
                .with_description("Activity concentrated at night or on weekends"),
        }
    }
}

impl Default for UnusualTimingScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for UnusualTimingScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let mut signals = SignalMap::new();
        for account in graph.accounts() {
            let degree = graph.degree(account);
            if degree < TIMING_MIN_DEGREE {
                continue;
            }
            let timeline = graph.merged_timeline(account);
            let night = timeline
                .iter()
                .filter(|tx| is_night(tx.timestamp_ms))
                .count();
            let weekend = timeline
                .iter()
                .filter(|tx| is_weekend(tx.timestamp_ms))
                .count();
            let night_fraction = night as f64 / degree as f64;
            let weekend_fraction = weekend as f64 / degree as f64;
            if night_fraction > NIGHT_FRACTION || weekend_fraction > WEEKEND_FRACTION {
                signals.insert(
                    account.clone(),
                    Signal::UnusualTiming {
                        night_fraction,
                        weekend_fraction,
                    },
                );
            }
        }
        signals
    }
}

// ============================================================================
// Burst Activity
// ============================================================================

/// Maximal runs of inter-arrival gaps far below the account's mean gap.
#[derive(Debug)]
pub struct BurstScan {
    metadata: DetectorMetadata,
}

impl BurstScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("timing/burst", "burst_activity")
                .with_description("Runs of abnormally short inter-arrival gaps"),
        }
    }
}

impl Default for BurstScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for BurstScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let mut signals = SignalMap::new();
        for account in graph.accounts() {
            if graph.degree(account) < BURST_MIN_DEGREE {
                continue;
            }
            let timestamps: Vec<i64> = graph
                .merged_timeline(account)
                .iter()
                .map(|tx| tx.timestamp_ms)
                .collect();
            let gaps = gaps_of(&timestamps);
            if gaps.is_empty() {
                continue;
            }
            let mean = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;
            if mean <= 0.0 {
                continue;
            }
            let threshold = BURST_GAP_RATIO * mean;

            let mut max_run = 0usize;
            let mut runs = 0usize;
            let mut current = 0usize;
            for &gap in &gaps {
                if (gap as f64) < threshold {
                    current += 1;
                } else {
                    if current >= BURST_MIN_RUN {
                        runs += 1;
                    }
                    max_run = max_run.max(current);
                    current = 0;
                }
            }
            if current >= BURST_MIN_RUN {
                runs += 1;
            }
            max_run = max_run.max(current);

            if max_run >= BURST_MIN_RUN {
                signals.insert(account.clone(), Signal::BurstActivity { max_run, runs });
            }
        }
        signals
    }
}

// ============================================================================
// Dormancy Reactivation
// ============================================================================

/// A month-plus silence followed by sustained activity.
#[derive(Debug)]
pub struct DormancyScan {
    metadata: DetectorMetadata,
}

impl DormancyScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("timing/dormancy", "dormancy_reactivation")
                .with_description("30+ day silence followed by 3+ events"),
        }
    }
}

impl Default for DormancyScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for DormancyScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let mut signals = SignalMap::new();
        for account in graph.accounts() {
            let timestamps: Vec<i64> = graph
                .merged_timeline(account)
                .iter()
                .map(|tx| tx.timestamp_ms)
                .collect();
            if timestamps.len() < 2 {
                continue;
            }
            let gaps = gaps_of(&timestamps);
            let (longest_idx, &longest) = gaps
                .iter()
                .enumerate()
                .max_by_key(|(_, &gap)| gap)
                .expect("non-empty gaps");
            let gap_days = longest as f64 / DAY_MS as f64;
            let post_events = timestamps.len() - (longest_idx + 1);
            if gap_days > DORMANCY_GAP_DAYS && post_events >= DORMANCY_MIN_POST {
                signals.insert(
                    account.clone(),
                    Signal::DormancyReactivation {
                        gap_days,
                        post_events,
                    },
                );
            }
        }
        signals
    }
}

// ============================================================================
// Frequency Anomaly
// ============================================================================

/// Mean daily transaction rate over the account's observed span.
#[derive(Debug)]
pub struct FrequencyScan {
    metadata: DetectorMetadata,
}

impl FrequencyScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("timing/frequency", "frequency_anomaly")
                .with_description("More than 20 transactions per day on average"),
        }
    }
}

impl Default for FrequencyScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for FrequencyScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let mut signals = SignalMap::new();
        for account in graph.accounts() {
            let degree = graph.degree(account);
            if degree < FREQUENCY_MIN_DEGREE {
                continue;
            }
            let timeline = graph.merged_timeline(account);
            let first = timeline.first().map(|tx| tx.timestamp_ms).unwrap_or(0);
            let last = timeline.last().map(|tx| tx.timestamp_ms).unwrap_or(0);
            // Spans under a day count as one day.
            let span_days = ((last - first) as f64 / DAY_MS as f64).max(1.0);
            let per_day = degree as f64 / span_days;
            if per_day > FREQUENCY_CEILING {
                signals.insert(account.clone(), Signal::FrequencyAnomaly { per_day });
            }
        }
        signals
    }
}

// ============================================================================
// Temporal Clustering
// ============================================================================

/// Activity concentrated into at most three hour-of-day bins.
#[derive(Debug)]
pub struct TemporalClusteringScan {
    metadata: DetectorMetadata,
}

impl TemporalClusteringScan {
    /// Create the scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("timing/temporal-clustering", "temporal_clustering")
                .with_description("Activity concentrated in a few hours of the day"),
        }
    }
}

impl Default for TemporalClusteringScan {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector for TemporalClusteringScan {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }

    fn scan(&self, graph: &TransactionGraph, _stats: &GraphStats) -> SignalMap {
        let mut signals = SignalMap::new();
        for account in graph.accounts() {
            let timeline = graph.merged_timeline(account);
            if timeline.is_empty() {
                continue;
            }
            let mut bins = [0usize; 24];
            for tx in &timeline {
                bins[hour_of(tx.timestamp_ms) as usize] += 1;
            }
            let peak = *bins.iter().max().expect("24 bins");
            let peak_hours: Vec<u32> = (0..24u32)
                .filter(|&h| bins[h as usize] as f64 >= CLUSTER_PEAK_SHARE * peak as f64)
                .collect();
            if peak_hours.len() > CLUSTER_MAX_HOURS {
                continue;
            }
            let covered: usize = peak_hours.iter().map(|&h| bins[h as usize]).sum();
            let concentration = covered as f64 / timeline.len() as f64;
            if concentration > CLUSTER_MIN_SHARE {
                signals.insert(
                    account.clone(),
                    Signal::TemporalClustering {
                        peak_hours,
                        concentration,
                    },
                );
            }
        }
        signals
    }
}
